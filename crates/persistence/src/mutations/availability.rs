// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability mutations.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use fleetbook_domain::{AvailabilityChange, format_day};
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::AvailabilityData;
use crate::diesel_schema::availability;
use crate::error::PersistenceError;
use crate::mutations::stamp;
use crate::queries::availability::get_availability;
use crate::queries::users::user_exists;

/// Applies an availability change for one user and day.
///
/// Returns the stored record, or `None` after a clear.
///
/// # Errors
///
/// Returns `EntityNotFound` if the user does not exist.
pub fn set_availability(
    conn: &mut SqliteConnection,
    user_id: i64,
    day: NaiveDate,
    change: &AvailabilityChange,
    now: OffsetDateTime,
) -> Result<Option<AvailabilityData>, PersistenceError> {
    let day_key: String = format_day(day);
    let updated_at: String = stamp(now)?;

    conn.immediate_transaction(|conn| {
        if !user_exists(conn, user_id)? {
            return Err(PersistenceError::EntityNotFound {
                entity: "user",
                id: user_id,
            });
        }

        match change {
            AvailabilityChange::Clear => {
                let removed: usize = diesel::delete(
                    availability::table
                        .filter(availability::user_id.eq(user_id))
                        .filter(availability::day.eq(&day_key)),
                )
                .execute(conn)?;
                debug!(user_id, day = %day_key, removed, "Availability cleared");
                Ok(None)
            }
            AvailabilityChange::Set { status, note } => {
                diesel::insert_into(availability::table)
                    .values((
                        availability::user_id.eq(user_id),
                        availability::day.eq(&day_key),
                        availability::status.eq(status.as_str()),
                        availability::note.eq(note.as_deref()),
                        availability::updated_at.eq(&updated_at),
                    ))
                    .on_conflict((availability::user_id, availability::day))
                    .do_update()
                    .set((
                        availability::status.eq(excluded(availability::status)),
                        availability::note.eq(excluded(availability::note)),
                        availability::updated_at.eq(excluded(availability::updated_at)),
                    ))
                    .execute(conn)?;
                debug!(user_id, day = %day_key, status = status.as_str(), "Availability set");
                get_availability(conn, user_id, day)
            }
        }
    })
}
