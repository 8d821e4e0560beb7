// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability queries.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{AvailabilityStatus, format_day};

use crate::data_models::AvailabilityData;
use crate::diesel_schema::availability;
use crate::error::PersistenceError;
use crate::queries::{parse_stored, parse_stored_day};

/// Diesel Queryable struct for availability rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = availability)]
struct AvailabilityRow {
    availability_id: i64,
    user_id: i64,
    day: String,
    status: String,
    note: Option<String>,
    updated_at: String,
}

impl TryFrom<AvailabilityRow> for AvailabilityData {
    type Error = PersistenceError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            availability_id: row.availability_id,
            user_id: row.user_id,
            day: parse_stored_day("availability.day", &row.day)?,
            status: parse_stored::<AvailabilityStatus>("availability.status", &row.status)?,
            note: row.note,
            updated_at: row.updated_at,
        })
    }
}

/// Retrieves the availability record of one user and day.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if no record exists.
pub fn get_availability(
    conn: &mut SqliteConnection,
    user_id: i64,
    day: NaiveDate,
) -> Result<Option<AvailabilityData>, PersistenceError> {
    availability::table
        .filter(availability::user_id.eq(user_id))
        .filter(availability::day.eq(format_day(day)))
        .select(AvailabilityRow::as_select())
        .first::<AvailabilityRow>(conn)
        .optional()?
        .map(AvailabilityData::try_from)
        .transpose()
}

/// Lists availability records in an inclusive day range, ordered by day
/// then user.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_availability(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    to: NaiveDate,
    user_id: Option<i64>,
) -> Result<Vec<AvailabilityData>, PersistenceError> {
    let mut query = availability::table
        .filter(availability::day.ge(format_day(from)))
        .filter(availability::day.le(format_day(to)))
        .select(AvailabilityRow::as_select())
        .into_boxed();
    if let Some(user_id) = user_id {
        query = query.filter(availability::user_id.eq(user_id));
    }

    query
        .order_by((availability::day.asc(), availability::user_id.asc()))
        .load::<AvailabilityRow>(conn)?
        .into_iter()
        .map(AvailabilityData::try_from)
        .collect()
}
