// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Driver review mutations.
//!
//! The `rating_up` and `rating_down` counters on a user always match the
//! number of stored reviews in each direction.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{DomainError, ReviewDirection, Role, normalize_review_note};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{ChangeContext, ReviewOutcome, UserData};
use crate::diesel_schema::{driver_reviews, users};
use crate::error::PersistenceError;
use crate::mutations::stamp;
use crate::queries::ratings::get_review;
use crate::queries::users::get_user_by_id;

fn require_driver(
    conn: &mut SqliteConnection,
    driver_id: i64,
) -> Result<UserData, PersistenceError> {
    let Some(user) = get_user_by_id(conn, driver_id)? else {
        return Err(PersistenceError::EntityNotFound {
            entity: "user",
            id: driver_id,
        });
    };
    if user.role != Role::Driver {
        let violation: DomainError = DomainError::NotADriver { user_id: driver_id };
        return Err(PersistenceError::RuleViolation(violation));
    }
    Ok(user)
}

/// Appends a review and bumps the matching counter.
///
/// # Errors
///
/// Returns `EntityNotFound` if the driver does not exist, or
/// `RuleViolation` if the user is not a driver or the note is too long.
pub fn add_review(
    conn: &mut SqliteConnection,
    driver_id: i64,
    direction: ReviewDirection,
    note: Option<&str>,
    ctx: ChangeContext,
) -> Result<ReviewOutcome, PersistenceError> {
    let note: Option<String> = normalize_review_note(note)?;
    let created_at: String = stamp(ctx.now)?;

    conn.immediate_transaction(|conn| {
        require_driver(conn, driver_id)?;

        diesel::insert_into(driver_reviews::table)
            .values((
                driver_reviews::driver_id.eq(driver_id),
                driver_reviews::direction.eq(direction.as_str()),
                driver_reviews::note.eq(note.as_deref()),
                driver_reviews::created_by.eq(ctx.actor_id),
                driver_reviews::created_at.eq(&created_at),
            ))
            .execute(conn)?;
        let review_id: i64 = conn.get_last_insert_rowid()?;

        let target = users::table.find(driver_id);
        match direction {
            ReviewDirection::Up => diesel::update(target)
                .set(users::rating_up.eq(users::rating_up + 1))
                .execute(conn)?,
            ReviewDirection::Down => diesel::update(target)
                .set(users::rating_down.eq(users::rating_down + 1))
                .execute(conn)?,
        };

        let driver: UserData = require_driver(conn, driver_id)?;
        info!(
            driver_id,
            review_id,
            direction = direction.as_str(),
            score = driver.rating.score(),
            "Driver reviewed"
        );

        let Some(review) = get_review(conn, review_id)? else {
            return Err(PersistenceError::EntityNotFound {
                entity: "review",
                id: review_id,
            });
        };

        Ok(ReviewOutcome {
            review,
            rating: driver.rating,
        })
    })
}

/// Deletes all of a driver's reviews and zeroes both counters.
///
/// Returns the number of reviews removed.
///
/// # Errors
///
/// Returns `EntityNotFound` if the driver does not exist, or
/// `RuleViolation` if the user is not a driver.
pub fn reset_ratings(
    conn: &mut SqliteConnection,
    driver_id: i64,
) -> Result<usize, PersistenceError> {
    conn.immediate_transaction(|conn| {
        require_driver(conn, driver_id)?;

        let removed: usize = diesel::delete(driver_reviews::table)
            .filter(driver_reviews::driver_id.eq(driver_id))
            .execute(conn)?;
        diesel::update(users::table.find(driver_id))
            .set((users::rating_up.eq(0_i64), users::rating_down.eq(0_i64)))
            .execute(conn)?;

        info!(driver_id, removed, "Driver ratings reset");
        Ok(removed)
    })
}
