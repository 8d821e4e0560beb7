// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Driver review queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::ReviewDirection;

use crate::data_models::ReviewData;
use crate::diesel_schema::driver_reviews;
use crate::error::PersistenceError;
use crate::queries::parse_stored;

/// Diesel Queryable struct for review rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = driver_reviews)]
struct ReviewRow {
    review_id: i64,
    driver_id: i64,
    direction: String,
    note: Option<String>,
    created_by: Option<i64>,
    created_at: String,
}

impl TryFrom<ReviewRow> for ReviewData {
    type Error = PersistenceError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            review_id: row.review_id,
            driver_id: row.driver_id,
            direction: parse_stored::<ReviewDirection>("driver_reviews.direction", &row.direction)?,
            note: row.note,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Lists a driver's reviews, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_reviews(
    conn: &mut SqliteConnection,
    driver_id: i64,
) -> Result<Vec<ReviewData>, PersistenceError> {
    driver_reviews::table
        .filter(driver_reviews::driver_id.eq(driver_id))
        .select(ReviewRow::as_select())
        .order_by(driver_reviews::review_id.desc())
        .load::<ReviewRow>(conn)?
        .into_iter()
        .map(ReviewData::try_from)
        .collect()
}

/// Retrieves a single review.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if the review is not found.
pub fn get_review(
    conn: &mut SqliteConnection,
    review_id: i64,
) -> Result<Option<ReviewData>, PersistenceError> {
    driver_reviews::table
        .find(review_id)
        .select(ReviewRow::as_select())
        .first::<ReviewRow>(conn)
        .optional()?
        .map(ReviewData::try_from)
        .transpose()
}

/// Counts a driver's reviews in one direction.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_reviews(
    conn: &mut SqliteConnection,
    driver_id: i64,
    direction: ReviewDirection,
) -> Result<i64, PersistenceError> {
    Ok(driver_reviews::table
        .filter(driver_reviews::driver_id.eq(driver_id))
        .filter(driver_reviews::direction.eq(direction.as_str()))
        .count()
        .get_result(conn)?)
}
