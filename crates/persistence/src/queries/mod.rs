// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `users`: Users and sessions
//! - `vehicles`: Vehicles and repairs
//! - `routes`: Routes, orders, daily reports and sweep candidates
//! - `inventory`: Spare parts and movements
//! - `ratings`: Driver reviews
//! - `availability`: Per-day availability

pub mod availability;
pub mod inventory;
pub mod ratings;
pub mod routes;
pub mod users;
pub mod vehicles;

use chrono::NaiveDate;
use fleetbook_domain::{DomainError, parse_day, parse_timestamp};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::PersistenceError;

/// Parses a stored enum column.
pub(crate) fn parse_stored<T>(column: &str, raw: &str) -> Result<T, PersistenceError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(raw).map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
}

/// Parses a stored `YYYY-MM-DD` column.
pub(crate) fn parse_stored_day(column: &str, raw: &str) -> Result<NaiveDate, PersistenceError> {
    parse_day(raw).map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
}

/// Parses an optional stored `YYYY-MM-DD` column.
pub(crate) fn parse_stored_opt_day(
    column: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, PersistenceError> {
    raw.map(|value| parse_stored_day(column, value)).transpose()
}

/// Parses an optional stored RFC 3339 column.
pub(crate) fn parse_stored_opt_timestamp(
    column: &str,
    raw: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    raw.map(|value| {
        parse_timestamp(value)
            .map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
    })
    .transpose()
}
