// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! Every handler takes the persistence layer, the authenticated principal
//! and, where time matters, the current instant or fleet-local day. The
//! order is always: authorize, parse, act, translate.
//!
//! - `auth`: Login, logout, whoami
//! - `users`: User management and bootstrap
//! - `vehicles`: Vehicles, maintenance counters and repairs
//! - `routes`: Routes, orders and daily reports
//! - `sweep`: The auto-complete sweep
//! - `inventory`: Spare parts and stock movements
//! - `ratings`: Driver reviews
//! - `availability`: Per-day availability

pub mod auth;
pub mod availability;
pub mod inventory;
pub mod ratings;
pub mod routes;
pub mod sweep;
pub mod users;
pub mod vehicles;

use chrono::NaiveDate;
use fleetbook_domain::{DomainError, normalize_day, parse_day};
use std::str::FromStr;

use crate::error::ApiError;

/// Parses a case-insensitive enum value.
pub(crate) fn parse_value<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(raw).map_err(ApiError::from)
}

/// Parses an optional enum value. Absent or blank input is `None`.
pub(crate) fn parse_optional_value<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_value)
        .transpose()
}

/// Parses a required day given as `YYYY-MM-DD` or RFC 3339.
pub(crate) fn require_day(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    normalize_day(raw).map_err(|e| ApiError::invalid(field, e.to_string()))
}

/// Parses an optional day. Absent or blank input is `None`.
pub(crate) fn parse_optional_day(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| require_day(field, value))
        .transpose()
}

/// Parses an optional strict `YYYY-MM-DD` query bound.
pub(crate) fn parse_query_day(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_day(value).map_err(|e| ApiError::invalid(field, e.to_string())))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetbook_domain::RouteStatus;

    #[test]
    fn test_blank_optional_values_are_none() {
        assert_eq!(parse_optional_value::<RouteStatus>(Some("  ")), Ok(None));
        assert_eq!(parse_optional_value::<RouteStatus>(None), Ok(None));
        assert_eq!(
            parse_optional_value::<RouteStatus>(Some("in_progress")),
            Ok(Some(RouteStatus::InProgress))
        );
    }

    #[test]
    fn test_days_accept_timestamps() {
        assert_eq!(
            require_day("routeDate", "2026-03-10T23:30:00Z"),
            Ok(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap_or_default())
        );
        assert!(matches!(
            require_day("routeDate", "tomorrow"),
            Err(ApiError::InvalidInput { .. })
        ));
    }
}
