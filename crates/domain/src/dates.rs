// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar and timestamp helpers.
//!
//! Calendar days (route dates, maintenance dates, availability days) are
//! `chrono::NaiveDate` and are stored as `YYYY-MM-DD`. Instants (reset
//! stamps, movement times, sessions) are `time::OffsetDateTime` and are
//! stored as RFC 3339 in UTC.

use crate::error::DomainError;
use chrono::{DateTime, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Formats a calendar day as `YYYY-MM-DD`.
#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` calendar day.
///
/// # Errors
///
/// Returns an error if the input is not a valid date.
pub fn parse_day(raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT).map_err(|e| DomainError::DateParseError {
        date_string: raw.to_string(),
        error: e.to_string(),
    })
}

/// Formats an instant as an RFC 3339 UTC timestamp with whole seconds.
///
/// Stored timestamps compare correctly as strings.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented.
pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, DomainError> {
    instant
        .to_offset(time::UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|e| DomainError::DateArithmeticOverflow {
            operation: format!("truncating timestamp: {e}"),
        })?
        .format(&Rfc3339)
        .map_err(|e| DomainError::DateArithmeticOverflow {
            operation: format!("formatting timestamp: {e}"),
        })
}

/// Parses an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns an error if the input is not a valid RFC 3339 timestamp.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339).map_err(|e| DomainError::DateParseError {
        date_string: raw.to_string(),
        error: e.to_string(),
    })
}

/// Returns the UTC calendar day of an instant.
///
/// # Errors
///
/// Returns an error if the instant is outside chrono's range.
pub fn utc_day_of(instant: OffsetDateTime) -> Result<NaiveDate, DomainError> {
    Ok(to_chrono(instant)?.date_naive())
}

/// Returns the calendar day of an instant as seen in `tz`.
///
/// This is "today" for the auto-complete sweep: a route dated before the
/// returned day is in the past at local midnight.
///
/// # Errors
///
/// Returns an error if the instant is outside chrono's range.
pub fn local_day_of(instant: OffsetDateTime, tz: Tz) -> Result<NaiveDate, DomainError> {
    Ok(to_chrono(instant)?.with_timezone(&tz).date_naive())
}

/// Parses an IANA timezone name.
///
/// # Errors
///
/// Returns an error if the name is not in the tz database.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.trim()
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Adds whole calendar months, clamping to the end of shorter months.
///
/// # Errors
///
/// Returns an error on overflow.
pub fn add_months(day: NaiveDate, months: u32) -> Result<NaiveDate, DomainError> {
    day.checked_add_months(Months::new(months))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("adding {months} months to {day}"),
        })
}

/// Subtracts whole calendar months, clamping to the end of shorter months.
///
/// # Errors
///
/// Returns an error on overflow.
pub fn sub_months(day: NaiveDate, months: u32) -> Result<NaiveDate, DomainError> {
    day.checked_sub_months(Months::new(months))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("subtracting {months} months from {day}"),
        })
}

fn to_chrono(instant: OffsetDateTime) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp(instant.unix_timestamp(), instant.nanosecond()).ok_or_else(|| {
        DomainError::DateArithmeticOverflow {
            operation: format!("converting {instant} to a calendar date"),
        }
    })
}
