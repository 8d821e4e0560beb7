// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-day driver availability.
//!
//! There is at most one record per user and calendar day. Setting a status
//! overwrites the record; setting no status removes it.

use crate::dates::parse_day;
use crate::error::DomainError;
use crate::types::{AvailabilityStatus, normalize_note};
use chrono::{DateTime, NaiveDate, Utc};

/// What to do with the availability record of one user and day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityChange {
    /// Remove any record.
    Clear,
    /// Create or overwrite the record.
    Set {
        /// Declared status.
        status: AvailabilityStatus,
        /// Trimmed note, if any.
        note: Option<String>,
    },
}

impl AvailabilityChange {
    /// Builds a change from an optional status and note.
    #[must_use]
    pub fn from_request(status: Option<AvailabilityStatus>, note: Option<&str>) -> Self {
        status.map_or(Self::Clear, |status| Self::Set {
            status,
            note: normalize_note(note),
        })
    }
}

/// Normalizes a day given as `YYYY-MM-DD` or an RFC 3339 timestamp to its
/// UTC calendar date.
///
/// # Errors
///
/// Returns an error if the input is neither form.
pub fn normalize_day(raw: &str) -> Result<NaiveDate, DomainError> {
    let trimmed: &str = raw.trim();
    if trimmed.len() == 10 {
        return parse_day(trimmed);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|e| DomainError::DateParseError {
            date_string: raw.to_string(),
            error: e.to_string(),
        })
}
