// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Driver reviews.
//!
//! Each review is an up or down vote with an optional note, kept in a
//! per-driver ledger alongside running `up` and `down` counters. The net
//! score is derived from the counters whenever it is read and is never
//! stored. A reset clears the ledger and zeroes both counters.

use crate::error::DomainError;
use crate::types::normalize_note;
use serde::{Deserialize, Serialize};

/// Longest review note accepted, in characters.
pub const MAX_REVIEW_NOTE_CHARS: usize = 500;

/// Running review counters of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverRating {
    /// Number of positive reviews.
    pub up: i64,
    /// Number of negative reviews.
    pub down: i64,
}

impl DriverRating {
    /// Creates a rating from stored counters.
    #[must_use]
    pub const fn new(up: i64, down: i64) -> Self {
        Self { up, down }
    }

    /// Net score. Computed, never stored.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.up - self.down
    }
}

/// Trims a review note and enforces the length cap.
///
/// # Errors
///
/// Returns an error if the trimmed note is longer than
/// [`MAX_REVIEW_NOTE_CHARS`].
pub fn normalize_review_note(raw: Option<&str>) -> Result<Option<String>, DomainError> {
    let note: Option<String> = normalize_note(raw);
    if let Some(text) = &note {
        let length: usize = text.chars().count();
        if length > MAX_REVIEW_NOTE_CHARS {
            return Err(DomainError::NoteTooLong {
                length,
                max: MAX_REVIEW_NOTE_CHARS,
            });
        }
    }
    Ok(note)
}
