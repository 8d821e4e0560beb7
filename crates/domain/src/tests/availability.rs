// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AvailabilityChange, AvailabilityStatus, normalize_day};
use chrono::NaiveDate;

#[test]
fn test_plain_day_is_kept() {
    assert_eq!(
        normalize_day("2026-03-05").unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
    );
}

#[test]
fn test_timestamp_normalized_to_utc_day() {
    assert_eq!(
        normalize_day("2026-03-05T23:30:00-02:00").unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
    );
    assert_eq!(
        normalize_day("2026-03-05T00:30:00+02:00").unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
    );
    assert_eq!(
        normalize_day("2026-03-05T00:00:00Z").unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
    );
}

#[test]
fn test_malformed_day_rejected() {
    assert!(normalize_day("next tuesday").is_err());
    assert!(normalize_day("2026-02-30").is_err());
}

#[test]
fn test_missing_status_clears() {
    assert_eq!(
        AvailabilityChange::from_request(None, Some("holiday")),
        AvailabilityChange::Clear
    );
    assert_eq!(
        AvailabilityChange::from_request(Some(AvailabilityStatus::Partial), Some("  ")),
        AvailabilityChange::Set {
            status: AvailabilityStatus::Partial,
            note: None,
        }
    );
}
