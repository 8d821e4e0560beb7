// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, DriverRating, MAX_REVIEW_NOTE_CHARS, normalize_review_note};

#[test]
fn test_score_is_up_minus_down() {
    assert_eq!(DriverRating::new(7, 3).score(), 4);
    assert_eq!(DriverRating::new(1, 4).score(), -3);
    assert_eq!(DriverRating::default().score(), 0);
}

#[test]
fn test_review_note_trimmed() {
    assert_eq!(
        normalize_review_note(Some("  on time  ")).unwrap(),
        Some(String::from("on time"))
    );
    assert_eq!(normalize_review_note(Some("   ")).unwrap(), None);
    assert_eq!(normalize_review_note(None).unwrap(), None);
}

#[test]
fn test_review_note_length_counts_characters() {
    let at_limit: String = "é".repeat(MAX_REVIEW_NOTE_CHARS);
    assert!(normalize_review_note(Some(&at_limit)).is_ok());

    let over: String = "x".repeat(MAX_REVIEW_NOTE_CHARS + 1);
    assert_eq!(
        normalize_review_note(Some(&over)),
        Err(DomainError::NoteTooLong {
            length: 501,
            max: 500,
        })
    );
}
