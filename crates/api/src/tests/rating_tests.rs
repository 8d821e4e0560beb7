// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleetbook_domain::{MAX_REVIEW_NOTE_CHARS, ReviewDirection};

use crate::handlers::ratings::{add_review, list_reviews, reset_ratings};
use crate::tests::helpers::{setup, test_now};
use crate::{ApiError, DriverReviewsResponse, ReviewRequest, ReviewResponse};

fn review(direction: &str, note: Option<&str>) -> ReviewRequest {
    ReviewRequest {
        direction: direction.to_string(),
        note: note.map(str::to_string),
    }
}

#[test]
fn test_reviews_adjust_counters_and_reset_clears_them() {
    let mut fleet = setup();
    let driver_id: i64 = fleet.driver.id;

    let up: ReviewResponse = add_review(
        &mut fleet.persistence,
        &fleet.dispatcher,
        driver_id,
        &review("UP", Some("On time all week")),
        test_now(),
    )
    .unwrap();
    assert_eq!((up.rating_up, up.rating_down, up.score), (1, 0, 1));
    assert_eq!(up.review.created_by, Some(fleet.dispatcher.id));

    let down: ReviewResponse = add_review(
        &mut fleet.persistence,
        &fleet.dispatcher,
        driver_id,
        &review("down", None),
        test_now(),
    )
    .unwrap();
    assert_eq!((down.rating_up, down.rating_down, down.score), (1, 1, 0));

    let ledger: DriverReviewsResponse =
        list_reviews(&mut fleet.persistence, &fleet.driver, driver_id).unwrap();
    assert_eq!(ledger.reviews.len(), 2);
    assert_eq!(ledger.reviews[0].direction, ReviewDirection::Down);
    assert_eq!(ledger.reviews[1].note.as_deref(), Some("On time all week"));

    let reset = reset_ratings(&mut fleet.persistence, &fleet.dispatcher, driver_id).unwrap();
    assert_eq!(reset.removed_reviews, 2);

    let ledger: DriverReviewsResponse =
        list_reviews(&mut fleet.persistence, &fleet.dispatcher, driver_id).unwrap();
    assert_eq!(
        (ledger.rating_up, ledger.rating_down, ledger.score),
        (0, 0, 0)
    );
    assert!(ledger.reviews.is_empty());
}

#[test]
fn test_only_drivers_are_reviewed() {
    let mut fleet = setup();

    let err = add_review(
        &mut fleet.persistence,
        &fleet.dispatcher,
        fleet.admin.id,
        &review("up", None),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));

    let err = add_review(
        &mut fleet.persistence,
        &fleet.dispatcher,
        999,
        &review("up", None),
        test_now(),
    )
    .unwrap_err();
    assert_eq!(err, ApiError::not_found("user", 999));

    let err = add_review(
        &mut fleet.persistence,
        &fleet.dispatcher,
        fleet.driver.id,
        &review("sideways", None),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_overlong_review_note_is_rejected() {
    let mut fleet = setup();
    let note: String = "x".repeat(MAX_REVIEW_NOTE_CHARS + 1);

    let err = add_review(
        &mut fleet.persistence,
        &fleet.dispatcher,
        fleet.driver.id,
        &review("up", Some(&note)),
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "note"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_drivers_see_only_their_own_ledger_and_cannot_review() {
    let mut fleet = setup();

    assert!(list_reviews(&mut fleet.persistence, &fleet.driver, fleet.driver.id).is_ok());
    let err =
        list_reviews(&mut fleet.persistence, &fleet.driver, fleet.other_driver.id).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));

    let err = add_review(
        &mut fleet.persistence,
        &fleet.driver,
        fleet.other_driver.id,
        &review("down", None),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(reset_ratings(&mut fleet.persistence, &fleet.driver, fleet.driver.id).is_err());
}
