// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fleetbook_domain::AvailabilityStatus;

use crate::handlers::availability::{list_availability, set_availability};
use crate::tests::helpers::{setup, test_now};
use crate::{
    ApiError, AvailabilityQuery, ListAvailabilityResponse, SetAvailabilityRequest,
    SetAvailabilityResponse,
};

fn request(user_id: Option<i64>, day: &str, status: Option<&str>) -> SetAvailabilityRequest {
    SetAvailabilityRequest {
        user_id,
        day: day.to_string(),
        status: status.map(str::to_string),
        note: None,
    }
}

fn march() -> AvailabilityQuery {
    AvailabilityQuery {
        from: Some(String::from("2026-03-01")),
        to: Some(String::from("2026-03-31")),
        user_id: None,
    }
}

#[test]
fn test_set_update_and_clear_availability() {
    let mut fleet = setup();

    let set: SetAvailabilityResponse = set_availability(
        &mut fleet.persistence,
        &fleet.driver,
        &request(None, "2026-03-12T22:30:00Z", Some("partial")),
        test_now(),
    )
    .unwrap();
    assert_eq!(set.user_id, fleet.driver.id);
    assert_eq!(set.day, "2026-03-12");
    assert_eq!(
        set.entry.map(|entry| entry.status),
        Some(AvailabilityStatus::Partial)
    );

    let mut update: SetAvailabilityRequest = request(None, "2026-03-12", Some("UNAVAILABLE"));
    update.note = Some(String::from("Doctor"));
    let updated: SetAvailabilityResponse =
        set_availability(&mut fleet.persistence, &fleet.driver, &update, test_now()).unwrap();
    let entry = updated.entry.unwrap();
    assert_eq!(entry.status, AvailabilityStatus::Unavailable);
    assert_eq!(entry.note.as_deref(), Some("Doctor"));

    let listed: ListAvailabilityResponse =
        list_availability(&mut fleet.persistence, &fleet.driver, &march()).unwrap();
    assert_eq!(listed.entries.len(), 1);

    let cleared: SetAvailabilityResponse = set_availability(
        &mut fleet.persistence,
        &fleet.driver,
        &request(None, "2026-03-12", Some("  ")),
        test_now(),
    )
    .unwrap();
    assert!(cleared.entry.is_none());

    let listed: ListAvailabilityResponse =
        list_availability(&mut fleet.persistence, &fleet.driver, &march()).unwrap();
    assert!(listed.entries.is_empty());
}

#[test]
fn test_drivers_manage_only_themselves() {
    let mut fleet = setup();

    let err = set_availability(
        &mut fleet.persistence,
        &fleet.driver,
        &request(Some(fleet.other_driver.id), "2026-03-12", Some("AVAILABLE")),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));

    set_availability(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request(Some(fleet.other_driver.id), "2026-03-12", Some("AVAILABLE")),
        test_now(),
    )
    .unwrap();
    set_availability(
        &mut fleet.persistence,
        &fleet.driver,
        &request(None, "2026-03-13", Some("AVAILABLE")),
        test_now(),
    )
    .unwrap();

    let own: ListAvailabilityResponse =
        list_availability(&mut fleet.persistence, &fleet.driver, &march()).unwrap();
    assert_eq!(own.entries.len(), 1);
    assert_eq!(own.entries[0].user_id, fleet.driver.id);

    let everyone: ListAvailabilityResponse =
        list_availability(&mut fleet.persistence, &fleet.dispatcher, &march()).unwrap();
    let days: Vec<&str> = everyone.entries.iter().map(|e| e.day.as_str()).collect();
    assert_eq!(days, vec!["2026-03-12", "2026-03-13"]);

    let mut query: AvailabilityQuery = march();
    query.user_id = Some(fleet.other_driver.id);
    let err = list_availability(&mut fleet.persistence, &fleet.driver, &query).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_list_requires_ordered_bounds() {
    let mut fleet = setup();

    let mut query: AvailabilityQuery = march();
    query.to = None;
    let err = list_availability(&mut fleet.persistence, &fleet.dispatcher, &query).unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "to"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let query: AvailabilityQuery = AvailabilityQuery {
        from: Some(String::from("2026-03-31")),
        to: Some(String::from("2026-03-01")),
        user_id: None,
    };
    let err = list_availability(&mut fleet.persistence, &fleet.dispatcher, &query).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_unknown_status_and_user() {
    let mut fleet = setup();

    let err = set_availability(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request(None, "2026-03-12", Some("holiday")),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));

    let err = set_availability(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request(Some(999), "2026-03-12", Some("AVAILABLE")),
        test_now(),
    )
    .unwrap_err();
    assert_eq!(err, ApiError::not_found("user", 999));
}
