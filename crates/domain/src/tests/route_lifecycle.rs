// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CounterKind, DomainError, MaintenanceState, RouteStatus, UsageCounter, is_sweep_candidate,
    km_to_credit, plan_status_change, validate_amount,
};
use chrono::NaiveDate;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_km_to_credit_prefers_actual_distance() {
    assert_eq!(km_to_credit(Some(300), Some(250)), 300);
    assert_eq!(km_to_credit(None, Some(250)), 250);
    assert_eq!(km_to_credit(Some(0), Some(250)), 250);
    assert_eq!(km_to_credit(Some(-5), None), 0);
    assert_eq!(km_to_credit(None, None), 0);
}

#[test]
fn test_completion_from_open_status_credits() {
    let change = plan_status_change(RouteStatus::Planned, RouteStatus::Completed).unwrap();
    assert!(change.completes);
    assert!(!change.is_noop());

    let change = plan_status_change(RouteStatus::InProgress, RouteStatus::Completed).unwrap();
    assert!(change.completes);
}

#[test]
fn test_resaving_completed_route_does_not_credit() {
    let change = plan_status_change(RouteStatus::Completed, RouteStatus::Completed).unwrap();
    assert!(!change.completes);
    assert!(change.is_noop());
}

#[test]
fn test_completed_is_terminal() {
    assert_eq!(
        plan_status_change(RouteStatus::Completed, RouteStatus::Planned),
        Err(DomainError::InvalidStatusTransition {
            from: RouteStatus::Completed,
            to: RouteStatus::Planned,
        })
    );
    assert!(plan_status_change(RouteStatus::Completed, RouteStatus::InProgress).is_err());
}

#[test]
fn test_open_statuses_move_freely() {
    let change = plan_status_change(RouteStatus::InProgress, RouteStatus::Planned).unwrap();
    assert!(!change.completes);
    let change = plan_status_change(RouteStatus::Planned, RouteStatus::InProgress).unwrap();
    assert!(!change.completes);
}

#[test]
fn test_sweep_candidate_selection() {
    let today: NaiveDate = day(2026, 3, 10);
    let candidate = |route_date, status, has_vehicle| {
        is_sweep_candidate(route_date, status, has_vehicle, today)
    };

    assert!(candidate(day(2026, 3, 9), RouteStatus::Planned, true));
    assert!(candidate(day(2026, 1, 2), RouteStatus::InProgress, true));
    assert!(!candidate(day(2026, 3, 10), RouteStatus::Planned, true));
    assert!(!candidate(day(2026, 3, 9), RouteStatus::Completed, true));
    assert!(!candidate(day(2026, 3, 9), RouteStatus::Planned, false));
}

#[test]
fn test_sweeping_twice_credits_once() {
    let today: NaiveDate = day(2026, 3, 10);
    let route_date: NaiveDate = day(2026, 3, 9);
    let mut status: RouteStatus = RouteStatus::Planned;
    let mut vehicle: MaintenanceState = MaintenanceState {
        oil: UsageCounter::with_state(1000, 15_000, None),
        ..MaintenanceState::default()
    };

    for _ in 0..2 {
        if is_sweep_candidate(route_date, status, true, today) {
            let change = plan_status_change(status, RouteStatus::Completed).unwrap();
            if change.completes {
                vehicle.credit_distance(km_to_credit(None, Some(250)));
            }
            status = change.to;
        }
    }

    assert_eq!(status, RouteStatus::Completed);
    assert_eq!(vehicle.counter(CounterKind::Oil).km(), 1250);
    assert_eq!(vehicle.counter(CounterKind::Bearings).km(), 250);
}

#[test]
fn test_negative_amounts_rejected() {
    assert!(validate_amount("plannedKm", Some(0)).is_ok());
    assert!(validate_amount("plannedKm", None).is_ok());
    assert_eq!(
        validate_amount("actualKm", Some(-1)),
        Err(DomainError::NegativeAmount {
            field: "actualKm",
            value: -1,
        })
    );
}
