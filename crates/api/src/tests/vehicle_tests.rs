// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for vehicles, maintenance counters and repairs.

use fleetbook_domain::{CounterKind, DateFact, DueStatus};

use crate::handlers::vehicles::{
    add_km, create_repair, create_vehicle, delete_repair, delete_vehicle, get_maintenance,
    get_vehicle, list_repairs, list_vehicles, reset_counter, set_limits, set_maintenance_date,
    update_vehicle,
};
use crate::tests::helpers::{setup, test_now, today};
use crate::{
    AddKmRequest, ApiError, CounterView, DateFactView, MaintenanceResponse, RepairInfo,
    RepairRequest, ResetCounterRequest, SetDateRequest, SetLimitsRequest, VehicleInfo,
    VehicleRequest,
};

fn counter(response: &MaintenanceResponse, kind: CounterKind) -> &CounterView {
    response
        .counters
        .iter()
        .find(|view| view.counter == kind)
        .unwrap()
}

fn date_fact(response: &MaintenanceResponse, fact: DateFact) -> &DateFactView {
    response
        .dates
        .iter()
        .find(|view| view.fact == fact)
        .unwrap()
}

fn vehicle_request(plate: &str) -> VehicleRequest {
    VehicleRequest {
        plate: plate.to_string(),
        name: String::from("Transit"),
        note: Some(String::from("   ")),
    }
}

fn km(value: i64) -> AddKmRequest {
    AddKmRequest { km: Some(value) }
}

#[test]
fn test_create_vehicle_normalizes_plate_and_note() {
    let mut fleet = setup();

    let vehicle = create_vehicle(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &vehicle_request(" 1ab 2345 "),
        test_now(),
        today(),
    )
    .unwrap();

    assert_eq!(vehicle.plate, "1AB2345");
    assert_eq!(vehicle.note, None);
    assert!(!vehicle.needs_attention);
}

#[test]
fn test_duplicate_plate_is_a_conflict() {
    let mut fleet = setup();
    fleet.add_vehicle("1AB2345");

    let err = create_vehicle(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &vehicle_request("1ab2345"),
        test_now(),
        today(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Conflict {
            rule: String::from("unique_plate"),
            message: String::from("Vehicle with plate 1AB2345 already exists"),
        }
    );
}

#[test]
fn test_renaming_onto_another_plate_is_a_conflict() {
    let mut fleet = setup();
    fleet.add_vehicle("1AB2345");
    let second: i64 = fleet.add_vehicle("2CD6789");

    let err = update_vehicle(
        &mut fleet.persistence,
        &fleet.dispatcher,
        second,
        &vehicle_request("1AB2345"),
        today(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));

    let renamed = update_vehicle(
        &mut fleet.persistence,
        &fleet.dispatcher,
        second,
        &VehicleRequest {
            plate: String::from("3EF0001"),
            name: String::from("Sprinter"),
            note: Some(String::from("Cold chain")),
        },
        today(),
    )
    .unwrap();
    assert_eq!(renamed.plate, "3EF0001");
    assert_eq!(renamed.note.as_deref(), Some("Cold chain"));
}

#[test]
fn test_drivers_read_but_do_not_write_vehicles() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    assert_eq!(
        list_vehicles(&mut fleet.persistence, &fleet.driver, today())
            .unwrap()
            .vehicles
            .len(),
        1
    );
    assert!(get_maintenance(&mut fleet.persistence, &fleet.driver, vehicle_id, today()).is_ok());

    let err = create_vehicle(
        &mut fleet.persistence,
        &fleet.driver,
        &vehicle_request("9ZZ9999"),
        test_now(),
        today(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    let denied = add_km(
        &mut fleet.persistence,
        &fleet.driver,
        vehicle_id,
        &km(10),
        today(),
    );
    assert!(denied.is_err());
}

#[test]
fn test_add_km_credits_all_four_counters_equally() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let before: MaintenanceResponse = get_maintenance(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        today(),
    )
    .unwrap();

    let after: MaintenanceResponse = add_km(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &km(120),
        today(),
    )
    .unwrap();

    for kind in CounterKind::ALL {
        assert_eq!(counter(&after, kind).km, counter(&before, kind).km + 120);
        assert_eq!(
            counter(&after, kind).limit_km,
            counter(&before, kind).limit_km
        );
        assert_eq!(counter(&after, kind).last_reset_at, None);
    }
    assert_eq!(after.dates, before.dates);
}

#[test]
fn test_add_km_requires_a_non_negative_number() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let missing = add_km(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &AddKmRequest { km: None },
        today(),
    )
    .unwrap_err();
    assert!(matches!(missing, ApiError::InvalidInput { .. }));

    let negative = add_km(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &km(-5),
        today(),
    )
    .unwrap_err();
    assert!(matches!(negative, ApiError::InvalidInput { .. }));

    let unknown = add_km(
        &mut fleet.persistence,
        &fleet.dispatcher,
        999,
        &km(5),
        today(),
    )
    .unwrap_err();
    assert_eq!(unknown, ApiError::not_found("vehicle", 999));
}

#[test]
fn test_reset_oil_leaves_other_counters() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    add_km(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &km(5000),
        today(),
    )
    .unwrap();

    let after: MaintenanceResponse = reset_counter(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &ResetCounterRequest {
            counter: String::from("OIL"),
        },
        test_now(),
        today(),
    )
    .unwrap();

    let oil: &CounterView = counter(&after, CounterKind::Oil);
    assert_eq!(oil.km, 0);
    assert_eq!(oil.last_reset_at.as_deref(), Some("2026-03-10T08:00:00Z"));
    for kind in [CounterKind::AdBlue, CounterKind::Brakes, CounterKind::Bearings] {
        assert_eq!(counter(&after, kind).km, 5000);
        assert_eq!(counter(&after, kind).last_reset_at, None);
    }
}

#[test]
fn test_reset_brake_fluid_records_todays_change() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let after: MaintenanceResponse = reset_counter(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &ResetCounterRequest {
            counter: String::from("brakeFluid"),
        },
        test_now(),
        today(),
    )
    .unwrap();

    let brake_fluid: &DateFactView = date_fact(&after, DateFact::BrakeFluid);
    assert_eq!(brake_fluid.date.as_deref(), Some("2026-03-10"));
    assert_eq!(brake_fluid.next_due.as_deref(), Some("2028-03-10"));
    assert_eq!(brake_fluid.status, DueStatus::Ok);
}

#[test]
fn test_unknown_counter_is_invalid_input() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let err = reset_counter(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &ResetCounterRequest {
            counter: String::from("tyres"),
        },
        test_now(),
        today(),
    )
    .unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "counter"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_inspection_expiring_soon_needs_attention() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let after: MaintenanceResponse = set_maintenance_date(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &SetDateRequest {
            fact: String::from("stk"),
            date: Some(String::from("2026-03-20")),
        },
        today(),
    )
    .unwrap();

    let inspection: &DateFactView = date_fact(&after, DateFact::TechnicalInspection);
    assert_eq!(inspection.next_due.as_deref(), Some("2026-03-20"));
    assert_eq!(inspection.days_remaining, Some(10));
    assert_eq!(inspection.status, DueStatus::Soon);
    assert!(
        get_vehicle(&mut fleet.persistence, &fleet.driver, vehicle_id, today())
            .unwrap()
            .needs_attention
    );

    let cleared: MaintenanceResponse = set_maintenance_date(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &SetDateRequest {
            fact: String::from("technicalInspection"),
            date: Some(String::new()),
        },
        today(),
    )
    .unwrap();
    let inspection: &DateFactView = date_fact(&cleared, DateFact::TechnicalInspection);
    assert_eq!(inspection.date, None);
    assert_eq!(inspection.status, DueStatus::Unknown);
}

#[test]
fn test_set_limits_changes_only_supplied_values() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let before: MaintenanceResponse = get_maintenance(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        today(),
    )
    .unwrap();

    let after: MaintenanceResponse = set_limits(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &SetLimitsRequest {
            oil_limit_km: Some(10_000),
            coolant_interval_months: Some(36),
            ..SetLimitsRequest::default()
        },
        today(),
    )
    .unwrap();

    assert_eq!(counter(&after, CounterKind::Oil).limit_km, 10_000);
    assert_eq!(
        counter(&after, CounterKind::Brakes).limit_km,
        counter(&before, CounterKind::Brakes).limit_km
    );
    assert_eq!(date_fact(&after, DateFact::Coolant).interval_months, 36);
    assert_eq!(
        date_fact(&after, DateFact::GreenCard).interval_months,
        date_fact(&before, DateFact::GreenCard).interval_months
    );
}

#[test]
fn test_set_limits_rejects_empty_and_non_positive() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let empty = set_limits(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &SetLimitsRequest::default(),
        today(),
    )
    .unwrap_err();
    assert!(matches!(empty, ApiError::InvalidInput { .. }));

    let zero = set_limits(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &SetLimitsRequest {
            adblue_limit_km: Some(0),
            ..SetLimitsRequest::default()
        },
        today(),
    )
    .unwrap_err();
    assert!(matches!(zero, ApiError::InvalidInput { .. }));
}

#[test]
fn test_due_counter_needs_attention() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    set_limits(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &SetLimitsRequest {
            bearings_limit_km: Some(100),
            ..SetLimitsRequest::default()
        },
        today(),
    )
    .unwrap();

    let after: MaintenanceResponse = add_km(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &km(150),
        today(),
    )
    .unwrap();

    let bearings: &CounterView = counter(&after, CounterKind::Bearings);
    assert!(bearings.is_due);
    assert_eq!(bearings.remaining_km, -50);
    let vehicle: VehicleInfo = get_vehicle(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        today(),
    )
    .unwrap();
    assert!(vehicle.needs_attention);
}

#[test]
fn test_repair_log_lifecycle() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let first: RepairInfo = create_repair(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &RepairRequest {
            repair_date: String::from("2026-02-01"),
            description: String::from("Brake pads"),
            cost: Some(125_000),
            odometer_km: Some(84_000),
            note: None,
        },
        test_now(),
    )
    .unwrap();
    assert_eq!(first.cost.as_deref(), Some("1250.00"));
    assert_eq!(first.created_by, Some(fleet.dispatcher.id));

    let second: RepairInfo = create_repair(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &RepairRequest {
            repair_date: String::from("2026-03-05"),
            description: String::from("Wiper motor"),
            cost: None,
            odometer_km: None,
            note: Some(String::from("Under warranty")),
        },
        test_now(),
    )
    .unwrap();

    let listed = list_repairs(&mut fleet.persistence, &fleet.driver, vehicle_id).unwrap();
    let ids: Vec<i64> = listed.repairs.iter().map(|r| r.repair_id).collect();
    assert_eq!(ids, vec![second.repair_id, first.repair_id]);

    delete_repair(&mut fleet.persistence, &fleet.dispatcher, first.repair_id).unwrap();
    let err =
        delete_repair(&mut fleet.persistence, &fleet.dispatcher, first.repair_id).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_repair_requires_description_and_date() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    let err = create_repair(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &RepairRequest {
            repair_date: String::from("someday"),
            description: String::from("Oil"),
            cost: None,
            odometer_km: None,
            note: None,
        },
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "repairDate"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let err = create_repair(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        &RepairRequest {
            repair_date: String::from("2026-03-01"),
            description: String::from("  "),
            cost: None,
            odometer_km: None,
            note: None,
        },
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_delete_vehicle() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");

    assert!(delete_vehicle(&mut fleet.persistence, &fleet.driver, vehicle_id).is_err());
    delete_vehicle(&mut fleet.persistence, &fleet.dispatcher, vehicle_id).unwrap();

    let err = get_vehicle(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        today(),
    )
    .unwrap_err();
    assert_eq!(err, ApiError::not_found("vehicle", vehicle_id));
}
