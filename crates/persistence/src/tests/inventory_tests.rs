// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spare-parts ledger persistence tests.

use fleetbook_domain::{DomainError, MovementType, OPENING_BALANCE_NOTE, ledger_balance};

use crate::mutations::inventory::write_movement;
use crate::tests::{create_test_vehicle, test_ctx};
use crate::{NewMovement, NewSparePart, PersistenceError, SparePartEdit, SqlitePersistence};

fn new_part(quantity: i64) -> NewSparePart {
    NewSparePart {
        name: String::from("Oil filter"),
        unit: String::from("pcs"),
        quantity,
        min_stock: 2,
        note: None,
    }
}

fn movement(part_id: i64, movement_type: MovementType, quantity: i64) -> NewMovement {
    NewMovement {
        part_id,
        movement_type,
        quantity,
        vehicle_id: None,
        note: None,
    }
}

#[test]
fn test_create_part_with_stock_records_opening_balance() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();

    assert_eq!(part.quantity, 5);
    let movements = persistence.list_movements(part.part_id).unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::In);
    assert_eq!(movements[0].quantity, 5);
    assert_eq!(movements[0].note.as_deref(), Some(OPENING_BALANCE_NOTE));
}

#[test]
fn test_create_empty_part_has_no_movements() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let part = persistence
        .create_spare_part(&new_part(0), test_ctx())
        .unwrap();

    assert!(part.is_low_stock());
    assert!(persistence.list_movements(part.part_id).unwrap().is_empty());
}

#[test]
fn test_issue_beyond_stock_is_rejected_and_changes_nothing() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();

    let result =
        persistence.record_movement(&movement(part.part_id, MovementType::Out, 6), test_ctx());

    let err = match result {
        Err(PersistenceError::RuleViolation(err)) => err,
        other => panic!("expected a rule violation, got {other:?}"),
    };
    assert_eq!(
        err,
        DomainError::InsufficientStock {
            available: 5,
            unit: String::from("pcs")
        }
    );
    assert_eq!(err.to_string(), "Insufficient stock, available: 5 pcs");
    let reloaded = persistence.get_spare_part(part.part_id).unwrap().unwrap();
    assert_eq!(reloaded.quantity, 5);
    assert_eq!(persistence.list_movements(part.part_id).unwrap().len(), 1);
}

#[test]
fn test_issue_against_stale_snapshot_matches_no_rows() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let stale = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();
    persistence
        .record_movement(&movement(stale.part_id, MovementType::Out, 4), test_ctx())
        .unwrap();

    // `stale` still shows 5 on hand while the table holds 1.
    let result = write_movement(
        &mut persistence.conn,
        &stale,
        &movement(stale.part_id, MovementType::Out, 3),
        test_ctx(),
    );

    let violation = DomainError::InsufficientStock {
        available: 1,
        unit: String::from("pcs"),
    };
    assert_eq!(
        result.unwrap_err(),
        PersistenceError::RuleViolation(violation)
    );
    let reloaded = persistence.get_spare_part(stale.part_id).unwrap().unwrap();
    assert_eq!(reloaded.quantity, 1);
    let movements = persistence.list_movements(stale.part_id).unwrap();
    assert_eq!(movements.len(), 2);
    let balance = ledger_balance(movements.iter().map(|m| (m.movement_type, m.quantity)));
    assert_eq!(balance, 1);
}

#[test]
fn test_non_positive_quantity_is_rejected() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();

    let result =
        persistence.record_movement(&movement(part.part_id, MovementType::In, 0), test_ctx());

    assert!(matches!(
        result,
        Err(PersistenceError::RuleViolation(
            DomainError::InvalidQuantity { quantity: 0 }
        ))
    ));
}

#[test]
fn test_quantity_matches_ledger_balance() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let vehicle = create_test_vehicle(&mut persistence, "1AB2345");
    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();

    persistence
        .record_movement(&movement(part.part_id, MovementType::In, 10), test_ctx())
        .unwrap();
    let issue = NewMovement {
        vehicle_id: Some(vehicle.vehicle_id),
        note: Some(String::from("Service")),
        ..movement(part.part_id, MovementType::Out, 12)
    };
    let outcome = persistence.record_movement(&issue, test_ctx()).unwrap();

    assert_eq!(outcome.part.quantity, 3);
    assert!(outcome.part.is_low_stock());
    assert_eq!(outcome.movement.vehicle_id, Some(vehicle.vehicle_id));

    let movements = persistence.list_movements(part.part_id).unwrap();
    let balance = ledger_balance(movements.iter().map(|m| (m.movement_type, m.quantity)));
    assert_eq!(balance, outcome.part.quantity);
}

#[test]
fn test_movement_for_unknown_vehicle_fails() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();
    let issue = NewMovement {
        vehicle_id: Some(42),
        ..movement(part.part_id, MovementType::Out, 1)
    };

    let result = persistence.record_movement(&issue, test_ctx());

    assert!(matches!(
        result,
        Err(PersistenceError::EntityNotFound {
            entity: "vehicle",
            id: 42
        })
    ));
}

#[test]
fn test_update_part_keeps_quantity() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();

    let updated = persistence
        .update_spare_part(
            part.part_id,
            &SparePartEdit {
                name: String::from("Fuel filter"),
                unit: String::from("ks"),
                min_stock: 1,
                note: Some(String::from("Shelf B")),
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Fuel filter");
    assert_eq!(updated.quantity, 5);
    assert!(!updated.is_low_stock());
}

#[test]
fn test_delete_part_cascades_movements() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let part = persistence
        .create_spare_part(&new_part(5), test_ctx())
        .unwrap();

    persistence.delete_spare_part(part.part_id).unwrap();

    assert!(persistence.get_spare_part(part.part_id).unwrap().is_none());
    assert!(persistence.list_movements(part.part_id).unwrap().is_empty());
}
