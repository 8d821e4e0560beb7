// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability persistence tests.

use fleetbook_domain::{AvailabilityChange, AvailabilityStatus, Role};

use crate::tests::{create_test_user, day, test_now};
use crate::{PersistenceError, SqlitePersistence};

fn set(status: AvailabilityStatus, note: Option<&str>) -> AvailabilityChange {
    AvailabilityChange::from_request(Some(status), note)
}

#[test]
fn test_set_availability_overwrites_single_record() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let user_id = create_test_user(&mut persistence, "driver", Role::Driver);
    let target = day(2026, 3, 12);

    persistence
        .set_availability(
            user_id,
            target,
            &set(AvailabilityStatus::Available, None),
            test_now(),
        )
        .unwrap();
    let stored = persistence
        .set_availability(
            user_id,
            target,
            &set(AvailabilityStatus::Partial, Some(" mornings only ")),
            test_now(),
        )
        .unwrap()
        .unwrap();

    assert_eq!(stored.status, AvailabilityStatus::Partial);
    assert_eq!(stored.note.as_deref(), Some("mornings only"));
    let records = persistence.list_availability(target, target, None).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_null_status_clears_record() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let user_id = create_test_user(&mut persistence, "driver", Role::Driver);
    let target = day(2026, 3, 12);
    persistence
        .set_availability(
            user_id,
            target,
            &set(AvailabilityStatus::Unavailable, None),
            test_now(),
        )
        .unwrap();

    let cleared = persistence
        .set_availability(user_id, target, &AvailabilityChange::Clear, test_now())
        .unwrap();

    assert_eq!(cleared, None);
    assert!(persistence.get_availability(user_id, target).unwrap().is_none());
}

#[test]
fn test_list_availability_orders_by_day_then_user() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let first = create_test_user(&mut persistence, "anna", Role::Driver);
    let second = create_test_user(&mut persistence, "boris", Role::Driver);
    for (user_id, dom) in [(second, 13), (first, 13), (second, 12), (first, 20)] {
        persistence
            .set_availability(
                user_id,
                day(2026, 3, dom),
                &set(AvailabilityStatus::Available, None),
                test_now(),
            )
            .unwrap();
    }

    let records = persistence
        .list_availability(day(2026, 3, 12), day(2026, 3, 13), None)
        .unwrap();
    let keys: Vec<_> = records.iter().map(|r| (r.day, r.user_id)).collect();
    assert_eq!(
        keys,
        vec![
            (day(2026, 3, 12), second),
            (day(2026, 3, 13), first),
            (day(2026, 3, 13), second),
        ]
    );

    let only_first = persistence
        .list_availability(day(2026, 3, 1), day(2026, 3, 31), Some(first))
        .unwrap();
    assert_eq!(only_first.len(), 2);
}

#[test]
fn test_availability_for_unknown_user_fails() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.set_availability(
        5,
        day(2026, 3, 12),
        &set(AvailabilityStatus::Available, None),
        test_now(),
    );

    assert_eq!(
        result,
        Err(PersistenceError::EntityNotFound {
            entity: "user",
            id: 5
        })
    );
}
