// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session persistence tests.

use fleetbook_domain::{LoginName, Role};
use time::Duration;

use crate::tests::{create_test_user, test_now};
use crate::{PersistenceError, SqlitePersistence};

#[test]
fn test_create_user_normalizes_login_and_hashes_password() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let user_id = create_test_user(&mut persistence, "jnovak", Role::Driver);

    let user = persistence.get_user_by_login("  JNovak ").unwrap().unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.login_name, "JNOVAK");
    assert_eq!(user.role, Role::Driver);
    assert_ne!(user.password_hash, "Password123!");
    assert!(
        persistence
            .verify_password("Password123!", &user.password_hash)
            .unwrap()
    );
    assert!(
        !persistence
            .verify_password("wrong", &user.password_hash)
            .unwrap()
    );
}

#[test]
fn test_duplicate_login_is_unique_violation() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    create_test_user(&mut persistence, "jnovak", Role::Driver);

    let result = persistence.create_user(
        &LoginName::parse("JNOVAK").unwrap(),
        "Other",
        "Password123!",
        Role::Dispatcher,
        test_now(),
    );

    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_list_users_filters_by_role() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    create_test_user(&mut persistence, "boss", Role::Admin);
    create_test_user(&mut persistence, "bravo", Role::Driver);
    create_test_user(&mut persistence, "alpha", Role::Driver);

    let drivers = persistence.list_users(Some(Role::Driver)).unwrap();
    let logins: Vec<&str> = drivers.iter().map(|u| u.login_name.as_str()).collect();
    assert_eq!(logins, vec!["ALPHA", "BRAVO"]);
    assert_eq!(persistence.list_users(None).unwrap().len(), 3);
}

#[test]
fn test_disable_user_revokes_sessions() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let user_id = create_test_user(&mut persistence, "jnovak", Role::Driver);
    persistence
        .create_session(
            "session_a",
            user_id,
            test_now(),
            test_now() + Duration::days(30),
        )
        .unwrap();

    persistence.disable_user(user_id, test_now()).unwrap();

    let user = persistence.get_user_by_id(user_id).unwrap().unwrap();
    assert!(user.is_disabled);
    assert_eq!(user.disabled_at.as_deref(), Some("2026-03-10T08:00:00Z"));
    assert!(persistence.get_session_by_token("session_a").unwrap().is_none());
}

#[test]
fn test_disable_missing_user_is_not_found() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.disable_user(404, test_now());

    assert_eq!(
        result,
        Err(PersistenceError::EntityNotFound {
            entity: "user",
            id: 404
        })
    );
}

#[test]
fn test_delete_expired_sessions_keeps_live_ones() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let user_id = create_test_user(&mut persistence, "jnovak", Role::Driver);
    persistence
        .create_session("old", user_id, test_now(), test_now() - Duration::hours(1))
        .unwrap();
    persistence
        .create_session("live", user_id, test_now(), test_now() + Duration::hours(1))
        .unwrap();

    let removed = persistence.delete_expired_sessions(test_now()).unwrap();

    assert_eq!(removed, 1);
    assert!(persistence.get_session_by_token("old").unwrap().is_none());
    let live = persistence.get_session_by_token("live").unwrap().unwrap();
    assert_eq!(live.expires_at, "2026-03-10T09:00:00Z");
}

#[test]
fn test_logout_deletes_session() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let user_id = create_test_user(&mut persistence, "jnovak", Role::Driver);
    persistence
        .create_session("token", user_id, test_now(), test_now() + Duration::days(1))
        .unwrap();

    persistence.delete_session("token").unwrap();

    assert!(persistence.get_session_by_token("token").unwrap().is_none());
}
