// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{LoginName, Role};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;
use crate::mutations::stamp;

/// Creates a new user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `login_name` - The normalized login name
/// * `display_name` - The display name
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The role
/// * `now` - Creation time
///
/// # Errors
///
/// Returns an error if the password cannot be hashed or if the login name
/// already exists.
pub fn create_user(
    conn: &mut SqliteConnection,
    login_name: &LoginName,
    display_name: &str,
    password: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    info!(
        login_name = login_name.value(),
        display_name,
        role = role.as_str(),
        "Creating user"
    );

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(users::table)
        .values((
            users::login_name.eq(login_name.value()),
            users::display_name.eq(display_name),
            users::password_hash.eq(&password_hash),
            users::role.eq(role.as_str()),
            users::created_at.eq(stamp(now)?),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "User created");
    Ok(user_id)
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    debug!(user_id, "Updating last_login_at");

    diesel::update(users::table.find(user_id))
        .set(users::last_login_at.eq(Some(stamp(now)?)))
        .execute(conn)?;

    Ok(())
}

/// Disables a user and revokes all of their sessions.
///
/// # Errors
///
/// Returns `EntityNotFound` if the user does not exist, or an error if the
/// database update fails.
pub fn disable_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    info!(user_id, "Disabling user");
    let disabled_at: String = stamp(now)?;

    conn.immediate_transaction(|conn| {
        let rows_affected: usize = diesel::update(users::table.find(user_id))
            .set((
                users::is_disabled.eq(1),
                users::disabled_at.eq(Some(&disabled_at)),
            ))
            .execute(conn)?;
        if rows_affected == 0 {
            return Err(PersistenceError::EntityNotFound {
                entity: "user",
                id: user_id,
            });
        }

        let revoked: usize = diesel::delete(sessions::table)
            .filter(sessions::user_id.eq(user_id))
            .execute(conn)?;
        info!(user_id, revoked, "User disabled");
        Ok(())
    })
}

/// Creates a new session for a user.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    now: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let created_at: String = stamp(now)?;
    let expires_at: String = stamp(expires_at)?;
    debug!(user_id, expires_at, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(&created_at),
            sessions::last_activity_at.eq(&created_at),
            sessions::expires_at.eq(&expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, user_id, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table.find(session_id))
        .set(sessions::last_activity_at.eq(stamp(now)?))
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token. Used for logout.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(stamp(now)?))
        .execute(conn)?;

    info!(rows_affected, "Deleted expired sessions");
    Ok(rows_affected)
}
