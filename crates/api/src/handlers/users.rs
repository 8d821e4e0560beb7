// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User management.
//!
//! Admins create users of any role. Dispatchers may only create drivers.

use fleetbook_domain::{LoginName, Role, require_name};
use fleetbook_persistence::{PersistenceError, SqlitePersistence, UserData};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};
use crate::handlers::parse_optional_value;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{CreateUserRequest, ListUsersQuery, ListUsersResponse, UserInfo};

fn load_user(persistence: &mut SqlitePersistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)?
        .ok_or_else(|| ApiError::not_found("user", user_id))
}

fn insert_user(
    persistence: &mut SqlitePersistence,
    login_name: &LoginName,
    display_name: &str,
    password: &str,
    role: Role,
    now: OffsetDateTime,
) -> Result<UserData, ApiError> {
    let user_id: i64 = persistence
        .create_user(login_name, display_name, password, role, now)
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => ApiError::Conflict {
                rule: String::from("unique_login_name"),
                message: format!("Login name '{}' is already taken", login_name.value()),
            },
            other => translate_persistence_error(other),
        })?;
    load_user(persistence, user_id)
}

/// Lists users, optionally restricted to one role.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the role filter is invalid,
/// or the query fails.
pub fn list_users(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: &ListUsersQuery,
) -> Result<ListUsersResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "list_users")?;
    let role: Option<Role> = parse_optional_value(query.role.as_deref())?;

    let users: Vec<UserData> = persistence.list_users(role)?;
    Ok(ListUsersResponse {
        users: users.iter().map(UserInfo::from).collect(),
    })
}

/// Creates a user.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not create users of the requested role
/// - The login name, display name or role is invalid
/// - The password violates the password policy
/// - The login name is already taken
pub fn create_user(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &CreateUserRequest,
    now: OffsetDateTime,
) -> Result<UserInfo, ApiError> {
    let role: Role = crate::handlers::parse_value(&request.role)?;
    match actor.role {
        Role::Admin => {}
        Role::Dispatcher if role == Role::Driver => {}
        Role::Dispatcher => {
            return Err(ApiError::Unauthorized {
                action: String::from("create_user"),
                required_role: format!("ADMIN role to create {role} users"),
            });
        }
        Role::Driver => {
            AuthorizationService::require_dispatcher(actor, "create_user")?;
        }
    }

    let login_name: LoginName = LoginName::parse(&request.login_name)?;
    let display_name: String = require_name("Display name", &request.display_name)?;
    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        login_name.value(),
    )?;

    let user: UserData = insert_user(
        persistence,
        &login_name,
        &display_name,
        &request.password,
        role,
        now,
    )?;
    debug!(
        user_id = user.user_id,
        role = %role,
        created_by = actor.id,
        "User created"
    );
    Ok(UserInfo::from(&user))
}

/// Disables a user and revokes their sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, targets their own
/// account, or the user does not exist.
pub fn disable_user(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "disable_user")?;
    if actor.id == user_id {
        return Err(ApiError::Conflict {
            rule: String::from("no_self_disable"),
            message: String::from("You cannot disable your own account"),
        });
    }

    persistence.disable_user(user_id, now)?;
    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserInfo::from(&user))
}

/// Creates the first Admin when the user table is empty.
///
/// Returns `None` when users already exist.
///
/// # Errors
///
/// Returns an error if the login name or password is rejected, or the
/// database fails.
pub fn bootstrap_admin(
    persistence: &mut SqlitePersistence,
    login_name: &str,
    password: &str,
    now: OffsetDateTime,
) -> Result<Option<UserInfo>, ApiError> {
    if persistence.count_users()? > 0 {
        return Ok(None);
    }

    let login_name: LoginName = LoginName::parse(login_name)?;
    PasswordPolicy::default().validate(password, password, login_name.value())?;

    let user: UserData = insert_user(
        persistence,
        &login_name,
        "Administrator",
        password,
        Role::Admin,
        now,
    )?;
    info!(user_id = user.user_id, login_name = %user.login_name, "Bootstrap admin created");
    Ok(Some(UserInfo::from(&user)))
}
