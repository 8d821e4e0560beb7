// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use fleetbook_domain::{Role, parse_timestamp};
use fleetbook_persistence::{PersistenceError, RouteData, SessionData, SqlitePersistence, UserData};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// The principal behind a request.
///
/// Every operation in this crate takes the principal explicitly; nothing is
/// read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's canonical identifier.
    pub id: i64,
    /// The user's normalized login name.
    pub login_name: String,
    /// The user's role.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: i64, login_name: String, role: Role) -> Self {
        Self {
            id,
            login_name,
            role,
        }
    }

    /// Builds the actor for a stored user.
    #[must_use]
    pub fn from_user(user: &UserData) -> Self {
        Self::new(user.user_id, user.login_name.clone(), user.role)
    }

    /// Whether the actor may act as a dispatcher. Admins may.
    #[must_use]
    pub const fn is_dispatcher(&self) -> bool {
        self.role.is_dispatcher()
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the Admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Dispatcher | Role::Driver => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("ADMIN role"),
            }),
        }
    }

    /// Requires the Dispatcher or Admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a Driver.
    pub fn require_dispatcher(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_dispatcher() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("DISPATCHER role"),
            })
        }
    }

    /// Requires a dispatcher or the driver assigned to the route.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a Driver not assigned to the route.
    pub fn require_route_access(
        actor: &AuthenticatedActor,
        route: &RouteData,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_dispatcher() || route.driver_id == Some(actor.id) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("DISPATCHER role or the assigned driver"),
            })
        }
    }

    /// Requires a dispatcher or the user themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if a Driver acts on another user.
    pub fn require_self_or_dispatcher(
        actor: &AuthenticatedActor,
        user_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_dispatcher() || actor.id == user_id {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("DISPATCHER role or the user themselves"),
            })
        }
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Verifies credentials and creates a session.
    ///
    /// Unknown login names and wrong passwords produce the same error.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `user_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the user is disabled,
    /// or the session cannot be stored.
    pub fn login(
        persistence: &mut SqlitePersistence,
        login_name: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(String, AuthenticatedActor, UserData), AuthError> {
        let user: UserData = persistence
            .get_user_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                debug!(login_name, "Login for unknown user");
                Self::invalid_credentials()
            })?;

        let password_ok: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_ok {
            warn!(user_id = user.user_id, "Rejected login: wrong password");
            return Err(Self::invalid_credentials());
        }

        if user.is_disabled {
            warn!(user_id = user.user_id, "Rejected login: user is disabled");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("User is disabled"),
            });
        }

        let session_token: String = Self::generate_session_token(now);
        persistence
            .create_session(
                &session_token,
                user.user_id,
                now,
                now + Self::DEFAULT_SESSION_EXPIRATION,
            )
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id, now)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, role = %user.role, "User logged in");
        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user);
        Ok((session_token, actor, user))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or its user is
    /// missing or disabled.
    pub fn validate_session(
        persistence: &mut SqlitePersistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(AuthenticatedActor, UserData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })?;
        if now > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;
        if user.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("User is disabled"),
            });
        }

        persistence
            .update_session_activity(session.session_id, now)
            .map_err(Self::map_persistence_error)?;

        Ok((AuthenticatedActor::from_user(&user), user))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    fn generate_session_token(now: OffsetDateTime) -> String {
        format!(
            "session_{}_{}",
            now.unix_timestamp_nanos(),
            rand::random::<u64>()
        )
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        }
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn actor(id: i64, role: Role) -> AuthenticatedActor {
        AuthenticatedActor::new(id, format!("USER{id}"), role)
    }

    fn route_for(driver_id: Option<i64>) -> RouteData {
        RouteData {
            route_id: 1,
            name: String::from("North loop"),
            route_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            driver_id,
            vehicle_id: None,
            planned_km: None,
            actual_km: None,
            fuel_cost_cents: None,
            status: fleetbook_domain::RouteStatus::Planned,
            note: None,
            completed_at: None,
            created_at: String::from("2026-03-10T08:00:00Z"),
            orders: Vec::new(),
        }
    }

    #[test]
    fn test_only_admin_passes_require_admin() {
        assert!(AuthorizationService::require_admin(&actor(1, Role::Admin), "x").is_ok());
        assert!(AuthorizationService::require_admin(&actor(2, Role::Dispatcher), "x").is_err());
        assert!(AuthorizationService::require_admin(&actor(3, Role::Driver), "x").is_err());
    }

    #[test]
    fn test_admin_counts_as_dispatcher() {
        assert!(AuthorizationService::require_dispatcher(&actor(1, Role::Admin), "x").is_ok());
        assert!(
            AuthorizationService::require_dispatcher(&actor(2, Role::Dispatcher), "x").is_ok()
        );
        let err: AuthError =
            AuthorizationService::require_dispatcher(&actor(3, Role::Driver), "create_route")
                .unwrap_err();
        assert_eq!(
            err,
            AuthError::Unauthorized {
                action: String::from("create_route"),
                required_role: String::from("DISPATCHER role"),
            }
        );
    }

    #[test]
    fn test_route_access_for_assigned_driver_only() {
        let route: RouteData = route_for(Some(3));
        let assigned: AuthenticatedActor = actor(3, Role::Driver);
        let other: AuthenticatedActor = actor(4, Role::Driver);
        let dispatcher: AuthenticatedActor = actor(2, Role::Dispatcher);

        assert!(AuthorizationService::require_route_access(&assigned, &route, "x").is_ok());
        assert!(AuthorizationService::require_route_access(&other, &route, "x").is_err());
        assert!(AuthorizationService::require_route_access(&dispatcher, &route, "x").is_ok());

        let unassigned: RouteData = route_for(None);
        assert!(AuthorizationService::require_route_access(&assigned, &unassigned, "x").is_err());
    }

    #[test]
    fn test_self_or_dispatcher() {
        let driver: AuthenticatedActor = actor(3, Role::Driver);
        let dispatcher: AuthenticatedActor = actor(2, Role::Dispatcher);

        assert!(AuthorizationService::require_self_or_dispatcher(&driver, 3, "x").is_ok());
        assert!(AuthorizationService::require_self_or_dispatcher(&driver, 4, "x").is_err());
        assert!(AuthorizationService::require_self_or_dispatcher(&dispatcher, 4, "x").is_ok());
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let now: OffsetDateTime = time::macros::datetime!(2026-03-10 08:00:00 UTC);
        let a: String = AuthenticationService::generate_session_token(now);
        let b: String = AuthenticationService::generate_session_token(now);
        assert!(a.starts_with("session_"));
        assert_ne!(a, b);
    }
}
