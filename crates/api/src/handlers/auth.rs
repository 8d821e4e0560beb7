// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Login, logout and whoami.

use fleetbook_persistence::{SessionData, SqlitePersistence, UserData};
use time::OffsetDateTime;

use crate::auth::{AuthenticatedActor, AuthenticationService};
use crate::error::ApiError;
use crate::request_response::{LoginRequest, LoginResponse, UserInfo};

/// Authenticates a user and opens a session.
///
/// # Errors
///
/// Returns an error if:
/// - The login name or password is wrong
/// - The user is disabled
/// - Database operations fail
pub fn login(
    persistence: &mut SqlitePersistence,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let (session_token, _actor, user): (String, AuthenticatedActor, UserData) =
        AuthenticationService::login(persistence, &request.login_name, &request.password, now)?;

    let session: Option<SessionData> = persistence.get_session_by_token(&session_token)?;
    let expires_at: String = session
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session not found after creation"),
        })?
        .expires_at;

    Ok(LoginResponse {
        session_token,
        expires_at,
        user: UserInfo::from(&user),
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut SqlitePersistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the caller's own account.
#[must_use]
pub fn whoami(_actor: &AuthenticatedActor, user: &UserData) -> UserInfo {
    UserInfo::from(user)
}
