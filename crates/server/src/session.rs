// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Protected handlers take a [`SessionUser`], which validates the bearer
//! token and yields the principal passed to every api operation.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use fleetbook_api::{AuthenticatedActor, AuthenticationService};
use fleetbook_persistence::UserData;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// Extractor for authenticated users.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionUser(actor, user): SessionUser,
/// ) -> Result<Json<Response>, HttpError> {
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if the Authorization header is missing or
/// malformed, or the session is unknown, expired or belongs to a disabled
/// user.
pub struct SessionUser(pub AuthenticatedActor, pub UserData);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (actor, user) = authenticate(state, &parts.headers).await?;
        Ok(Self(actor, user))
    }
}

/// Reads the bearer token from the Authorization header.
///
/// # Errors
///
/// Returns an error if the header is missing, not valid text, or not a
/// `Bearer` credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    let auth_header: &str = headers
        .get("Authorization")
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })
}

/// Validates the session named by the request headers.
///
/// # Errors
///
/// Returns an error if there is no usable bearer token or the session is
/// not valid now.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(AuthenticatedActor, UserData), SessionError> {
    let token: &str = bearer_token(headers)?;

    let mut persistence = state.persistence.lock().await;
    let (actor, user) =
        AuthenticationService::validate_session(&mut persistence, token, OffsetDateTime::now_utc())
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
    drop(persistence);

    debug!(
        login_name = %user.login_name,
        role = %actor.role,
        "Session validated"
    );
    Ok((actor, user))
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let message: String = match err {
            SessionError::MissingAuthorizationHeader => {
                String::from("Missing Authorization header")
            }
            SessionError::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            SessionError::InvalidSession(reason) => reason,
        };
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}
