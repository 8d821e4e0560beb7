// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application operations for fleetbook.
//!
//! This crate sits between the HTTP server and persistence. It owns
//! authentication, role checks, request parsing and error translation.
//! Operations are plain functions that take the persistence adapter and
//! the authenticated principal explicitly.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
pub mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use handlers::sweep::{SweepCaller, auto_complete_routes};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::*;
