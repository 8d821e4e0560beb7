// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use fleetbook_domain::DomainError;
use fleetbook_persistence::PersistenceError;
use thiserror::Error;
use tracing::error;

use crate::password_policy::PasswordPolicyError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. Each variant maps to exactly one HTTP status in the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No, invalid or expired identity.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor has the wrong role or does not own the resource.
    #[error("Unauthorized: '{action}' requires {required_role}")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with the current state.
    #[error("{message}")]
    Conflict {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Shorthand for an `InvalidInput` error.
    #[must_use]
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a `ResourceNotFound` error on a numeric ID.
    #[must_use]
    pub fn not_found(resource_type: &str, id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: format!("{resource_type} {id} does not exist"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::InvalidInput {
            field: String::from("password"),
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    let (field, conflict_rule): (&str, Option<&str>) = match &err {
        DomainError::InsufficientStock { .. } => ("quantity", Some("sufficient_stock")),
        DomainError::InvalidStatusTransition { .. } => ("status", Some("terminal_status")),
        DomainError::DuplicateReport { .. } => ("route", Some("single_report")),
        DomainError::InvalidName(_) => ("name", None),
        DomainError::InvalidLoginName(_) => ("loginName", None),
        DomainError::InvalidPlate(_) => ("plate", None),
        DomainError::InvalidRole(_) => ("role", None),
        DomainError::InvalidRouteStatus(_) => ("status", None),
        DomainError::InvalidMovementType(_) => ("type", None),
        DomainError::InvalidReviewDirection(_) => ("direction", None),
        DomainError::InvalidAvailabilityStatus(_) => ("status", None),
        DomainError::InvalidCarCheck(_) => ("carCheck", None),
        DomainError::InvalidCounter(_) => ("counter", None),
        DomainError::InvalidDateFact(_) => ("fact", None),
        DomainError::InvalidQuantity { .. } => ("quantity", None),
        DomainError::InvalidStockLevel { field, .. }
        | DomainError::NegativeAmount { field, .. } => (*field, None),
        DomainError::InvalidCounterLimit { .. } => ("limitKm", None),
        DomainError::InvalidInterval { .. } | DomainError::FixedInterval(_) => {
            ("intervalMonths", None)
        }
        DomainError::NotADriver { .. } => ("driverId", None),
        DomainError::NoteTooLong { .. } => ("note", None),
        DomainError::DateParseError { .. } | DomainError::DateArithmeticOverflow { .. } => {
            ("date", None)
        }
        DomainError::InvalidTimezone(_) => ("timezone", None),
    };

    match conflict_rule {
        Some(rule) => ApiError::Conflict {
            rule: rule.to_string(),
            message,
        },
        None => ApiError::InvalidInput {
            field: field.to_string(),
            message,
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures are logged here and surface as a generic internal error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::RuleViolation(domain_err) => translate_domain_error(domain_err),
        PersistenceError::EntityNotFound { entity, id } => ApiError::not_found(entity, id),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("record"),
            message,
        },
        PersistenceError::UniqueViolation(message) => ApiError::Conflict {
            rule: String::from("unique"),
            message: format!("Duplicate value: {message}"),
        },
        other => {
            error!(error = %other, "Storage failure");
            ApiError::Internal {
                message: String::from("Storage failure"),
            }
        }
    }
}
