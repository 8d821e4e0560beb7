// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::RouteStatus;

/// Errors raised when fleet bookkeeping rules are violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required name (route, part, vehicle, user) is empty.
    InvalidName(String),
    /// Login name is empty or contains whitespace.
    InvalidLoginName(String),
    /// License plate is empty after normalization.
    InvalidPlate(String),
    /// Role string is not recognized.
    InvalidRole(String),
    /// Route status string is not recognized.
    InvalidRouteStatus(String),
    /// Movement type string is not recognized.
    InvalidMovementType(String),
    /// Review direction string is not recognized.
    InvalidReviewDirection(String),
    /// Availability status string is not recognized.
    InvalidAvailabilityStatus(String),
    /// Car check outcome string is not recognized.
    InvalidCarCheck(String),
    /// Usage counter or reset target name is not recognized.
    InvalidCounter(String),
    /// Date-based maintenance fact name is not recognized.
    InvalidDateFact(String),
    /// Movement quantity must be a positive integer.
    InvalidQuantity {
        /// The rejected quantity.
        quantity: i64,
    },
    /// A stock figure (initial quantity, minimum stock) is negative.
    InvalidStockLevel {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
    /// An issue would drive the part below zero.
    InsufficientStock {
        /// Quantity currently on hand.
        available: i64,
        /// Unit label of the part.
        unit: String,
    },
    /// A distance or money amount is negative.
    NegativeAmount {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
    /// A usage counter limit must be positive.
    InvalidCounterLimit {
        /// The rejected limit.
        limit_km: i64,
    },
    /// A maintenance interval must be positive.
    InvalidInterval {
        /// The rejected interval.
        months: i64,
    },
    /// The technical inspection validity window is fixed.
    FixedInterval(&'static str),
    /// The route cannot move from one status to another.
    InvalidStatusTransition {
        /// Current status.
        from: RouteStatus,
        /// Requested status.
        to: RouteStatus,
    },
    /// A daily report already exists for the route.
    DuplicateReport {
        /// The route that already has a report.
        route_id: i64,
    },
    /// Reviews can only target drivers.
    NotADriver {
        /// The user that was targeted.
        user_id: i64,
    },
    /// A review note exceeds the allowed length.
    NoteTooLong {
        /// Actual length in characters.
        length: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// Failed to parse a date or timestamp.
    DateParseError {
        /// The invalid input.
        date_string: String,
        /// The parser message.
        error: String,
    },
    /// Date arithmetic left the representable range.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Timezone name is not in the tz database.
    InvalidTimezone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidLoginName(msg) => write!(f, "Invalid login name: {msg}"),
            Self::InvalidPlate(msg) => write!(f, "Invalid license plate: {msg}"),
            Self::InvalidRole(value) => write!(f, "Invalid role: {value}"),
            Self::InvalidRouteStatus(value) => write!(f, "Invalid route status: {value}"),
            Self::InvalidMovementType(value) => write!(f, "Invalid movement type: {value}"),
            Self::InvalidReviewDirection(value) => {
                write!(f, "Invalid review direction: {value}")
            }
            Self::InvalidAvailabilityStatus(value) => {
                write!(f, "Invalid availability status: {value}")
            }
            Self::InvalidCarCheck(value) => write!(f, "Invalid car check outcome: {value}"),
            Self::InvalidCounter(value) => write!(f, "Unknown maintenance counter: {value}"),
            Self::InvalidDateFact(value) => write!(f, "Unknown maintenance date: {value}"),
            Self::InvalidQuantity { quantity } => {
                write!(f, "Quantity must be a positive integer, got {quantity}")
            }
            Self::InvalidStockLevel { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::InsufficientStock { available, unit } => {
                write!(f, "Insufficient stock, available: {available} {unit}")
            }
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::InvalidCounterLimit { limit_km } => {
                write!(f, "Counter limit must be positive, got {limit_km} km")
            }
            Self::InvalidInterval { months } => {
                write!(f, "Interval must be positive, got {months} months")
            }
            Self::FixedInterval(fact) => write!(f, "The {fact} interval cannot be changed"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Route cannot move from {from} to {to}")
            }
            Self::DuplicateReport { route_id } => {
                write!(f, "A daily report already exists for route {route_id}")
            }
            Self::NotADriver { user_id } => write!(f, "User {user_id} is not a driver"),
            Self::NoteTooLong { length, max } => {
                write!(f, "Note is {length} characters long, maximum is {max}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Unknown timezone: {tz}"),
        }
    }
}

impl std::error::Error for DomainError {}
