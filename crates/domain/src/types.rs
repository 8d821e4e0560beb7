// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role of a fleet user.
///
/// Admins can do everything a dispatcher can. Drivers may only act on
/// their own routes and availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full control, including user management.
    Admin,
    /// Plans routes, manages vehicles and stock, rates drivers.
    Dispatcher,
    /// Drives routes and files daily reports.
    Driver,
}

impl Role {
    /// Converts this role to its stored string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Dispatcher => "DISPATCHER",
            Self::Driver => "DRIVER",
        }
    }

    /// Returns whether this role carries dispatcher privileges.
    #[must_use]
    pub const fn is_dispatcher(self) -> bool {
        matches!(self, Self::Admin | Self::Dispatcher)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "DISPATCHER" => Ok(Self::Dispatcher),
            "DRIVER" => Ok(Self::Driver),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    /// Scheduled, not started.
    #[default]
    Planned,
    /// The driver is on the road.
    InProgress,
    /// Finished. Terminal.
    Completed,
}

impl RouteStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Planned and in-progress routes move freely between each other and
    /// to completed. Nothing leaves completed. Staying put is always valid.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        !matches!(
            (self, target),
            (Self::Completed, Self::Planned | Self::InProgress)
        )
    }

    /// Returns whether this is the terminal status.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl FromStr for RouteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(Self::Planned),
            "IN_PROGRESS" | "INPROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidRouteStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a spare-part stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Receipt into stock.
    In,
    /// Issue out of stock.
    Out,
}

impl MovementType {
    /// Converts this movement type to its stored string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// Returns the signed effect of `quantity` on the stock level.
    #[must_use]
    pub const fn signed(self, quantity: i64) -> i64 {
        match self {
            Self::In => quantity,
            Self::Out => -quantity,
        }
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            _ => Err(DomainError::InvalidMovementType(s.to_string())),
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thumbs up or down on a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDirection {
    /// Positive review.
    Up,
    /// Negative review.
    Down,
}

impl ReviewDirection {
    /// Converts this direction to its stored string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl FromStr for ReviewDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(DomainError::InvalidReviewDirection(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReviewDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A driver's declared availability for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    /// Available the whole day.
    Available,
    /// Available part of the day.
    Partial,
    /// Not available.
    Unavailable,
}

impl AvailabilityStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Partial => "PARTIAL",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(Self::Available),
            "PARTIAL" => Ok(Self::Partial),
            "UNAVAILABLE" => Ok(Self::Unavailable),
            _ => Err(DomainError::InvalidAvailabilityStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of the post-trip vehicle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarCheck {
    /// Vehicle returned in order.
    Ok,
    /// Vehicle has a defect.
    Nok,
}

impl CarCheck {
    /// Converts this outcome to its stored string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Nok => "NOK",
        }
    }
}

impl FromStr for CarCheck {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" => Ok(Self::Ok),
            "NOK" => Ok(Self::Nok),
            _ => Err(DomainError::InvalidCarCheck(s.to_string())),
        }
    }
}

impl std::fmt::Display for CarCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A login name, normalized to uppercase.
///
/// Login names are matched case-insensitively, so `jnovak` and `JNovak`
/// refer to the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoginName {
    value: String,
}

impl LoginName {
    /// Parses and normalizes a login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains whitespace.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed: &str = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidLoginName(String::from(
                "Login name cannot be empty",
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidLoginName(format!(
                "'{trimmed}' contains whitespace"
            )));
        }
        Ok(Self {
            value: trimmed.to_uppercase(),
        })
    }

    /// Returns the normalized value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A vehicle license plate, trimmed and uppercased with inner spaces removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plate {
    value: String,
}

impl Plate {
    /// Parses and normalizes a plate.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing remains after normalization.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        if value.is_empty() {
            return Err(DomainError::InvalidPlate(String::from(
                "Plate cannot be empty",
            )));
        }
        Ok(Self { value })
    }

    /// Returns the normalized value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Trims a required display name.
///
/// # Errors
///
/// Returns an error naming `what` if the trimmed name is empty.
pub fn require_name(what: &str, raw: &str) -> Result<String, DomainError> {
    let trimmed: &str = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(format!("{what} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional free-text note, mapping blank input to `None`.
#[must_use]
pub fn normalize_note(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
