// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route lifecycle accounting.
//!
//! A route credits its distance to the assigned vehicle exactly once: when
//! its status changes to completed from anything else. Completion can come
//! from a dispatcher status change, a driver's daily report, or the
//! auto-complete sweep over past-dated routes.

use crate::error::DomainError;
use crate::types::RouteStatus;
use chrono::NaiveDate;

/// Outcome of validating a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the change.
    pub from: RouteStatus,
    /// Status after the change.
    pub to: RouteStatus,
    /// Whether this change completes the route and must credit distance.
    pub completes: bool,
}

impl StatusChange {
    /// Returns whether the status actually changes.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Validates moving a route from `from` to `to`.
///
/// # Errors
///
/// Returns an error if the route is completed and `to` is anything else.
pub const fn plan_status_change(
    from: RouteStatus,
    to: RouteStatus,
) -> Result<StatusChange, DomainError> {
    if !from.can_transition_to(to) {
        return Err(DomainError::InvalidStatusTransition { from, to });
    }
    Ok(StatusChange {
        from,
        to,
        completes: to.is_completed() && !from.is_completed(),
    })
}

/// Kilometers to credit when a route completes.
///
/// The actual distance wins when positive, then the planned distance, and
/// otherwise nothing is credited.
#[must_use]
pub fn km_to_credit(actual_km: Option<i64>, planned_km: Option<i64>) -> i64 {
    actual_km
        .filter(|km| *km > 0)
        .or_else(|| planned_km.filter(|km| *km > 0))
        .unwrap_or(0)
}

/// Returns whether a route should be closed by the auto-complete sweep.
#[must_use]
pub fn is_sweep_candidate(
    route_date: NaiveDate,
    status: RouteStatus,
    has_vehicle: bool,
    today: NaiveDate,
) -> bool {
    route_date < today && !status.is_completed() && has_vehicle
}

/// Validates an optional distance or money amount.
///
/// # Errors
///
/// Returns an error if the amount is negative.
pub const fn validate_amount(field: &'static str, value: Option<i64>) -> Result<(), DomainError> {
    match value {
        Some(v) if v < 0 => Err(DomainError::NegativeAmount { field, value: v }),
        _ => Ok(()),
    }
}
