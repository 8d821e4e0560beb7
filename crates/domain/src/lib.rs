// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod availability;
mod coercion;
mod dates;
mod error;
mod inventory;
mod maintenance;
mod rating;
mod route_lifecycle;
mod types;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityChange, normalize_day};
pub use coercion::{format_money_cents, parse_count, parse_km, parse_money_cents};
pub use dates::{
    add_months, format_day, format_timestamp, local_day_of, parse_day, parse_timestamp,
    parse_timezone, sub_months, utc_day_of,
};
pub use error::DomainError;
pub use inventory::{
    OPENING_BALANCE_NOTE, apply_movement, is_low_stock, ledger_balance, validate_stock_levels,
};
pub use maintenance::{
    CounterKind, DEFAULT_ADBLUE_LIMIT_KM, DEFAULT_BEARINGS_LIMIT_KM, DEFAULT_BRAKE_FLUID_MONTHS,
    DEFAULT_BRAKES_LIMIT_KM, DEFAULT_COOLANT_MONTHS, DEFAULT_GREEN_CARD_MONTHS,
    DEFAULT_OIL_LIMIT_KM, DateFact, DateFactStatus, DateSchedule, DueStatus, MaintenanceState,
    ResetTarget, TECHNICAL_INSPECTION_MONTHS, UsageCounter, evaluate_date_fact,
};
pub use rating::{DriverRating, MAX_REVIEW_NOTE_CHARS, normalize_review_note};
pub use route_lifecycle::{
    StatusChange, is_sweep_candidate, km_to_credit, plan_status_change, validate_amount,
};
pub use types::{
    AvailabilityStatus, CarCheck, LoginName, MovementType, Plate, ReviewDirection, Role,
    RouteStatus, normalize_note, require_name,
};
