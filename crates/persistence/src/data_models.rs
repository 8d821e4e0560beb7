// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Records returned by queries and accepted by mutations.
//!
//! Stored strings are parsed back into domain values at the query boundary,
//! so callers only see typed data.

use chrono::NaiveDate;
use fleetbook_domain::{
    AvailabilityStatus, CarCheck, DriverRating, MaintenanceState, MovementType, ReviewDirection,
    Role, RouteStatus,
};
use time::OffsetDateTime;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub is_disabled: bool,
    pub rating: DriverRating,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// A login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A vehicle with its maintenance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleData {
    pub vehicle_id: i64,
    pub plate: String,
    pub name: String,
    pub note: Option<String>,
    pub maintenance: MaintenanceState,
    pub created_at: String,
}

/// A repair log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairData {
    pub repair_id: i64,
    pub vehicle_id: i64,
    pub repair_date: NaiveDate,
    pub description: String,
    pub cost_cents: Option<i64>,
    pub odometer_km: Option<i64>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
}

/// Fields of a new repair entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepair {
    pub vehicle_id: i64,
    pub repair_date: NaiveDate,
    pub description: String,
    pub cost_cents: Option<i64>,
    pub odometer_km: Option<i64>,
    pub note: Option<String>,
}

/// A delivery stop on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderData {
    pub order_id: i64,
    pub route_id: i64,
    pub position: i32,
    pub customer: String,
    pub address: String,
    pub note: Option<String>,
}

/// An order as submitted with a route edit.
///
/// Entries carrying an `order_id` update that order; entries without one
/// are inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInput {
    pub order_id: Option<i64>,
    pub customer: String,
    pub address: String,
    pub note: Option<String>,
}

/// A route with its orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteData {
    pub route_id: i64,
    pub name: String,
    pub route_date: NaiveDate,
    pub driver_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub planned_km: Option<i64>,
    pub actual_km: Option<i64>,
    pub fuel_cost_cents: Option<i64>,
    pub status: RouteStatus,
    pub note: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub orders: Vec<OrderData>,
}

/// Editable fields of a route.
///
/// Every field holds the new value. `status` and `orders` are left
/// untouched when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDraft {
    pub name: String,
    pub route_date: NaiveDate,
    pub driver_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub planned_km: Option<i64>,
    pub actual_km: Option<i64>,
    pub fuel_cost_cents: Option<i64>,
    pub note: Option<String>,
    pub status: Option<RouteStatus>,
    pub orders: Option<Vec<OrderInput>>,
}

/// Filter for listing routes. Bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub driver_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub status: Option<RouteStatus>,
}

/// Distance credited to a vehicle by a route completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceCredit {
    pub vehicle_id: i64,
    pub km: i64,
}

/// Result of a route edit or status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeOutcome {
    pub route: RouteData,
    /// Whether this change completed the route.
    pub completed: bool,
    /// Set when the completion credited a vehicle.
    pub credit: Option<DistanceCredit>,
}

/// A driver's post-trip report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReportData {
    pub report_id: i64,
    pub route_id: i64,
    pub driver_id: Option<i64>,
    pub actual_km: Option<i64>,
    pub fuel_cost_cents: Option<i64>,
    pub car_check: CarCheck,
    pub note: Option<String>,
    pub created_at: String,
}

/// Fields of a new daily report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDailyReport {
    pub route_id: i64,
    pub driver_id: i64,
    pub actual_km: Option<i64>,
    pub fuel_cost_cents: Option<i64>,
    pub car_check: CarCheck,
    pub note: Option<String>,
}

/// Result of filing a daily report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub report: DailyReportData,
    pub route: RouteData,
    pub credit: Option<DistanceCredit>,
}

/// Result of auto-completing a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStep {
    /// The route was completed. Carries the credit, if any.
    Completed(Option<DistanceCredit>),
    /// The route no longer qualified when re-read.
    Skipped,
}

/// A spare part with its running quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparePartData {
    pub part_id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub note: Option<String>,
    pub created_at: String,
}

impl SparePartData {
    /// Returns whether the part is at or below its reorder threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        fleetbook_domain::is_low_stock(self.quantity, self.min_stock)
    }
}

/// Fields of a new spare part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSparePart {
    pub name: String,
    pub unit: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub note: Option<String>,
}

/// Editable fields of a spare part. Quantity only changes through
/// movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparePartEdit {
    pub name: String,
    pub unit: String,
    pub min_stock: i64,
    pub note: Option<String>,
}

/// A stock movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementData {
    pub movement_id: i64,
    pub part_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub vehicle_id: Option<i64>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
}

/// Fields of a new stock movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub part_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub vehicle_id: Option<i64>,
    pub note: Option<String>,
}

/// Result of recording a movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementOutcome {
    pub movement: MovementData,
    pub part: SparePartData,
}

/// A review of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewData {
    pub review_id: i64,
    pub driver_id: i64,
    pub direction: ReviewDirection,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
}

/// Result of reviewing a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub review: ReviewData,
    /// The driver's counters after the review.
    pub rating: DriverRating,
}

/// A user's availability for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityData {
    pub availability_id: i64,
    pub user_id: i64,
    pub day: NaiveDate,
    pub status: AvailabilityStatus,
    pub note: Option<String>,
    pub updated_at: String,
}

/// Who performed a change and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeContext {
    pub actor_id: Option<i64>,
    pub now: OffsetDateTime,
}

impl ChangeContext {
    /// Creates a context for a change made by `actor_id` at `now`.
    #[must_use]
    pub const fn new(actor_id: Option<i64>, now: OffsetDateTime) -> Self {
        Self { actor_id, now }
    }
}
