// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! JSON field names are camelCase. Numeric request fields accept either a
//! JSON number or a numeric string; anything unparseable is read as absent.

use fleetbook_domain::{
    AvailabilityStatus, CarCheck, CounterKind, DateFact, DateFactStatus, DueStatus, MovementType,
    ReviewDirection, Role, RouteStatus, UsageCounter, format_day, format_money_cents,
    format_timestamp,
};
use fleetbook_persistence::{
    AvailabilityData, DailyReportData, MovementData, OrderData, RepairData, ReviewData, RouteData,
    SparePartData, UserData, VehicleData,
};
use serde::{Deserialize, Serialize};

/// Lenient numeric deserializers for request fields.
pub mod lenient {
    use fleetbook_domain::{parse_count, parse_km, parse_money_cents};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    impl NumberOrText {
        fn into_text(self) -> String {
            match self {
                Self::Integer(value) => value.to_string(),
                Self::Float(value) => value.to_string(),
                Self::Text(value) => value,
            }
        }
    }

    fn parse_with<'de, D>(
        deserializer: D,
        parse: fn(&str) -> Option<i64>,
    ) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|value| parse(&value.into_text())))
    }

    /// Whole kilometers; decimals are rounded.
    ///
    /// # Errors
    ///
    /// Fails only on values that are neither numbers, strings nor null.
    pub fn km<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        parse_with(deserializer, parse_km)
    }

    /// A price in currency units, read as integer cents.
    ///
    /// # Errors
    ///
    /// Fails only on values that are neither numbers, strings nor null.
    pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        parse_with(deserializer, parse_money_cents)
    }

    /// A whole count or ID.
    ///
    /// # Errors
    ///
    /// Fails only on values that are neither numbers, strings nor null.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        parse_with(deserializer, parse_count)
    }
}

fn stamp_opt(instant: Option<time::OffsetDateTime>) -> Option<String> {
    instant.and_then(|value| format_timestamp(value).ok())
}

// ============================================================================
// Auth & users
// ============================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// The login name (case-insensitive).
    pub login_name: String,
    /// The password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    /// When the session expires (RFC 3339).
    pub expires_at: String,
    /// The logged-in user.
    pub user: UserInfo,
}

/// A user as exposed by the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: Role,
    pub is_disabled: bool,
    pub rating_up: i64,
    pub rating_down: i64,
    pub score: i64,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl From<&UserData> for UserInfo {
    fn from(user: &UserData) -> Self {
        Self {
            user_id: user.user_id,
            login_name: user.login_name.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            is_disabled: user.is_disabled,
            rating_up: user.rating.up,
            rating_down: user.rating.down,
            score: user.rating.score(),
            created_at: user.created_at.clone(),
            last_login_at: user.last_login_at.clone(),
        }
    }
}

/// API request to create a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub login_name: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
    /// `ADMIN`, `DISPATCHER` or `DRIVER`.
    pub role: String,
}

/// Query for listing users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// Restrict to one role.
    pub role: Option<String>,
}

/// API response for listing users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

// ============================================================================
// Vehicles & repairs
// ============================================================================

/// API request to create or edit a vehicle's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    pub plate: String,
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// A vehicle summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub vehicle_id: i64,
    pub plate: String,
    pub name: String,
    pub note: Option<String>,
    pub created_at: String,
    /// Whether any counter is due or any date fact is due soon or expired.
    pub needs_attention: bool,
}

/// API response for listing vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVehiclesResponse {
    pub vehicles: Vec<VehicleInfo>,
}

/// Read-side view of a wear counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterView {
    pub counter: CounterKind,
    pub km: i64,
    pub limit_km: i64,
    pub remaining_km: i64,
    pub percent_used: f64,
    pub is_due: bool,
    pub last_reset_at: Option<String>,
}

impl CounterView {
    /// Builds the view of one counter.
    #[must_use]
    pub fn new(counter: CounterKind, usage: &UsageCounter) -> Self {
        Self {
            counter,
            km: usage.km(),
            limit_km: usage.limit_km(),
            remaining_km: usage.remaining_km(),
            percent_used: usage.percent_used(),
            is_due: usage.is_due(),
            last_reset_at: stamp_opt(usage.last_reset_at()),
        }
    }
}

/// Read-side view of a date-based maintenance fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFactView {
    pub fact: DateFact,
    pub date: Option<String>,
    pub interval_months: u32,
    pub next_due: Option<String>,
    pub days_remaining: Option<i64>,
    pub percent_elapsed: f64,
    pub status: DueStatus,
}

impl DateFactView {
    /// Builds the view of one evaluated fact.
    #[must_use]
    pub fn new(status: &DateFactStatus, interval_months: u32) -> Self {
        Self {
            fact: status.fact,
            date: status.date.map(format_day),
            interval_months,
            next_due: status.next_due.map(format_day),
            days_remaining: status.days_remaining,
            percent_elapsed: status.percent_elapsed,
            status: status.status,
        }
    }
}

/// API response describing a vehicle's maintenance state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceResponse {
    pub vehicle_id: i64,
    pub plate: String,
    pub name: String,
    pub counters: Vec<CounterView>,
    pub dates: Vec<DateFactView>,
}

/// API request to credit kilometers manually.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddKmRequest {
    #[serde(default, deserialize_with = "lenient::km")]
    pub km: Option<i64>,
}

/// API request to reset a counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCounterRequest {
    /// `oil`, `adblue`, `brakes`, `bearings` or `brakeFluid`.
    pub counter: String,
}

/// API request to set or clear a maintenance date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDateRequest {
    /// `technicalInspection`, `brakeFluid`, `greenCard` or `coolant`.
    pub fact: String,
    /// `YYYY-MM-DD` or RFC 3339. Null or empty clears the date.
    #[serde(default)]
    pub date: Option<String>,
}

/// API request to configure counter limits and intervals.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLimitsRequest {
    #[serde(default, deserialize_with = "lenient::km")]
    pub oil_limit_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::km")]
    pub adblue_limit_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::km")]
    pub brakes_limit_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::km")]
    pub bearings_limit_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub brake_fluid_interval_months: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub green_card_interval_months: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub coolant_interval_months: Option<i64>,
}

/// API request to log a repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRequest {
    pub repair_date: String,
    pub description: String,
    #[serde(default, deserialize_with = "lenient::money")]
    pub cost: Option<i64>,
    #[serde(default, deserialize_with = "lenient::km")]
    pub odometer_km: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A repair log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairInfo {
    pub repair_id: i64,
    pub vehicle_id: i64,
    pub repair_date: String,
    pub description: String,
    /// Cost with two decimals, e.g. `"1250.00"`.
    pub cost: Option<String>,
    pub odometer_km: Option<i64>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
}

impl From<&RepairData> for RepairInfo {
    fn from(repair: &RepairData) -> Self {
        Self {
            repair_id: repair.repair_id,
            vehicle_id: repair.vehicle_id,
            repair_date: format_day(repair.repair_date),
            description: repair.description.clone(),
            cost: repair.cost_cents.map(format_money_cents),
            odometer_km: repair.odometer_km,
            note: repair.note.clone(),
            created_by: repair.created_by,
            created_at: repair.created_at.clone(),
        }
    }
}

/// API response for listing a vehicle's repairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRepairsResponse {
    pub vehicle_id: i64,
    pub repairs: Vec<RepairInfo>,
}

// ============================================================================
// Routes, orders & reports
// ============================================================================

/// An order in a route edit. With an `orderId` it updates that order,
/// without one it is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default, deserialize_with = "lenient::count")]
    pub order_id: Option<i64>,
    pub customer: String,
    pub address: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// API request to create or replace a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub name: String,
    pub route_date: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub driver_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub vehicle_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::km")]
    pub planned_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::km")]
    pub actual_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub fuel_cost: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    /// Leaves the status unchanged when absent. New routes default to `PLANNED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Leaves the orders unchanged when absent.
    #[serde(default)]
    pub orders: Option<Vec<OrderRequest>>,
}

/// Query for listing routes. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub driver_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub status: Option<String>,
}

/// API request to change a route's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// A delivery stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_id: i64,
    pub position: i32,
    pub customer: String,
    pub address: String,
    pub note: Option<String>,
}

impl From<&OrderData> for OrderInfo {
    fn from(order: &OrderData) -> Self {
        Self {
            order_id: order.order_id,
            position: order.position,
            customer: order.customer.clone(),
            address: order.address.clone(),
            note: order.note.clone(),
        }
    }
}

/// A route with its orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub route_id: i64,
    pub name: String,
    pub route_date: String,
    pub driver_id: Option<i64>,
    pub vehicle_id: Option<i64>,
    pub planned_km: Option<i64>,
    pub actual_km: Option<i64>,
    pub fuel_cost: Option<String>,
    pub status: RouteStatus,
    pub note: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub orders: Vec<OrderInfo>,
    /// Only filled in on single-route reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<DailyReportInfo>,
}

impl From<&RouteData> for RouteInfo {
    fn from(route: &RouteData) -> Self {
        Self {
            route_id: route.route_id,
            name: route.name.clone(),
            route_date: format_day(route.route_date),
            driver_id: route.driver_id,
            vehicle_id: route.vehicle_id,
            planned_km: route.planned_km,
            actual_km: route.actual_km,
            fuel_cost: route.fuel_cost_cents.map(format_money_cents),
            status: route.status,
            note: route.note.clone(),
            completed_at: route.completed_at.clone(),
            created_at: route.created_at.clone(),
            orders: route.orders.iter().map(OrderInfo::from).collect(),
            report: None,
        }
    }
}

/// API response for listing routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRoutesResponse {
    pub routes: Vec<RouteInfo>,
}

/// API response for a route edit or status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteChangeResponse {
    pub route: RouteInfo,
    /// Whether this change completed the route.
    pub completed: bool,
    /// Kilometers credited to the vehicle by this change.
    pub credited_km: Option<i64>,
}

/// API request to file a daily report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportRequest {
    #[serde(default, deserialize_with = "lenient::km")]
    pub actual_km: Option<i64>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub fuel_cost: Option<i64>,
    /// `OK` or `NOK`.
    #[serde(default)]
    pub car_check: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A filed daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportInfo {
    pub report_id: i64,
    pub route_id: i64,
    pub driver_id: Option<i64>,
    pub actual_km: Option<i64>,
    pub fuel_cost: Option<String>,
    pub car_check: CarCheck,
    pub note: Option<String>,
    pub created_at: String,
}

impl From<&DailyReportData> for DailyReportInfo {
    fn from(report: &DailyReportData) -> Self {
        Self {
            report_id: report.report_id,
            route_id: report.route_id,
            driver_id: report.driver_id,
            actual_km: report.actual_km,
            fuel_cost: report.fuel_cost_cents.map(format_money_cents),
            car_check: report.car_check,
            note: report.note.clone(),
            created_at: report.created_at.clone(),
        }
    }
}

/// API response for a filed daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report: DailyReportInfo,
    pub route: RouteInfo,
    pub credited_km: Option<i64>,
}

/// A route closed by the auto-complete sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweptRoute {
    pub route_id: i64,
    pub vehicle_id: Option<i64>,
    pub credited_km: i64,
}

/// A route the sweep failed to close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailure {
    pub route_id: i64,
    pub message: String,
}

/// Outcome of one auto-complete sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    /// The fleet-local day routes were compared against.
    pub today: String,
    pub candidates: usize,
    pub completed: Vec<SweptRoute>,
    /// Candidates that no longer qualified when re-read.
    pub skipped: usize,
    pub failures: Vec<SweepFailure>,
}

// ============================================================================
// Spare parts
// ============================================================================

/// API request to create a spare part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePartRequest {
    pub name: String,
    pub unit: String,
    /// Opening balance. Absent means zero.
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// API request to edit a spare part. Quantity only changes through
/// movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSparePartRequest {
    pub name: String,
    pub unit: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A spare part with its stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePartInfo {
    pub part_id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub is_low_stock: bool,
    pub note: Option<String>,
    pub created_at: String,
}

impl From<&SparePartData> for SparePartInfo {
    fn from(part: &SparePartData) -> Self {
        Self {
            part_id: part.part_id,
            name: part.name.clone(),
            unit: part.unit.clone(),
            quantity: part.quantity,
            min_stock: part.min_stock,
            is_low_stock: part.is_low_stock(),
            note: part.note.clone(),
            created_at: part.created_at.clone(),
        }
    }
}

/// API response for listing spare parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSparePartsResponse {
    pub parts: Vec<SparePartInfo>,
    pub low_stock_count: usize,
}

/// A stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInfo {
    pub movement_id: i64,
    pub part_id: i64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i64,
    pub vehicle_id: Option<i64>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
}

impl From<&MovementData> for MovementInfo {
    fn from(movement: &MovementData) -> Self {
        Self {
            movement_id: movement.movement_id,
            part_id: movement.part_id,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            vehicle_id: movement.vehicle_id,
            note: movement.note.clone(),
            created_by: movement.created_by,
            created_at: movement.created_at.clone(),
        }
    }
}

/// API response for a part with its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePartDetailResponse {
    pub part: SparePartInfo,
    /// Oldest first.
    pub movements: Vec<MovementInfo>,
    /// Sum of IN minus sum of OUT. Always equals `part.quantity`.
    pub ledger_balance: i64,
}

/// API request to record a stock movement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    /// `IN` or `OUT`.
    #[serde(rename = "type", default)]
    pub movement_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub vehicle_id: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// API response for a recorded movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementResponse {
    pub movement: MovementInfo,
    pub part: SparePartInfo,
}

// ============================================================================
// Ratings
// ============================================================================

/// API request to review a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// `up` or `down`.
    pub direction: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// A driver review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInfo {
    pub review_id: i64,
    pub driver_id: i64,
    pub direction: ReviewDirection,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
}

impl From<&ReviewData> for ReviewInfo {
    fn from(review: &ReviewData) -> Self {
        Self {
            review_id: review.review_id,
            driver_id: review.driver_id,
            direction: review.direction,
            note: review.note.clone(),
            created_by: review.created_by,
            created_at: review.created_at.clone(),
        }
    }
}

/// API response for a driver's rating ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverReviewsResponse {
    pub driver_id: i64,
    pub rating_up: i64,
    pub rating_down: i64,
    pub score: i64,
    /// Newest first.
    pub reviews: Vec<ReviewInfo>,
}

/// API response for a new review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review: ReviewInfo,
    pub rating_up: i64,
    pub rating_down: i64,
    pub score: i64,
}

/// API response for a ratings reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRatingsResponse {
    pub driver_id: i64,
    pub removed_reviews: usize,
}

// ============================================================================
// Availability
// ============================================================================

/// Query for listing availability. Both bounds are required and inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub user_id: Option<i64>,
}

/// A user's availability on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityInfo {
    pub user_id: i64,
    pub day: String,
    pub status: AvailabilityStatus,
    pub note: Option<String>,
    pub updated_at: String,
}

impl From<&AvailabilityData> for AvailabilityInfo {
    fn from(entry: &AvailabilityData) -> Self {
        Self {
            user_id: entry.user_id,
            day: format_day(entry.day),
            status: entry.status,
            note: entry.note.clone(),
            updated_at: entry.updated_at.clone(),
        }
    }
}

/// API response for listing availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAvailabilityResponse {
    pub entries: Vec<AvailabilityInfo>,
}

/// API request to set or clear availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityRequest {
    /// Defaults to the caller.
    #[serde(default, deserialize_with = "lenient::count")]
    pub user_id: Option<i64>,
    /// `YYYY-MM-DD` or RFC 3339, normalized to the UTC day.
    pub day: String,
    /// Null or empty clears the record.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// API response for an availability change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvailabilityResponse {
    pub user_id: i64,
    pub day: String,
    /// Absent when the record was cleared.
    pub entry: Option<AvailabilityInfo>,
}
