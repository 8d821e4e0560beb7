// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for fleetbook.
//!
//! All state lives in a single `SQLite` database accessed through Diesel.
//! The `Persistence` adapter owns one connection; callers serialize access
//! to it (the server keeps it behind an async mutex).
//!
//! ## Layout
//!
//! - `queries/`: read-only lookups that map rows back into domain values
//! - `mutations/`: writes; anything that reads before it writes runs in an
//!   `IMMEDIATE` transaction
//! - `backend/`: connection setup, PRAGMAs and migrations
//!
//! ## Storage formats
//!
//! - Calendar days are stored as `YYYY-MM-DD` text
//! - Instants are stored as RFC 3339 UTC text with whole seconds, so string
//!   comparison matches chronological order
//! - Enumerations are stored by their canonical wire name
//!
//! ## Testing
//!
//! Tests use `Persistence::new_in_memory()`, which gives every call its own
//! isolated shared-cache database.

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
#![allow(clippy::multiple_crate_versions)]

use chrono::NaiveDate;
use diesel::SqliteConnection;
use fleetbook_domain::{
    AvailabilityChange, CounterKind, DateFact, LoginName, MaintenanceState, Plate, ResetTarget,
    ReviewDirection, Role, RouteStatus,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AvailabilityData, ChangeContext, DailyReportData, DistanceCredit, MovementData,
    MovementOutcome, NewDailyReport, NewMovement, NewRepair, NewSparePart, OrderData, OrderInput,
    RepairData, ReportOutcome, ReviewData, ReviewOutcome, RouteChangeOutcome, RouteData,
    RouteDraft, RouteFilter, SessionData, SparePartData, SparePartEdit, SweepStep, UserData,
    VehicleData,
};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type alias kept for call sites that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Users & Sessions
    // ========================================================================

    /// Creates a user with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the login name is taken.
    pub fn create_user(
        &mut self,
        login_name: &LoginName,
        display_name: &str,
        password: &str,
        role: Role,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_user(
            &mut self.conn,
            login_name,
            display_name,
            password,
            role,
            now,
        )
    }

    /// Retrieves a user by login name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_login(&mut self.conn, login_name)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Lists users ordered by login name, optionally restricted to one role.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self, role: Option<Role>) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_users(&mut self.conn, role)
    }

    /// Counts all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(
        &mut self,
        user_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_last_login(&mut self.conn, user_id, now)
    }

    /// Disables a user and deletes their sessions.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the user does not exist.
    pub fn disable_user(
        &mut self,
        user_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::disable_user(&mut self.conn, user_id, now)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    /// Creates a session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        now: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(&mut self.conn, session_token, user_id, now, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates a session's last activity timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(
        &mut self,
        session_id: i64,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_session_activity(&mut self.conn, session_id, now)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Vehicles & Repairs
    // ========================================================================

    /// Creates a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the plate is already registered.
    pub fn create_vehicle(
        &mut self,
        plate: &Plate,
        name: &str,
        note: Option<&str>,
        maintenance: &MaintenanceState,
        now: OffsetDateTime,
    ) -> Result<VehicleData, PersistenceError> {
        mutations::vehicles::create_vehicle(&mut self.conn, plate, name, note, maintenance, now)
    }

    /// Retrieves a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_vehicle(
        &mut self,
        vehicle_id: i64,
    ) -> Result<Option<VehicleData>, PersistenceError> {
        queries::vehicles::get_vehicle(&mut self.conn, vehicle_id)
    }

    /// Lists vehicles ordered by plate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_vehicles(&mut self) -> Result<Vec<VehicleData>, PersistenceError> {
        queries::vehicles::list_vehicles(&mut self.conn)
    }

    /// Changes a vehicle's plate, name and note.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `UniqueViolation`.
    pub fn update_vehicle_identity(
        &mut self,
        vehicle_id: i64,
        plate: &Plate,
        name: &str,
        note: Option<&str>,
    ) -> Result<VehicleData, PersistenceError> {
        mutations::vehicles::update_vehicle_identity(&mut self.conn, vehicle_id, plate, name, note)
    }

    /// Deletes a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the vehicle does not exist.
    pub fn delete_vehicle(&mut self, vehicle_id: i64) -> Result<(), PersistenceError> {
        mutations::vehicles::delete_vehicle(&mut self.conn, vehicle_id)
    }

    /// Credits a manual distance to every counter of a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound`, or `RuleViolation` for a negative distance.
    pub fn credit_vehicle_km(
        &mut self,
        vehicle_id: i64,
        km: i64,
    ) -> Result<VehicleData, PersistenceError> {
        mutations::vehicles::credit_vehicle_km(&mut self.conn, vehicle_id, km)
    }

    /// Resets a counter or records a brake fluid change.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the vehicle does not exist.
    pub fn reset_vehicle_counter(
        &mut self,
        vehicle_id: i64,
        target: ResetTarget,
        now: OffsetDateTime,
    ) -> Result<VehicleData, PersistenceError> {
        mutations::vehicles::reset_vehicle_counter(&mut self.conn, vehicle_id, target, now)
    }

    /// Overwrites the stored date of a date-based fact.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the vehicle does not exist.
    pub fn set_vehicle_date(
        &mut self,
        vehicle_id: i64,
        fact: DateFact,
        date: Option<NaiveDate>,
    ) -> Result<VehicleData, PersistenceError> {
        mutations::vehicles::set_vehicle_date(&mut self.conn, vehicle_id, fact, date)
    }

    /// Changes counter limits and date intervals.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound`, or `RuleViolation` if any value is rejected.
    pub fn configure_vehicle(
        &mut self,
        vehicle_id: i64,
        limits: &[(CounterKind, i64)],
        intervals: &[(DateFact, i64)],
    ) -> Result<VehicleData, PersistenceError> {
        mutations::vehicles::configure_vehicle(&mut self.conn, vehicle_id, limits, intervals)
    }

    /// Appends a repair to a vehicle's log.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn create_repair(
        &mut self,
        repair: &NewRepair,
        ctx: ChangeContext,
    ) -> Result<RepairData, PersistenceError> {
        mutations::repairs::create_repair(&mut self.conn, repair, ctx)
    }

    /// Lists a vehicle's repairs, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_repairs(&mut self, vehicle_id: i64) -> Result<Vec<RepairData>, PersistenceError> {
        queries::vehicles::list_repairs(&mut self.conn, vehicle_id)
    }

    /// Deletes a repair entry.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the repair does not exist.
    pub fn delete_repair(&mut self, repair_id: i64) -> Result<(), PersistenceError> {
        mutations::repairs::delete_repair(&mut self.conn, repair_id)
    }

    // ========================================================================
    // Routes, Reports & Sweep
    // ========================================================================

    /// Creates a route with its orders.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn create_route(
        &mut self,
        draft: &RouteDraft,
        ctx: ChangeContext,
    ) -> Result<RouteChangeOutcome, PersistenceError> {
        mutations::routes::create_route(&mut self.conn, draft, ctx)
    }

    /// Retrieves a route with its orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_route(&mut self, route_id: i64) -> Result<Option<RouteData>, PersistenceError> {
        queries::routes::get_route(&mut self.conn, route_id)
    }

    /// Lists routes matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_routes(
        &mut self,
        filter: &RouteFilter,
    ) -> Result<Vec<RouteData>, PersistenceError> {
        queries::routes::list_routes(&mut self.conn, filter)
    }

    /// Overwrites a route, optionally changing its status and orders.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn update_route(
        &mut self,
        route_id: i64,
        draft: &RouteDraft,
        ctx: ChangeContext,
    ) -> Result<RouteChangeOutcome, PersistenceError> {
        mutations::routes::update_route(&mut self.conn, route_id, draft, ctx)
    }

    /// Changes a route's status.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn set_route_status(
        &mut self,
        route_id: i64,
        status: RouteStatus,
        ctx: ChangeContext,
    ) -> Result<RouteChangeOutcome, PersistenceError> {
        mutations::routes::set_route_status(&mut self.conn, route_id, status, ctx)
    }

    /// Deletes a route with its orders and report.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the route does not exist.
    pub fn delete_route(&mut self, route_id: i64) -> Result<(), PersistenceError> {
        mutations::routes::delete_route(&mut self.conn, route_id)
    }

    /// Files a daily report and completes its route.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn submit_daily_report(
        &mut self,
        report: &NewDailyReport,
        ctx: ChangeContext,
    ) -> Result<ReportOutcome, PersistenceError> {
        mutations::routes::submit_daily_report(&mut self.conn, report, ctx)
    }

    /// Retrieves the daily report of a route.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_daily_report(
        &mut self,
        route_id: i64,
    ) -> Result<Option<DailyReportData>, PersistenceError> {
        queries::routes::get_daily_report(&mut self.conn, route_id)
    }

    /// Lists IDs of routes the sweep should close.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_sweep_candidates(
        &mut self,
        today: NaiveDate,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::routes::list_sweep_candidates(&mut self.conn, today)
    }

    /// Completes one sweep candidate in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn auto_complete_route(
        &mut self,
        route_id: i64,
        today: NaiveDate,
        now: OffsetDateTime,
    ) -> Result<SweepStep, PersistenceError> {
        mutations::routes::auto_complete_route(&mut self.conn, route_id, today, now)
    }

    // ========================================================================
    // Spare Parts
    // ========================================================================

    /// Creates a spare part.
    ///
    /// # Errors
    ///
    /// Returns `RuleViolation` for negative stock figures.
    pub fn create_spare_part(
        &mut self,
        part: &NewSparePart,
        ctx: ChangeContext,
    ) -> Result<SparePartData, PersistenceError> {
        mutations::inventory::create_spare_part(&mut self.conn, part, ctx)
    }

    /// Retrieves a spare part by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_spare_part(
        &mut self,
        part_id: i64,
    ) -> Result<Option<SparePartData>, PersistenceError> {
        queries::inventory::get_spare_part(&mut self.conn, part_id)
    }

    /// Lists spare parts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_spare_parts(&mut self) -> Result<Vec<SparePartData>, PersistenceError> {
        queries::inventory::list_spare_parts(&mut self.conn)
    }

    /// Edits a spare part's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn update_spare_part(
        &mut self,
        part_id: i64,
        edit: &SparePartEdit,
    ) -> Result<SparePartData, PersistenceError> {
        mutations::inventory::update_spare_part(&mut self.conn, part_id, edit)
    }

    /// Deletes a spare part and its history.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the part does not exist.
    pub fn delete_spare_part(&mut self, part_id: i64) -> Result<(), PersistenceError> {
        mutations::inventory::delete_spare_part(&mut self.conn, part_id)
    }

    /// Records a stock movement.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn record_movement(
        &mut self,
        movement: &NewMovement,
        ctx: ChangeContext,
    ) -> Result<MovementOutcome, PersistenceError> {
        mutations::inventory::record_movement(&mut self.conn, movement, ctx)
    }

    /// Lists a part's movements, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_movements(&mut self, part_id: i64) -> Result<Vec<MovementData>, PersistenceError> {
        queries::inventory::list_movements(&mut self.conn, part_id)
    }

    // ========================================================================
    // Ratings
    // ========================================================================

    /// Reviews a driver.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn add_review(
        &mut self,
        driver_id: i64,
        direction: ReviewDirection,
        note: Option<&str>,
        ctx: ChangeContext,
    ) -> Result<ReviewOutcome, PersistenceError> {
        mutations::ratings::add_review(&mut self.conn, driver_id, direction, note, ctx)
    }

    /// Lists a driver's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_reviews(&mut self, driver_id: i64) -> Result<Vec<ReviewData>, PersistenceError> {
        queries::ratings::list_reviews(&mut self.conn, driver_id)
    }

    /// Counts a driver's reviews in one direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_reviews(
        &mut self,
        driver_id: i64,
        direction: ReviewDirection,
    ) -> Result<i64, PersistenceError> {
        queries::ratings::count_reviews(&mut self.conn, driver_id, direction)
    }

    /// Deletes a driver's reviews and zeroes the counters.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `RuleViolation`.
    pub fn reset_ratings(&mut self, driver_id: i64) -> Result<usize, PersistenceError> {
        mutations::ratings::reset_ratings(&mut self.conn, driver_id)
    }

    // ========================================================================
    // Availability
    // ========================================================================

    /// Sets or clears a user's availability for one day.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the user does not exist.
    pub fn set_availability(
        &mut self,
        user_id: i64,
        day: NaiveDate,
        change: &AvailabilityChange,
        now: OffsetDateTime,
    ) -> Result<Option<AvailabilityData>, PersistenceError> {
        mutations::availability::set_availability(&mut self.conn, user_id, day, change, now)
    }

    /// Retrieves one availability record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_availability(
        &mut self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<Option<AvailabilityData>, PersistenceError> {
        queries::availability::get_availability(&mut self.conn, user_id, day)
    }

    /// Lists availability records in an inclusive day range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_availability(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<Vec<AvailabilityData>, PersistenceError> {
        queries::availability::list_availability(&mut self.conn, from, to, user_id)
    }
}
