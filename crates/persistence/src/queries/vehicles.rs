// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle and repair queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{DateSchedule, MaintenanceState, UsageCounter};
use tracing::debug;

use crate::data_models::{RepairData, VehicleData};
use crate::diesel_schema::{repairs, vehicles};
use crate::error::PersistenceError;
use crate::queries::{parse_stored_day, parse_stored_opt_day, parse_stored_opt_timestamp};

/// Diesel Queryable struct for vehicle rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = vehicles)]
struct VehicleRow {
    vehicle_id: i64,
    plate: String,
    name: String,
    note: Option<String>,
    oil_km: i64,
    oil_limit_km: i64,
    oil_last_reset_at: Option<String>,
    adblue_km: i64,
    adblue_limit_km: i64,
    adblue_last_reset_at: Option<String>,
    brakes_km: i64,
    brakes_limit_km: i64,
    brakes_last_reset_at: Option<String>,
    bearings_km: i64,
    bearings_limit_km: i64,
    bearings_last_reset_at: Option<String>,
    technical_inspection_expiry: Option<String>,
    brake_fluid_changed_on: Option<String>,
    brake_fluid_interval_months: i32,
    green_card_expiry: Option<String>,
    green_card_interval_months: i32,
    coolant_changed_on: Option<String>,
    coolant_interval_months: i32,
    created_at: String,
}

fn interval(column: &str, months: i32) -> Result<u32, PersistenceError> {
    u32::try_from(months)
        .map_err(|_| PersistenceError::ReconstructionError(format!("{column}: {months}")))
}

impl TryFrom<VehicleRow> for VehicleData {
    type Error = PersistenceError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let maintenance: MaintenanceState = MaintenanceState {
            oil: UsageCounter::with_state(
                row.oil_km,
                row.oil_limit_km,
                parse_stored_opt_timestamp("oil_last_reset_at", row.oil_last_reset_at.as_deref())?,
            ),
            adblue: UsageCounter::with_state(
                row.adblue_km,
                row.adblue_limit_km,
                parse_stored_opt_timestamp(
                    "adblue_last_reset_at",
                    row.adblue_last_reset_at.as_deref(),
                )?,
            ),
            brakes: UsageCounter::with_state(
                row.brakes_km,
                row.brakes_limit_km,
                parse_stored_opt_timestamp(
                    "brakes_last_reset_at",
                    row.brakes_last_reset_at.as_deref(),
                )?,
            ),
            bearings: UsageCounter::with_state(
                row.bearings_km,
                row.bearings_limit_km,
                parse_stored_opt_timestamp(
                    "bearings_last_reset_at",
                    row.bearings_last_reset_at.as_deref(),
                )?,
            ),
            technical_inspection_expiry: parse_stored_opt_day(
                "technical_inspection_expiry",
                row.technical_inspection_expiry.as_deref(),
            )?,
            brake_fluid: DateSchedule::new(
                parse_stored_opt_day(
                    "brake_fluid_changed_on",
                    row.brake_fluid_changed_on.as_deref(),
                )?,
                interval(
                    "brake_fluid_interval_months",
                    row.brake_fluid_interval_months,
                )?,
            ),
            green_card: DateSchedule::new(
                parse_stored_opt_day("green_card_expiry", row.green_card_expiry.as_deref())?,
                interval("green_card_interval_months", row.green_card_interval_months)?,
            ),
            coolant: DateSchedule::new(
                parse_stored_opt_day("coolant_changed_on", row.coolant_changed_on.as_deref())?,
                interval("coolant_interval_months", row.coolant_interval_months)?,
            ),
        };

        Ok(Self {
            vehicle_id: row.vehicle_id,
            plate: row.plate,
            name: row.name,
            note: row.note,
            maintenance,
            created_at: row.created_at,
        })
    }
}

/// Retrieves a vehicle by ID.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if the vehicle is not found.
pub fn get_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<Option<VehicleData>, PersistenceError> {
    debug!(vehicle_id, "Looking up vehicle");

    vehicles::table
        .find(vehicle_id)
        .select(VehicleRow::as_select())
        .first(conn)
        .optional()?
        .map(VehicleData::try_from)
        .transpose()
}

/// Retrieves a vehicle that must exist.
///
/// # Errors
///
/// Returns `EntityNotFound` if there is no such vehicle.
pub fn require_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<VehicleData, PersistenceError> {
    get_vehicle(conn, vehicle_id)?.ok_or(PersistenceError::EntityNotFound {
        entity: "vehicle",
        id: vehicle_id,
    })
}

/// Returns whether a vehicle exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn vehicle_exists(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(vehicles::table.find(vehicle_id))).get_result(conn)?)
}

/// Lists all vehicles ordered by plate.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_vehicles(conn: &mut SqliteConnection) -> Result<Vec<VehicleData>, PersistenceError> {
    vehicles::table
        .select(VehicleRow::as_select())
        .order_by(vehicles::plate.asc())
        .load::<VehicleRow>(conn)?
        .into_iter()
        .map(VehicleData::try_from)
        .collect()
}

/// Diesel Queryable struct for repair rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = repairs)]
struct RepairRow {
    repair_id: i64,
    vehicle_id: i64,
    repair_date: String,
    description: String,
    cost_cents: Option<i64>,
    odometer_km: Option<i64>,
    note: Option<String>,
    created_by: Option<i64>,
    created_at: String,
}

impl TryFrom<RepairRow> for RepairData {
    type Error = PersistenceError;

    fn try_from(row: RepairRow) -> Result<Self, Self::Error> {
        Ok(Self {
            repair_id: row.repair_id,
            vehicle_id: row.vehicle_id,
            repair_date: parse_stored_day("repairs.repair_date", &row.repair_date)?,
            description: row.description,
            cost_cents: row.cost_cents,
            odometer_km: row.odometer_km,
            note: row.note,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Lists a vehicle's repairs, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_repairs(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<Vec<RepairData>, PersistenceError> {
    repairs::table
        .filter(repairs::vehicle_id.eq(vehicle_id))
        .select(RepairRow::as_select())
        .order_by((repairs::repair_date.desc(), repairs::repair_id.desc()))
        .load::<RepairRow>(conn)?
        .into_iter()
        .map(RepairData::try_from)
        .collect()
}

/// Retrieves a repair by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the repair is not found.
pub fn get_repair(
    conn: &mut SqliteConnection,
    repair_id: i64,
) -> Result<Option<RepairData>, PersistenceError> {
    repairs::table
        .find(repair_id)
        .select(RepairRow::as_select())
        .first(conn)
        .optional()?
        .map(RepairData::try_from)
        .transpose()
}
