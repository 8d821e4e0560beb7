// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicle mutations.
//!
//! Maintenance changes load the stored state, apply the change through
//! `MaintenanceState` and write every maintenance column back in the same
//! transaction.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{
    CounterKind, DateFact, DomainError, MaintenanceState, Plate, ResetTarget, UsageCounter,
    format_day, validate_amount,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{DistanceCredit, VehicleData};
use crate::diesel_schema::vehicles;
use crate::error::PersistenceError;
use crate::mutations::stamp;
use crate::queries::vehicles::require_vehicle;

/// Every maintenance column of a vehicle row.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = vehicles)]
#[diesel(treat_none_as_null = true)]
struct MaintenanceColumns {
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
}

/// Insertable vehicle row.
#[derive(Insertable)]
#[diesel(table_name = vehicles)]
struct NewVehicleRow<'a> {
    plate: &'a str,
    name: &'a str,
    note: Option<&'a str>,
    created_at: String,
    #[diesel(embed)]
    maintenance: MaintenanceColumns,
}

fn counter_row(counter: &UsageCounter) -> Result<(i64, i64, Option<String>), PersistenceError> {
    Ok((
        counter.km(),
        counter.limit_km(),
        counter.last_reset_at().map(stamp).transpose()?,
    ))
}

fn months_column(months: u32) -> Result<i32, PersistenceError> {
    i32::try_from(months)
        .map_err(|_| PersistenceError::Other(format!("Interval of {months} months is too large")))
}

impl MaintenanceColumns {
    fn from_state(state: &MaintenanceState) -> Result<Self, PersistenceError> {
        let (oil_km, oil_limit_km, oil_last_reset_at) = counter_row(&state.oil)?;
        let (adblue_km, adblue_limit_km, adblue_last_reset_at) = counter_row(&state.adblue)?;
        let (brakes_km, brakes_limit_km, brakes_last_reset_at) = counter_row(&state.brakes)?;
        let (bearings_km, bearings_limit_km, bearings_last_reset_at) =
            counter_row(&state.bearings)?;

        Ok(Self {
            oil_km,
            oil_limit_km,
            oil_last_reset_at,
            adblue_km,
            adblue_limit_km,
            adblue_last_reset_at,
            brakes_km,
            brakes_limit_km,
            brakes_last_reset_at,
            bearings_km,
            bearings_limit_km,
            bearings_last_reset_at,
            technical_inspection_expiry: state.technical_inspection_expiry.map(format_day),
            brake_fluid_changed_on: state.brake_fluid.date().map(format_day),
            brake_fluid_interval_months: months_column(state.brake_fluid.interval_months())?,
            green_card_expiry: state.green_card.date().map(format_day),
            green_card_interval_months: months_column(state.green_card.interval_months())?,
            coolant_changed_on: state.coolant.date().map(format_day),
            coolant_interval_months: months_column(state.coolant.interval_months())?,
        })
    }
}

/// Creates a vehicle with the given initial maintenance state.
///
/// # Errors
///
/// Returns `UniqueViolation` if the plate is already registered.
pub fn create_vehicle(
    conn: &mut SqliteConnection,
    plate: &Plate,
    name: &str,
    note: Option<&str>,
    maintenance: &MaintenanceState,
    now: OffsetDateTime,
) -> Result<VehicleData, PersistenceError> {
    info!(plate = plate.value(), name, "Creating vehicle");

    let row: NewVehicleRow<'_> = NewVehicleRow {
        plate: plate.value(),
        name,
        note,
        created_at: stamp(now)?,
        maintenance: MaintenanceColumns::from_state(maintenance)?,
    };

    conn.immediate_transaction(|conn| {
        diesel::insert_into(vehicles::table)
            .values(&row)
            .execute(conn)?;
        let vehicle_id: i64 = conn.get_last_insert_rowid()?;
        info!(vehicle_id, "Vehicle created");
        require_vehicle(conn, vehicle_id)
    })
}

/// Changes a vehicle's plate, name and note.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist, or
/// `UniqueViolation` if the plate belongs to another vehicle.
pub fn update_vehicle_identity(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    plate: &Plate,
    name: &str,
    note: Option<&str>,
) -> Result<VehicleData, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let rows_affected: usize = diesel::update(vehicles::table.find(vehicle_id))
            .set((
                vehicles::plate.eq(plate.value()),
                vehicles::name.eq(name),
                vehicles::note.eq(note),
            ))
            .execute(conn)?;
        if rows_affected == 0 {
            return Err(PersistenceError::EntityNotFound {
                entity: "vehicle",
                id: vehicle_id,
            });
        }
        require_vehicle(conn, vehicle_id)
    })
}

/// Deletes a vehicle and its repair log.
///
/// Routes and movements that referenced the vehicle keep their history with
/// the reference cleared.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist.
pub fn delete_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
) -> Result<(), PersistenceError> {
    info!(vehicle_id, "Deleting vehicle");

    let rows_affected: usize = diesel::delete(vehicles::table.find(vehicle_id)).execute(conn)?;
    if rows_affected == 0 {
        return Err(PersistenceError::EntityNotFound {
            entity: "vehicle",
            id: vehicle_id,
        });
    }
    Ok(())
}

/// Loads a vehicle's maintenance state, applies `change` and stores the
/// result. Must run inside a transaction.
pub(crate) fn apply_maintenance_change<F>(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    change: F,
) -> Result<VehicleData, PersistenceError>
where
    F: FnOnce(&mut MaintenanceState) -> Result<(), DomainError>,
{
    let vehicle: VehicleData = require_vehicle(conn, vehicle_id)?;
    let mut maintenance: MaintenanceState = vehicle.maintenance;
    change(&mut maintenance)?;

    diesel::update(vehicles::table.find(vehicle_id))
        .set(&MaintenanceColumns::from_state(&maintenance)?)
        .execute(conn)?;

    Ok(VehicleData {
        maintenance,
        ..vehicle
    })
}

/// Credits `km` to every counter of a vehicle. Must run inside a
/// transaction.
///
/// Returns `None` when there is nothing to credit.
pub(crate) fn credit_in_transaction(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    km: i64,
) -> Result<Option<DistanceCredit>, PersistenceError> {
    if km <= 0 {
        debug!(vehicle_id, km, "Nothing to credit");
        return Ok(None);
    }
    apply_maintenance_change(conn, vehicle_id, |state| {
        state.credit_distance(km);
        Ok(())
    })?;
    info!(vehicle_id, km, "Credited distance to vehicle");
    Ok(Some(DistanceCredit { vehicle_id, km }))
}

/// Credits a manually entered distance to a vehicle. Zero is a no-op.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist, or
/// `RuleViolation` if `km` is negative.
pub fn credit_vehicle_km(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    km: i64,
) -> Result<VehicleData, PersistenceError> {
    validate_amount("km", Some(km))?;
    conn.immediate_transaction(|conn| {
        credit_in_transaction(conn, vehicle_id, km)?;
        require_vehicle(conn, vehicle_id)
    })
}

/// Resets a counter, or records a brake fluid change, at `now`.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist.
pub fn reset_vehicle_counter(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    target: ResetTarget,
    now: OffsetDateTime,
) -> Result<VehicleData, PersistenceError> {
    info!(vehicle_id, ?target, "Resetting maintenance counter");
    conn.immediate_transaction(|conn| {
        apply_maintenance_change(conn, vehicle_id, |state| state.reset(target, now))
    })
}

/// Overwrites the stored date of a date-based fact.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist.
pub fn set_vehicle_date(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    fact: DateFact,
    date: Option<NaiveDate>,
) -> Result<VehicleData, PersistenceError> {
    debug!(vehicle_id, fact = fact.as_str(), ?date, "Setting maintenance date");
    conn.immediate_transaction(|conn| {
        apply_maintenance_change(conn, vehicle_id, |state| {
            state.set_date(fact, date);
            Ok(())
        })
    })
}

/// Changes counter limits and date intervals of a vehicle in one step.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist, or
/// `RuleViolation` if any limit or interval is rejected. Nothing is stored
/// in that case.
pub fn configure_vehicle(
    conn: &mut SqliteConnection,
    vehicle_id: i64,
    limits: &[(CounterKind, i64)],
    intervals: &[(DateFact, i64)],
) -> Result<VehicleData, PersistenceError> {
    conn.immediate_transaction(|conn| {
        apply_maintenance_change(conn, vehicle_id, |state| {
            for (kind, limit_km) in limits {
                state.set_limit(*kind, *limit_km)?;
            }
            for (fact, months) in intervals {
                state.set_interval(*fact, *months)?;
            }
            Ok(())
        })
    })
}
