// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vehicles, maintenance counters and the repair log.
//!
//! Any authenticated user may read vehicles and their maintenance state.
//! Changes require a dispatcher.

use chrono::NaiveDate;
use fleetbook_domain::{
    CounterKind, DateFact, DateFactStatus, DueStatus, MaintenanceState, Plate, ResetTarget,
    normalize_note, require_name,
};
use fleetbook_persistence::{
    ChangeContext, NewRepair, PersistenceError, RepairData, SqlitePersistence, VehicleData,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};
use crate::handlers::{parse_optional_day, parse_value, require_day};
use crate::request_response::{
    AddKmRequest, CounterView, DateFactView, ListRepairsResponse, ListVehiclesResponse,
    MaintenanceResponse, RepairInfo, RepairRequest, ResetCounterRequest, SetDateRequest,
    SetLimitsRequest, VehicleInfo, VehicleRequest,
};

fn load_vehicle(
    persistence: &mut SqlitePersistence,
    vehicle_id: i64,
) -> Result<VehicleData, ApiError> {
    persistence
        .get_vehicle(vehicle_id)?
        .ok_or_else(|| ApiError::not_found("vehicle", vehicle_id))
}

fn plate_conflict(plate: &Plate) -> impl FnOnce(PersistenceError) -> ApiError + '_ {
    move |err| match err {
        PersistenceError::UniqueViolation(_) => ApiError::Conflict {
            rule: String::from("unique_plate"),
            message: format!("Vehicle with plate {} already exists", plate.value()),
        },
        other => translate_persistence_error(other),
    }
}

fn needs_attention(maintenance: &MaintenanceState, today: NaiveDate) -> Result<bool, ApiError> {
    let counter_due: bool = CounterKind::ALL
        .iter()
        .any(|kind| maintenance.counter(*kind).is_due());
    let statuses: Vec<DateFactStatus> = maintenance.date_statuses(today)?;
    let date_due: bool = statuses
        .iter()
        .any(|status| matches!(status.status, DueStatus::Soon | DueStatus::Expired));
    Ok(counter_due || date_due)
}

fn vehicle_info(vehicle: &VehicleData, today: NaiveDate) -> Result<VehicleInfo, ApiError> {
    Ok(VehicleInfo {
        vehicle_id: vehicle.vehicle_id,
        plate: vehicle.plate.clone(),
        name: vehicle.name.clone(),
        note: vehicle.note.clone(),
        created_at: vehicle.created_at.clone(),
        needs_attention: needs_attention(&vehicle.maintenance, today)?,
    })
}

fn maintenance_response(
    vehicle: &VehicleData,
    today: NaiveDate,
) -> Result<MaintenanceResponse, ApiError> {
    let maintenance: &MaintenanceState = &vehicle.maintenance;
    let counters: Vec<CounterView> = CounterKind::ALL
        .iter()
        .map(|kind| CounterView::new(*kind, maintenance.counter(*kind)))
        .collect();
    let dates: Vec<DateFactView> = maintenance
        .date_statuses(today)?
        .iter()
        .map(|status| {
            DateFactView::new(status, maintenance.schedule(status.fact).interval_months())
        })
        .collect();

    Ok(MaintenanceResponse {
        vehicle_id: vehicle.vehicle_id,
        plate: vehicle.plate.clone(),
        name: vehicle.name.clone(),
        counters,
        dates,
    })
}

/// Lists all vehicles ordered by plate.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vehicles(
    persistence: &mut SqlitePersistence,
    _actor: &AuthenticatedActor,
    today: NaiveDate,
) -> Result<ListVehiclesResponse, ApiError> {
    let vehicles: Vec<VehicleData> = persistence.list_vehicles()?;
    let vehicles: Vec<VehicleInfo> = vehicles
        .iter()
        .map(|vehicle| vehicle_info(vehicle, today))
        .collect::<Result<_, _>>()?;
    Ok(ListVehiclesResponse { vehicles })
}

/// Returns one vehicle.
///
/// # Errors
///
/// Returns an error if the vehicle does not exist.
pub fn get_vehicle(
    persistence: &mut SqlitePersistence,
    _actor: &AuthenticatedActor,
    vehicle_id: i64,
    today: NaiveDate,
) -> Result<VehicleInfo, ApiError> {
    let vehicle: VehicleData = load_vehicle(persistence, vehicle_id)?;
    vehicle_info(&vehicle, today)
}

/// Registers a vehicle with default maintenance limits and intervals.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the plate or name is
/// invalid, or the plate is already registered.
pub fn create_vehicle(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &VehicleRequest,
    now: OffsetDateTime,
    today: NaiveDate,
) -> Result<VehicleInfo, ApiError> {
    AuthorizationService::require_dispatcher(actor, "create_vehicle")?;
    let plate: Plate = Plate::parse(&request.plate)?;
    let name: String = require_name("Vehicle name", &request.name)?;
    let note: Option<String> = normalize_note(request.note.as_deref());

    let vehicle: VehicleData = persistence
        .create_vehicle(
            &plate,
            &name,
            note.as_deref(),
            &MaintenanceState::default(),
            now,
        )
        .map_err(plate_conflict(&plate))?;
    debug!(
        vehicle_id = vehicle.vehicle_id,
        plate = %vehicle.plate,
        created_by = actor.id,
        "Vehicle registered"
    );
    vehicle_info(&vehicle, today)
}

/// Changes a vehicle's plate, name and note.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the input is invalid, the
/// vehicle does not exist, or the new plate belongs to another vehicle.
pub fn update_vehicle(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: &VehicleRequest,
    today: NaiveDate,
) -> Result<VehicleInfo, ApiError> {
    AuthorizationService::require_dispatcher(actor, "update_vehicle")?;
    let plate: Plate = Plate::parse(&request.plate)?;
    let name: String = require_name("Vehicle name", &request.name)?;
    let note: Option<String> = normalize_note(request.note.as_deref());

    let vehicle: VehicleData = persistence
        .update_vehicle_identity(vehicle_id, &plate, &name, note.as_deref())
        .map_err(plate_conflict(&plate))?;
    vehicle_info(&vehicle, today)
}

/// Deletes a vehicle with its repair log.
///
/// Routes and movements that referenced it keep their history with the
/// vehicle reference cleared.
///
/// # Errors
///
/// Returns an error if the actor is a Driver or the vehicle does not exist.
pub fn delete_vehicle(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::require_dispatcher(actor, "delete_vehicle")?;
    persistence.delete_vehicle(vehicle_id)?;
    debug!(vehicle_id, deleted_by = actor.id, "Vehicle deleted");
    Ok(())
}

/// Returns the vehicle's counters and date facts evaluated against `today`.
///
/// # Errors
///
/// Returns an error if the vehicle does not exist.
pub fn get_maintenance(
    persistence: &mut SqlitePersistence,
    _actor: &AuthenticatedActor,
    vehicle_id: i64,
    today: NaiveDate,
) -> Result<MaintenanceResponse, ApiError> {
    let vehicle: VehicleData = load_vehicle(persistence, vehicle_id)?;
    maintenance_response(&vehicle, today)
}

/// Credits kilometers to all four wear counters.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, `km` is missing or negative,
/// or the vehicle does not exist.
pub fn add_km(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: &AddKmRequest,
    today: NaiveDate,
) -> Result<MaintenanceResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "add_km")?;
    let km: i64 = request
        .km
        .ok_or_else(|| ApiError::invalid("km", "Kilometers must be a number"))?;

    let vehicle: VehicleData = persistence.credit_vehicle_km(vehicle_id, km)?;
    debug!(vehicle_id, km, "Kilometers credited manually");
    maintenance_response(&vehicle, today)
}

/// Resets one counter to zero, or records a brake-fluid change.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the counter name is unknown,
/// or the vehicle does not exist.
pub fn reset_counter(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: &ResetCounterRequest,
    now: OffsetDateTime,
    today: NaiveDate,
) -> Result<MaintenanceResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "reset_counter")?;
    let target: ResetTarget = parse_value(&request.counter)?;

    let vehicle: VehicleData = persistence.reset_vehicle_counter(vehicle_id, target, now)?;
    debug!(vehicle_id, counter = %request.counter.trim(), reset_by = actor.id, "Counter reset");
    maintenance_response(&vehicle, today)
}

/// Sets or clears a maintenance date.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the fact or date is invalid,
/// or the vehicle does not exist.
pub fn set_maintenance_date(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: &SetDateRequest,
    today: NaiveDate,
) -> Result<MaintenanceResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "set_maintenance_date")?;
    let fact: DateFact = parse_value(&request.fact)?;
    let date: Option<NaiveDate> = parse_optional_day("date", request.date.as_deref())?;

    let vehicle: VehicleData = persistence.set_vehicle_date(vehicle_id, fact, date)?;
    maintenance_response(&vehicle, today)
}

/// Changes counter limits and date intervals. Absent fields are unchanged.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, nothing was supplied, a value
/// is out of range, or the vehicle does not exist.
pub fn set_limits(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: &SetLimitsRequest,
    today: NaiveDate,
) -> Result<MaintenanceResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "set_limits")?;

    let limits: Vec<(CounterKind, i64)> = [
        (CounterKind::Oil, request.oil_limit_km),
        (CounterKind::AdBlue, request.adblue_limit_km),
        (CounterKind::Brakes, request.brakes_limit_km),
        (CounterKind::Bearings, request.bearings_limit_km),
    ]
    .into_iter()
    .filter_map(|(kind, value)| value.map(|limit| (kind, limit)))
    .collect();
    let intervals: Vec<(DateFact, i64)> = [
        (DateFact::BrakeFluid, request.brake_fluid_interval_months),
        (DateFact::GreenCard, request.green_card_interval_months),
        (DateFact::Coolant, request.coolant_interval_months),
    ]
    .into_iter()
    .filter_map(|(fact, value)| value.map(|months| (fact, months)))
    .collect();

    if limits.is_empty() && intervals.is_empty() {
        return Err(ApiError::invalid(
            "limits",
            "Provide at least one limit or interval",
        ));
    }

    let vehicle: VehicleData = persistence.configure_vehicle(vehicle_id, &limits, &intervals)?;
    maintenance_response(&vehicle, today)
}

// ============================================================================
// Repairs
// ============================================================================

/// Lists a vehicle's repairs, newest first.
///
/// # Errors
///
/// Returns an error if the vehicle does not exist.
pub fn list_repairs(
    persistence: &mut SqlitePersistence,
    _actor: &AuthenticatedActor,
    vehicle_id: i64,
) -> Result<ListRepairsResponse, ApiError> {
    load_vehicle(persistence, vehicle_id)?;
    let repairs: Vec<RepairData> = persistence.list_repairs(vehicle_id)?;
    Ok(ListRepairsResponse {
        vehicle_id,
        repairs: repairs.iter().map(RepairInfo::from).collect(),
    })
}

/// Logs a repair.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the date or description is
/// missing, an amount is negative, or the vehicle does not exist.
pub fn create_repair(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    vehicle_id: i64,
    request: &RepairRequest,
    now: OffsetDateTime,
) -> Result<RepairInfo, ApiError> {
    AuthorizationService::require_dispatcher(actor, "create_repair")?;
    let repair: NewRepair = NewRepair {
        vehicle_id,
        repair_date: require_day("repairDate", &request.repair_date)?,
        description: require_name("Description", &request.description)?,
        cost_cents: request.cost,
        odometer_km: request.odometer_km,
        note: normalize_note(request.note.as_deref()),
    };

    let repair: RepairData =
        persistence.create_repair(&repair, ChangeContext::new(Some(actor.id), now))?;
    Ok(RepairInfo::from(&repair))
}

/// Deletes a repair log entry.
///
/// # Errors
///
/// Returns an error if the actor is a Driver or the repair does not exist.
pub fn delete_repair(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    repair_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::require_dispatcher(actor, "delete_repair")?;
    persistence.delete_repair(repair_id)?;
    Ok(())
}
