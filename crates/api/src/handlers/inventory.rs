// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spare parts and their stock movement ledger.
//!
//! Dispatchers manage the catalog. Anyone signed in may look up stock and
//! record a movement, so drivers can log the parts they take.

use fleetbook_domain::{MovementType, ledger_balance, normalize_note, require_name};
use fleetbook_persistence::{
    ChangeContext, MovementData, MovementOutcome, NewMovement, NewSparePart, SparePartData,
    SparePartEdit, SqlitePersistence,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::handlers::parse_value;
use crate::request_response::{
    ListSparePartsResponse, MovementInfo, MovementRequest, MovementResponse,
    SparePartDetailResponse, SparePartInfo, SparePartRequest, UpdateSparePartRequest,
};

/// Column order of the movement CSV export.
pub const MOVEMENT_CSV_HEADER: [&str; 6] = [
    "movement_id",
    "created_at",
    "type",
    "quantity",
    "vehicle_id",
    "note",
];

fn load_part(persistence: &mut SqlitePersistence, part_id: i64) -> Result<SparePartData, ApiError> {
    persistence
        .get_spare_part(part_id)?
        .ok_or_else(|| ApiError::not_found("spare part", part_id))
}

fn csv_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV: {err}"),
    }
}

/// Lists spare parts ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_spare_parts(
    persistence: &mut SqlitePersistence,
    _actor: &AuthenticatedActor,
) -> Result<ListSparePartsResponse, ApiError> {
    let parts: Vec<SparePartData> = persistence.list_spare_parts()?;
    let parts: Vec<SparePartInfo> = parts.iter().map(SparePartInfo::from).collect();
    let low_stock_count: usize = parts.iter().filter(|part| part.is_low_stock).count();
    Ok(ListSparePartsResponse {
        parts,
        low_stock_count,
    })
}

/// Returns a part with its movement history.
///
/// # Errors
///
/// Returns an error if the part does not exist.
pub fn get_spare_part(
    persistence: &mut SqlitePersistence,
    _actor: &AuthenticatedActor,
    part_id: i64,
) -> Result<SparePartDetailResponse, ApiError> {
    let part: SparePartData = load_part(persistence, part_id)?;
    let movements: Vec<MovementData> = persistence.list_movements(part_id)?;
    let balance: i64 = ledger_balance(
        movements
            .iter()
            .map(|movement| (movement.movement_type, movement.quantity)),
    );

    Ok(SparePartDetailResponse {
        part: SparePartInfo::from(&part),
        movements: movements.iter().map(MovementInfo::from).collect(),
        ledger_balance: balance,
    })
}

/// Adds a part to the catalog. A positive opening quantity is recorded as
/// an opening-balance `IN` movement.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the name or unit is empty, or
/// a stock level is negative.
pub fn create_spare_part(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &SparePartRequest,
    now: OffsetDateTime,
) -> Result<SparePartInfo, ApiError> {
    AuthorizationService::require_dispatcher(actor, "create_spare_part")?;
    let part: NewSparePart = NewSparePart {
        name: require_name("Part name", &request.name)?,
        unit: require_name("Unit", &request.unit)?,
        quantity: request.quantity.unwrap_or(0),
        min_stock: request.min_stock.unwrap_or(0),
        note: normalize_note(request.note.as_deref()),
    };

    let part: SparePartData =
        persistence.create_spare_part(&part, ChangeContext::new(Some(actor.id), now))?;
    debug!(
        part_id = part.part_id,
        quantity = part.quantity,
        created_by = actor.id,
        "Spare part created"
    );
    Ok(SparePartInfo::from(&part))
}

/// Edits a part's name, unit, minimum stock and note.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the input is invalid, or the
/// part does not exist.
pub fn update_spare_part(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    part_id: i64,
    request: &UpdateSparePartRequest,
) -> Result<SparePartInfo, ApiError> {
    AuthorizationService::require_dispatcher(actor, "update_spare_part")?;
    let edit: SparePartEdit = SparePartEdit {
        name: require_name("Part name", &request.name)?,
        unit: require_name("Unit", &request.unit)?,
        min_stock: request.min_stock.unwrap_or(0),
        note: normalize_note(request.note.as_deref()),
    };

    let part: SparePartData = persistence.update_spare_part(part_id, &edit)?;
    Ok(SparePartInfo::from(&part))
}

/// Deletes a part with its movement history.
///
/// # Errors
///
/// Returns an error if the actor is a Driver or the part does not exist.
pub fn delete_spare_part(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    part_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::require_dispatcher(actor, "delete_spare_part")?;
    persistence.delete_spare_part(part_id)?;
    debug!(part_id, deleted_by = actor.id, "Spare part deleted");
    Ok(())
}

/// Records a stock movement and applies it to the part's quantity.
///
/// # Errors
///
/// Returns an error if:
/// - The type is missing or unknown
/// - The quantity is missing or not positive
/// - An `OUT` exceeds the available stock
/// - The part or referenced vehicle does not exist
pub fn record_movement(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    part_id: i64,
    request: &MovementRequest,
    now: OffsetDateTime,
) -> Result<MovementResponse, ApiError> {
    let movement_type: MovementType = match request.movement_type.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_value(raw)?,
        _ => return Err(ApiError::invalid("type", "Movement type is required")),
    };
    let quantity: i64 = request
        .quantity
        .ok_or_else(|| ApiError::invalid("quantity", "Quantity must be a positive integer"))?;

    let movement: NewMovement = NewMovement {
        part_id,
        movement_type,
        quantity,
        vehicle_id: request.vehicle_id,
        note: normalize_note(request.note.as_deref()),
    };
    let outcome: MovementOutcome =
        persistence.record_movement(&movement, ChangeContext::new(Some(actor.id), now))?;
    debug!(
        part_id,
        movement_id = outcome.movement.movement_id,
        movement_type = %movement_type,
        quantity,
        balance = outcome.part.quantity,
        recorded_by = actor.id,
        "Stock movement recorded"
    );

    Ok(MovementResponse {
        movement: MovementInfo::from(&outcome.movement),
        part: SparePartInfo::from(&outcome.part),
    })
}

/// Exports a part's movements as CSV, oldest first.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the part does not exist, or
/// the CSV cannot be written.
pub fn export_movements_csv(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    part_id: i64,
) -> Result<String, ApiError> {
    AuthorizationService::require_dispatcher(actor, "export_movements_csv")?;
    load_part(persistence, part_id)?;
    let movements: Vec<MovementData> = persistence.list_movements(part_id)?;

    let mut writer: csv::Writer<Vec<u8>> = csv::Writer::from_writer(Vec::new());
    writer.write_record(MOVEMENT_CSV_HEADER).map_err(csv_error)?;
    for movement in &movements {
        writer
            .write_record([
                movement.movement_id.to_string(),
                movement.created_at.clone(),
                movement.movement_type.as_str().to_string(),
                movement.quantity.to_string(),
                movement
                    .vehicle_id
                    .map_or_else(String::new, |id| id.to_string()),
                movement.note.clone().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}
