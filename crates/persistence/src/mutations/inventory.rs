// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spare part and stock movement mutations.
//!
//! A part's `quantity` column is only changed together with an appended
//! movement row, so it always equals the balance of its movement history.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{
    DomainError, MovementType, OPENING_BALANCE_NOTE, apply_movement, validate_stock_levels,
};
use tracing::{info, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::{
    ChangeContext, MovementData, MovementOutcome, NewMovement, NewSparePart, SparePartData,
    SparePartEdit,
};
use crate::diesel_schema::{spare_part_movements, spare_parts};
use crate::error::PersistenceError;
use crate::mutations::stamp;
use crate::queries::inventory::{get_movement, require_spare_part};
use crate::queries::vehicles::vehicle_exists;

fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &NewMovement,
    ctx: ChangeContext,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(spare_part_movements::table)
        .values((
            spare_part_movements::part_id.eq(movement.part_id),
            spare_part_movements::movement_type.eq(movement.movement_type.as_str()),
            spare_part_movements::quantity.eq(movement.quantity),
            spare_part_movements::vehicle_id.eq(movement.vehicle_id),
            spare_part_movements::note.eq(movement.note.as_deref()),
            spare_part_movements::created_by.eq(ctx.actor_id),
            spare_part_movements::created_at.eq(stamp(ctx.now)?),
        ))
        .execute(conn)?;
    conn.get_last_insert_rowid()
}

/// Creates a spare part.
///
/// A nonzero initial quantity is recorded as an opening balance receipt.
///
/// # Errors
///
/// Returns `RuleViolation` if the quantity or minimum stock is negative.
pub fn create_spare_part(
    conn: &mut SqliteConnection,
    part: &NewSparePart,
    ctx: ChangeContext,
) -> Result<SparePartData, PersistenceError> {
    validate_stock_levels(part.quantity, part.min_stock)?;
    let created_at: String = stamp(ctx.now)?;

    conn.immediate_transaction(|conn| {
        diesel::insert_into(spare_parts::table)
            .values((
                spare_parts::name.eq(&part.name),
                spare_parts::unit.eq(&part.unit),
                spare_parts::quantity.eq(part.quantity),
                spare_parts::min_stock.eq(part.min_stock),
                spare_parts::note.eq(part.note.as_deref()),
                spare_parts::created_at.eq(&created_at),
            ))
            .execute(conn)?;
        let part_id: i64 = conn.get_last_insert_rowid()?;

        if part.quantity > 0 {
            let opening: NewMovement = NewMovement {
                part_id,
                movement_type: MovementType::In,
                quantity: part.quantity,
                vehicle_id: None,
                note: Some(OPENING_BALANCE_NOTE.to_string()),
            };
            insert_movement(conn, &opening, ctx)?;
        }

        info!(part_id, name = %part.name, quantity = part.quantity, "Spare part created");
        require_spare_part(conn, part_id)
    })
}

/// Edits a part's descriptive fields and reorder threshold.
///
/// # Errors
///
/// Returns `EntityNotFound` if the part does not exist, or `RuleViolation`
/// if the minimum stock is negative.
pub fn update_spare_part(
    conn: &mut SqliteConnection,
    part_id: i64,
    edit: &SparePartEdit,
) -> Result<SparePartData, PersistenceError> {
    validate_stock_levels(0, edit.min_stock)?;

    conn.immediate_transaction(|conn| {
        let rows_affected: usize = diesel::update(spare_parts::table.find(part_id))
            .set((
                spare_parts::name.eq(&edit.name),
                spare_parts::unit.eq(&edit.unit),
                spare_parts::min_stock.eq(edit.min_stock),
                spare_parts::note.eq(edit.note.as_deref()),
            ))
            .execute(conn)?;
        if rows_affected == 0 {
            return Err(PersistenceError::EntityNotFound {
                entity: "spare part",
                id: part_id,
            });
        }
        require_spare_part(conn, part_id)
    })
}

/// Deletes a part and its movement history.
///
/// # Errors
///
/// Returns `EntityNotFound` if the part does not exist.
pub fn delete_spare_part(
    conn: &mut SqliteConnection,
    part_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(spare_parts::table.find(part_id)).execute(conn)?;
    if rows_affected == 0 {
        return Err(PersistenceError::EntityNotFound {
            entity: "spare part",
            id: part_id,
        });
    }
    info!(part_id, "Spare part deleted");
    Ok(())
}

/// Records a receipt or issue and adjusts the part's quantity.
///
/// # Errors
///
/// Returns:
/// - `EntityNotFound` if the part or the referenced vehicle does not exist
/// - `RuleViolation(InvalidQuantity)` if the quantity is not positive
/// - `RuleViolation(InsufficientStock)` if an issue exceeds the stock on hand
pub fn record_movement(
    conn: &mut SqliteConnection,
    movement: &NewMovement,
    ctx: ChangeContext,
) -> Result<MovementOutcome, PersistenceError> {
    if movement.quantity <= 0 {
        return Err(PersistenceError::RuleViolation(DomainError::InvalidQuantity {
            quantity: movement.quantity,
        }));
    }

    conn.immediate_transaction(|conn| {
        let part: SparePartData = require_spare_part(conn, movement.part_id)?;
        if let Some(vehicle_id) = movement.vehicle_id
            && !vehicle_exists(conn, vehicle_id)?
        {
            return Err(PersistenceError::EntityNotFound {
                entity: "vehicle",
                id: vehicle_id,
            });
        }
        write_movement(conn, &part, movement, ctx)
    })
}

/// Checks `movement` against the `part` snapshot and writes it.
///
/// Issues use a guarded update that only matches while enough stock is on
/// hand, so a snapshot that went stale after it was read still cannot drive
/// the quantity negative.
///
/// # Errors
///
/// Returns `RuleViolation(InsufficientStock)` if the issue exceeds either the
/// snapshot or the stock actually on hand.
pub fn write_movement(
    conn: &mut SqliteConnection,
    part: &SparePartData,
    movement: &NewMovement,
    ctx: ChangeContext,
) -> Result<MovementOutcome, PersistenceError> {
    apply_movement(
        part.quantity,
        &part.unit,
        movement.movement_type,
        movement.quantity,
    )?;

    let rows_affected: usize = match movement.movement_type {
        MovementType::In => diesel::update(spare_parts::table.find(movement.part_id))
            .set(spare_parts::quantity.eq(spare_parts::quantity + movement.quantity))
            .execute(conn)?,
        MovementType::Out => diesel::update(
            spare_parts::table
                .find(movement.part_id)
                .filter(spare_parts::quantity.ge(movement.quantity)),
        )
        .set(spare_parts::quantity.eq(spare_parts::quantity - movement.quantity))
        .execute(conn)?,
    };
    if rows_affected == 0 {
        let available: i64 = require_spare_part(conn, movement.part_id)?.quantity;
        warn!(
            part_id = movement.part_id,
            requested = movement.quantity,
            available,
            "Stock issue lost a race"
        );
        return Err(PersistenceError::RuleViolation(
            DomainError::InsufficientStock {
                available,
                unit: part.unit.clone(),
            },
        ));
    }

    let movement_id: i64 = insert_movement(conn, movement, ctx)?;
    let updated: SparePartData = require_spare_part(conn, movement.part_id)?;
    info!(
        part_id = movement.part_id,
        movement_id,
        movement_type = movement.movement_type.as_str(),
        quantity = movement.quantity,
        on_hand = updated.quantity,
        "Stock movement recorded"
    );

    let recorded: MovementData =
        get_movement(conn, movement_id)?.ok_or(PersistenceError::EntityNotFound {
            entity: "movement",
            id: movement_id,
        })?;

    Ok(MovementOutcome {
        movement: recorded,
        part: updated,
    })
}
