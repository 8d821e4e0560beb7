// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair log mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{format_day, validate_amount};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{ChangeContext, NewRepair, RepairData};
use crate::diesel_schema::repairs;
use crate::error::PersistenceError;
use crate::mutations::stamp;
use crate::queries::vehicles::{get_repair, vehicle_exists};

/// Appends a repair to a vehicle's log.
///
/// # Errors
///
/// Returns `EntityNotFound` if the vehicle does not exist, or
/// `RuleViolation` if the cost or odometer reading is negative.
pub fn create_repair(
    conn: &mut SqliteConnection,
    repair: &NewRepair,
    ctx: ChangeContext,
) -> Result<RepairData, PersistenceError> {
    validate_amount("cost", repair.cost_cents)?;
    validate_amount("odometerKm", repair.odometer_km)?;
    let created_at: String = stamp(ctx.now)?;

    conn.immediate_transaction(|conn| {
        if !vehicle_exists(conn, repair.vehicle_id)? {
            return Err(PersistenceError::EntityNotFound {
                entity: "vehicle",
                id: repair.vehicle_id,
            });
        }

        diesel::insert_into(repairs::table)
            .values((
                repairs::vehicle_id.eq(repair.vehicle_id),
                repairs::repair_date.eq(format_day(repair.repair_date)),
                repairs::description.eq(&repair.description),
                repairs::cost_cents.eq(repair.cost_cents),
                repairs::odometer_km.eq(repair.odometer_km),
                repairs::note.eq(repair.note.as_deref()),
                repairs::created_by.eq(ctx.actor_id),
                repairs::created_at.eq(&created_at),
            ))
            .execute(conn)?;
        let repair_id: i64 = conn.get_last_insert_rowid()?;
        info!(repair_id, vehicle_id = repair.vehicle_id, "Repair logged");

        get_repair(conn, repair_id)?.ok_or(PersistenceError::EntityNotFound {
            entity: "repair",
            id: repair_id,
        })
    })
}

/// Deletes a repair entry.
///
/// # Errors
///
/// Returns `EntityNotFound` if the repair does not exist.
pub fn delete_repair(conn: &mut SqliteConnection, repair_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(repairs::table.find(repair_id)).execute(conn)?;
    if rows_affected == 0 {
        return Err(PersistenceError::EntityNotFound {
            entity: "repair",
            id: repair_id,
        });
    }
    info!(repair_id, "Repair deleted");
    Ok(())
}
