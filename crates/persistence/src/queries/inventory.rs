// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spare part and stock movement queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::MovementType;
use tracing::debug;

use crate::data_models::{MovementData, SparePartData};
use crate::diesel_schema::{spare_part_movements, spare_parts};
use crate::error::PersistenceError;
use crate::queries::parse_stored;

/// Diesel Queryable struct for spare part rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = spare_parts)]
struct SparePartRow {
    part_id: i64,
    name: String,
    unit: String,
    quantity: i64,
    min_stock: i64,
    note: Option<String>,
    created_at: String,
}

impl From<SparePartRow> for SparePartData {
    fn from(row: SparePartRow) -> Self {
        Self {
            part_id: row.part_id,
            name: row.name,
            unit: row.unit,
            quantity: row.quantity,
            min_stock: row.min_stock,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

/// Diesel Queryable struct for movement rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = spare_part_movements)]
struct MovementRow {
    movement_id: i64,
    part_id: i64,
    movement_type: String,
    quantity: i64,
    vehicle_id: Option<i64>,
    note: Option<String>,
    created_by: Option<i64>,
    created_at: String,
}

impl TryFrom<MovementRow> for MovementData {
    type Error = PersistenceError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            movement_id: row.movement_id,
            part_id: row.part_id,
            movement_type: parse_stored::<MovementType>(
                "spare_part_movements.movement_type",
                &row.movement_type,
            )?,
            quantity: row.quantity,
            vehicle_id: row.vehicle_id,
            note: row.note,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Retrieves a spare part by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the part is not found.
pub fn get_spare_part(
    conn: &mut SqliteConnection,
    part_id: i64,
) -> Result<Option<SparePartData>, PersistenceError> {
    debug!(part_id, "Looking up spare part");

    Ok(spare_parts::table
        .find(part_id)
        .select(SparePartRow::as_select())
        .first::<SparePartRow>(conn)
        .optional()?
        .map(SparePartData::from))
}

/// Retrieves a spare part that must exist.
///
/// # Errors
///
/// Returns `EntityNotFound` if there is no such part.
pub fn require_spare_part(
    conn: &mut SqliteConnection,
    part_id: i64,
) -> Result<SparePartData, PersistenceError> {
    get_spare_part(conn, part_id)?.ok_or(PersistenceError::EntityNotFound {
        entity: "spare part",
        id: part_id,
    })
}

/// Lists all spare parts ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_spare_parts(
    conn: &mut SqliteConnection,
) -> Result<Vec<SparePartData>, PersistenceError> {
    Ok(spare_parts::table
        .select(SparePartRow::as_select())
        .order_by((spare_parts::name.asc(), spare_parts::part_id.asc()))
        .load::<SparePartRow>(conn)?
        .into_iter()
        .map(SparePartData::from)
        .collect())
}

/// Lists a part's movements, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_movements(
    conn: &mut SqliteConnection,
    part_id: i64,
) -> Result<Vec<MovementData>, PersistenceError> {
    spare_part_movements::table
        .filter(spare_part_movements::part_id.eq(part_id))
        .select(MovementRow::as_select())
        .order_by(spare_part_movements::movement_id.asc())
        .load::<MovementRow>(conn)?
        .into_iter()
        .map(MovementData::try_from)
        .collect()
}

/// Retrieves a single movement.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if the movement is not found.
pub fn get_movement(
    conn: &mut SqliteConnection,
    movement_id: i64,
) -> Result<Option<MovementData>, PersistenceError> {
    spare_part_movements::table
        .find(movement_id)
        .select(MovementRow::as_select())
        .first::<MovementRow>(conn)
        .optional()?
        .map(MovementData::try_from)
        .transpose()
}
