// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spare-parts stock ledger.
//!
//! A part's quantity is a running total over its append-only movement
//! history: the sum of receipts minus the sum of issues. Quantity never
//! goes below zero.

use crate::error::DomainError;
use crate::types::MovementType;

/// Note attached to the synthetic receipt recorded for a part's initial stock.
pub const OPENING_BALANCE_NOTE: &str = "Opening balance";

/// Returns whether a part is at or below its reorder threshold.
#[must_use]
pub const fn is_low_stock(quantity: i64, min_stock: i64) -> bool {
    quantity <= min_stock
}

/// Validates a movement and returns the quantity after applying it.
///
/// # Arguments
///
/// * `on_hand` - Current quantity of the part
/// * `unit` - Unit label, used in the insufficient stock message
/// * `movement_type` - Receipt or issue
/// * `quantity` - Amount moved
///
/// # Errors
///
/// Returns an error if:
/// - `quantity` is not positive
/// - An issue exceeds the quantity on hand
pub fn apply_movement(
    on_hand: i64,
    unit: &str,
    movement_type: MovementType,
    quantity: i64,
) -> Result<i64, DomainError> {
    if quantity <= 0 {
        return Err(DomainError::InvalidQuantity { quantity });
    }
    if movement_type == MovementType::Out && quantity > on_hand {
        return Err(DomainError::InsufficientStock {
            available: on_hand,
            unit: unit.to_string(),
        });
    }
    on_hand
        .checked_add(movement_type.signed(quantity))
        .ok_or(DomainError::InvalidQuantity { quantity })
}

/// Validates the stock figures given when a part is created or edited.
///
/// # Errors
///
/// Returns an error if either figure is negative.
pub const fn validate_stock_levels(
    initial_quantity: i64,
    min_stock: i64,
) -> Result<(), DomainError> {
    if initial_quantity < 0 {
        return Err(DomainError::InvalidStockLevel {
            field: "quantity",
            value: initial_quantity,
        });
    }
    if min_stock < 0 {
        return Err(DomainError::InvalidStockLevel {
            field: "minStock",
            value: min_stock,
        });
    }
    Ok(())
}

/// Sums a movement history into the quantity it implies.
pub fn ledger_balance<I>(movements: I) -> i64
where
    I: IntoIterator<Item = (MovementType, i64)>,
{
    movements
        .into_iter()
        .map(|(movement_type, quantity)| movement_type.signed(quantity))
        .sum()
}
