// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! Every operation that reads before it writes runs inside an immediate
//! transaction, so concurrent writers are serialized by the database lock
//! and a failure leaves no partial change behind.
//!
//! - `users`: Users and sessions
//! - `vehicles`: Vehicle identity and maintenance state
//! - `repairs`: Repair log
//! - `routes`: Routes, orders, daily reports and the auto-complete sweep
//! - `inventory`: Spare parts and stock movements
//! - `ratings`: Driver reviews
//! - `availability`: Per-day availability

pub mod availability;
pub mod inventory;
pub mod ratings;
pub mod repairs;
pub mod routes;
pub mod users;
pub mod vehicles;

use fleetbook_domain::format_timestamp;
use time::OffsetDateTime;

use crate::error::PersistenceError;

/// Formats an instant for a timestamp column.
pub(crate) fn stamp(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    format_timestamp(instant)
        .map_err(|e| PersistenceError::Other(format!("Failed to format timestamp: {e}")))
}
