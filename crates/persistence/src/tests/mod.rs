// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod availability_tests;
mod inventory_tests;
mod user_tests;

use chrono::NaiveDate;
use fleetbook_domain::{LoginName, MaintenanceState, Plate, Role};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{ChangeContext, RouteDraft, SqlitePersistence, VehicleData};

/// A fixed clock for deterministic timestamps.
pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-10 08:00:00 UTC)
}

pub fn test_ctx() -> ChangeContext {
    ChangeContext::new(None, test_now())
}

pub fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).expect("Valid test date")
}

pub fn create_test_user(persistence: &mut SqlitePersistence, login: &str, role: Role) -> i64 {
    persistence
        .create_user(
            &LoginName::parse(login).unwrap(),
            &format!("{login} display"),
            "Password123!",
            role,
            test_now(),
        )
        .unwrap()
}

pub fn create_test_vehicle(persistence: &mut SqlitePersistence, plate: &str) -> VehicleData {
    persistence
        .create_vehicle(
            &Plate::parse(plate).unwrap(),
            "Test van",
            None,
            &MaintenanceState::default(),
            test_now(),
        )
        .unwrap()
}

pub fn test_route_draft(
    route_date: NaiveDate,
    vehicle_id: Option<i64>,
    planned_km: Option<i64>,
) -> RouteDraft {
    RouteDraft {
        name: String::from("Morning loop"),
        route_date,
        driver_id: None,
        vehicle_id,
        planned_km,
        actual_km: None,
        fuel_cost_cents: None,
        note: None,
        status: None,
        orders: None,
    }
}
