// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use chrono::NaiveDate;
use fleetbook_domain::{LoginName, Role};
use fleetbook_persistence::SqlitePersistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::handlers::vehicles::create_vehicle;
use crate::{AuthenticatedActor, RouteRequest, VehicleInfo, VehicleRequest};

pub const TEST_PASSWORD: &str = "Fleet-Pass-2026";

/// A database with one user of each role plus a second driver.
pub struct Fleet {
    pub persistence: SqlitePersistence,
    pub admin: AuthenticatedActor,
    pub dispatcher: AuthenticatedActor,
    pub driver: AuthenticatedActor,
    pub other_driver: AuthenticatedActor,
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-10 08:00:00 UTC)
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

pub fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
}

fn add_user(persistence: &mut SqlitePersistence, login: &str, role: Role) -> AuthenticatedActor {
    let login_name: LoginName = LoginName::parse(login).unwrap();
    let user_id: i64 = persistence
        .create_user(&login_name, login, TEST_PASSWORD, role, test_now())
        .unwrap();
    AuthenticatedActor::new(user_id, login_name.value().to_string(), role)
}

pub fn setup() -> Fleet {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    let admin: AuthenticatedActor = add_user(&mut persistence, "admin", Role::Admin);
    let dispatcher: AuthenticatedActor = add_user(&mut persistence, "dispatch", Role::Dispatcher);
    let driver: AuthenticatedActor = add_user(&mut persistence, "jnovak", Role::Driver);
    let other_driver: AuthenticatedActor = add_user(&mut persistence, "pdvorak", Role::Driver);

    Fleet {
        persistence,
        admin,
        dispatcher,
        driver,
        other_driver,
    }
}

impl Fleet {
    pub fn add_vehicle(&mut self, plate: &str) -> i64 {
        let request: VehicleRequest = VehicleRequest {
            plate: plate.to_string(),
            name: format!("Van {plate}"),
            note: None,
        };
        let vehicle: VehicleInfo = create_vehicle(
            &mut self.persistence,
            &self.dispatcher,
            &request,
            test_now(),
            today(),
        )
        .unwrap();
        vehicle.vehicle_id
    }
}

pub fn route_request(
    name: &str,
    route_date: NaiveDate,
    driver_id: Option<i64>,
    vehicle_id: Option<i64>,
) -> RouteRequest {
    RouteRequest {
        name: name.to_string(),
        route_date: route_date.format("%Y-%m-%d").to_string(),
        driver_id,
        vehicle_id,
        planned_km: None,
        actual_km: None,
        fuel_cost: None,
        note: None,
        status: None,
        orders: None,
    }
}
