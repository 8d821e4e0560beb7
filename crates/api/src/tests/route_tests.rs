// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for routes, orders and daily reports.

use fleetbook_domain::{CarCheck, CounterKind, RouteStatus};

use crate::handlers::routes::{
    create_route, delete_route, get_report, get_route, list_routes, set_route_status,
    submit_report, update_route,
};
use crate::handlers::vehicles::get_maintenance;
use crate::tests::helpers::{Fleet, route_request, setup, test_now, today, yesterday};
use crate::{
    ApiError, DailyReportRequest, MaintenanceResponse, OrderRequest, ReportResponse,
    RouteChangeResponse, RouteInfo, RouteQuery, RouteRequest, StatusRequest,
};

fn oil_km(fleet: &mut Fleet, vehicle_id: i64) -> i64 {
    let maintenance: MaintenanceResponse = get_maintenance(
        &mut fleet.persistence,
        &fleet.dispatcher,
        vehicle_id,
        today(),
    )
    .unwrap();
    maintenance
        .counters
        .iter()
        .find(|view| view.counter == CounterKind::Oil)
        .unwrap()
        .km
}

fn status(value: &str) -> StatusRequest {
    StatusRequest {
        status: value.to_string(),
    }
}

fn order(customer: &str) -> OrderRequest {
    OrderRequest {
        order_id: None,
        customer: customer.to_string(),
        address: format!("{customer} street 1"),
        note: None,
    }
}

fn report(car_check: Option<&str>, actual_km: Option<i64>) -> DailyReportRequest {
    DailyReportRequest {
        actual_km,
        fuel_cost: Some(85_050),
        car_check: car_check.map(str::to_string),
        note: Some(String::from("  Dent on rear door ")),
    }
}

fn planned_route(fleet: &mut Fleet, vehicle_id: i64, planned_km: i64) -> RouteInfo {
    let mut request: RouteRequest = route_request(
        "North loop",
        today(),
        Some(fleet.driver.id),
        Some(vehicle_id),
    );
    request.planned_km = Some(planned_km);
    create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request,
        test_now(),
    )
    .unwrap()
    .route
}

#[test]
fn test_create_route_with_orders_in_order() {
    let mut fleet = setup();
    let mut request: RouteRequest = route_request("North loop", today(), None, None);
    request.orders = Some(vec![order("Bakery"), order("Pharmacy"), order("School")]);

    let response: RouteChangeResponse = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request,
        test_now(),
    )
    .unwrap();

    assert_eq!(response.route.status, RouteStatus::Planned);
    assert!(!response.completed);
    let customers: Vec<&str> = response
        .route
        .orders
        .iter()
        .map(|o| o.customer.as_str())
        .collect();
    assert_eq!(customers, vec!["Bakery", "Pharmacy", "School"]);
}

#[test]
fn test_route_requires_name_and_valid_date() {
    let mut fleet = setup();

    let err = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("   ", today(), None, None),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));

    let mut request: RouteRequest = route_request("North loop", today(), None, None);
    request.route_date = String::from("10.03.2026");
    let err = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request,
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "routeDate"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_route_driver_must_be_a_driver() {
    let mut fleet = setup();

    let err = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("North loop", today(), Some(fleet.dispatcher.id), None),
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "driverId"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let err = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("North loop", today(), Some(999), None),
        test_now(),
    )
    .unwrap_err();
    assert_eq!(err, ApiError::not_found("user", 999));
}

#[test]
fn test_unknown_vehicle_is_not_found() {
    let mut fleet = setup();

    let err = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("North loop", today(), None, Some(999)),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_drivers_cannot_plan_routes() {
    let mut fleet = setup();

    let err = create_route(
        &mut fleet.persistence,
        &fleet.driver,
        &route_request("North loop", today(), Some(fleet.driver.id), None),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_drivers_only_see_their_own_routes() {
    let mut fleet = setup();
    let driver_id: i64 = fleet.driver.id;
    let other_id: i64 = fleet.other_driver.id;
    let mine: RouteInfo = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("Mine", today(), Some(driver_id), None),
        test_now(),
    )
    .unwrap()
    .route;
    let theirs: RouteInfo = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("Theirs", today(), Some(other_id), None),
        test_now(),
    )
    .unwrap()
    .route;

    let query: RouteQuery = RouteQuery {
        driver_id: Some(other_id),
        ..RouteQuery::default()
    };
    let listed = list_routes(&mut fleet.persistence, &fleet.driver, &query).unwrap();
    let ids: Vec<i64> = listed.routes.iter().map(|r| r.route_id).collect();
    assert_eq!(ids, vec![mine.route_id]);

    let all = list_routes(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &RouteQuery::default(),
    )
    .unwrap();
    assert_eq!(all.routes.len(), 2);

    assert!(get_route(&mut fleet.persistence, &fleet.driver, mine.route_id).is_ok());
    let err = get_route(&mut fleet.persistence, &fleet.driver, theirs.route_id).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_list_routes_filters_by_date_and_status() {
    let mut fleet = setup();
    create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("Yesterday", yesterday(), None, None),
        test_now(),
    )
    .unwrap();
    let today_route: RouteInfo = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("Today", today(), None, None),
        test_now(),
    )
    .unwrap()
    .route;
    set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        today_route.route_id,
        &status("IN_PROGRESS"),
        test_now(),
    )
    .unwrap();

    let from_today = list_routes(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &RouteQuery {
            from: Some(String::from("2026-03-10")),
            ..RouteQuery::default()
        },
    )
    .unwrap();
    assert_eq!(from_today.routes.len(), 1);

    let in_progress = list_routes(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &RouteQuery {
            status: Some(String::from("in_progress")),
            ..RouteQuery::default()
        },
    )
    .unwrap();
    assert_eq!(in_progress.routes.len(), 1);
    assert_eq!(in_progress.routes[0].route_id, today_route.route_id);

    let err = list_routes(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &RouteQuery {
            to: Some(String::from("next week")),
            ..RouteQuery::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_completing_twice_credits_once() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 180);

    let first: RouteChangeResponse = set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &status("COMPLETED"),
        test_now(),
    )
    .unwrap();
    assert!(first.completed);
    assert_eq!(first.credited_km, Some(180));
    assert!(first.route.completed_at.is_some());

    let second: RouteChangeResponse = set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &status("COMPLETED"),
        test_now(),
    )
    .unwrap();
    assert!(!second.completed);
    assert_eq!(second.credited_km, None);

    assert_eq!(oil_km(&mut fleet, vehicle_id), 180);
}

#[test]
fn test_completed_route_cannot_reopen() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 50);
    set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &status("COMPLETED"),
        test_now(),
    )
    .unwrap();

    let err = set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &status("PLANNED"),
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::Conflict { rule, .. } => assert_eq!(rule, "terminal_status"),
        other => panic!("Expected Conflict, got {other:?}"),
    }
}

#[test]
fn test_edit_of_completed_route_keeps_it_completed_without_recredit() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 100);
    set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &status("COMPLETED"),
        test_now(),
    )
    .unwrap();

    let mut request: RouteRequest = route_request(
        "North loop (edited)",
        today(),
        Some(fleet.driver.id),
        Some(vehicle_id),
    );
    request.actual_km = Some(140);
    let edited: RouteChangeResponse = update_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &request,
        test_now(),
    )
    .unwrap();

    assert_eq!(edited.route.status, RouteStatus::Completed);
    assert_eq!(edited.route.name, "North loop (edited)");
    assert_eq!(edited.credited_km, None);
    assert_eq!(oil_km(&mut fleet, vehicle_id), 100);
}

#[test]
fn test_route_created_completed_credits_immediately() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let mut request: RouteRequest = route_request("Backfill", yesterday(), None, Some(vehicle_id));
    request.actual_km = Some(75);
    request.status = Some(String::from("completed"));

    let response: RouteChangeResponse = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request,
        test_now(),
    )
    .unwrap();

    assert!(response.completed);
    assert_eq!(response.credited_km, Some(75));
    assert_eq!(oil_km(&mut fleet, vehicle_id), 75);
}

#[test]
fn test_order_edits_keep_ids_and_drop_missing() {
    let mut fleet = setup();
    let mut request: RouteRequest = route_request("North loop", today(), None, None);
    request.orders = Some(vec![order("Bakery"), order("Pharmacy"), order("School")]);
    let created: RouteInfo = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &request,
        test_now(),
    )
    .unwrap()
    .route;
    let bakery_id: i64 = created.orders[0].order_id;
    let school_id: i64 = created.orders[2].order_id;

    let mut edit: RouteRequest = route_request("North loop", today(), None, None);
    edit.orders = Some(vec![
        OrderRequest {
            order_id: Some(school_id),
            customer: String::from("School"),
            address: String::from("New gate"),
            note: None,
        },
        order("Florist"),
        OrderRequest {
            order_id: Some(bakery_id),
            customer: String::from("Bakery"),
            address: String::from("Bakery street 1"),
            note: None,
        },
    ]);
    let edited: RouteInfo = update_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        created.route_id,
        &edit,
        test_now(),
    )
    .unwrap()
    .route;

    let customers: Vec<&str> = edited.orders.iter().map(|o| o.customer.as_str()).collect();
    assert_eq!(customers, vec!["School", "Florist", "Bakery"]);
    assert_eq!(edited.orders[0].order_id, school_id);
    assert_eq!(edited.orders[0].address, "New gate");
    assert_eq!(edited.orders[2].order_id, bakery_id);

    let untouched: RouteInfo = update_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        created.route_id,
        &route_request("North loop", today(), None, None),
        test_now(),
    )
    .unwrap()
    .route;
    assert_eq!(untouched.orders.len(), 3);
}

#[test]
fn test_daily_report_completes_and_credits_actual_km() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 200);

    let response: ReportResponse = submit_report(
        &mut fleet.persistence,
        &fleet.driver,
        route.route_id,
        &report(Some("nok"), Some(212)),
        test_now(),
    )
    .unwrap();

    assert_eq!(response.report.car_check, CarCheck::Nok);
    assert_eq!(response.report.driver_id, Some(fleet.driver.id));
    assert_eq!(response.report.note.as_deref(), Some("Dent on rear door"));
    assert_eq!(response.route.status, RouteStatus::Completed);
    assert_eq!(response.route.actual_km, Some(212));
    assert_eq!(response.route.fuel_cost.as_deref(), Some("850.50"));
    assert_eq!(response.credited_km, Some(212));
    assert_eq!(oil_km(&mut fleet, vehicle_id), 212);

    let detail: RouteInfo =
        get_route(&mut fleet.persistence, &fleet.driver, route.route_id).unwrap();
    assert_eq!(
        detail.report.map(|r| r.report_id),
        Some(response.report.report_id)
    );
}

#[test]
fn test_second_report_is_a_conflict() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 200);
    submit_report(
        &mut fleet.persistence,
        &fleet.driver,
        route.route_id,
        &report(Some("OK"), None),
        test_now(),
    )
    .unwrap();

    let err = submit_report(
        &mut fleet.persistence,
        &fleet.driver,
        route.route_id,
        &report(Some("OK"), Some(500)),
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::Conflict { rule, .. } => assert_eq!(rule, "single_report"),
        other => panic!("Expected Conflict, got {other:?}"),
    }
    assert_eq!(oil_km(&mut fleet, vehicle_id), 200);
}

#[test]
fn test_report_on_completed_route_does_not_recredit() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 90);
    set_route_status(
        &mut fleet.persistence,
        &fleet.dispatcher,
        route.route_id,
        &status("COMPLETED"),
        test_now(),
    )
    .unwrap();

    let response: ReportResponse = submit_report(
        &mut fleet.persistence,
        &fleet.driver,
        route.route_id,
        &report(Some("OK"), Some(95)),
        test_now(),
    )
    .unwrap();
    assert_eq!(response.credited_km, None);
    assert_eq!(oil_km(&mut fleet, vehicle_id), 90);
}

#[test]
fn test_report_requires_car_check_and_ownership() {
    let mut fleet = setup();
    let vehicle_id: i64 = fleet.add_vehicle("1AB2345");
    let route: RouteInfo = planned_route(&mut fleet, vehicle_id, 90);

    let err = submit_report(
        &mut fleet.persistence,
        &fleet.driver,
        route.route_id,
        &report(None, Some(95)),
        test_now(),
    )
    .unwrap_err();
    match err {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "carCheck"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let err = submit_report(
        &mut fleet.persistence,
        &fleet.other_driver,
        route.route_id,
        &report(Some("OK"), Some(95)),
        test_now(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));

    let err = get_report(&mut fleet.persistence, &fleet.driver, route.route_id).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_delete_route() {
    let mut fleet = setup();
    let route: RouteInfo = create_route(
        &mut fleet.persistence,
        &fleet.dispatcher,
        &route_request("North loop", today(), None, None),
        test_now(),
    )
    .unwrap()
    .route;

    assert!(delete_route(&mut fleet.persistence, &fleet.driver, route.route_id).is_err());
    delete_route(&mut fleet.persistence, &fleet.dispatcher, route.route_id).unwrap();
    let err = get_route(&mut fleet.persistence, &fleet.dispatcher, route.route_id).unwrap_err();
    assert_eq!(err, ApiError::not_found("route", route.route_id));
}
