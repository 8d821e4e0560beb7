// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Routes, their orders and daily reports.
//!
//! Dispatchers plan and edit routes. The assigned driver may read the
//! route and file its daily report. Completing a route credits its actual
//! kilometers to the assigned vehicle exactly once.

use fleetbook_domain::{CarCheck, DomainError, Role, RouteStatus, normalize_note, require_name};
use fleetbook_persistence::{
    ChangeContext, DailyReportData, NewDailyReport, OrderInput, ReportOutcome,
    RouteChangeOutcome, RouteData, RouteDraft, RouteFilter, SqlitePersistence, UserData,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::handlers::{parse_optional_value, parse_query_day, parse_value, require_day};
use crate::request_response::{
    DailyReportInfo, DailyReportRequest, ListRoutesResponse, OrderRequest, ReportResponse,
    RouteChangeResponse, RouteInfo, RouteQuery, RouteRequest, StatusRequest,
};

fn load_route(persistence: &mut SqlitePersistence, route_id: i64) -> Result<RouteData, ApiError> {
    persistence
        .get_route(route_id)?
        .ok_or_else(|| ApiError::not_found("route", route_id))
}

fn order_input(order: &OrderRequest) -> Result<OrderInput, ApiError> {
    Ok(OrderInput {
        order_id: order.order_id,
        customer: require_name("Customer", &order.customer)?,
        address: require_name("Address", &order.address)?,
        note: normalize_note(order.note.as_deref()),
    })
}

fn route_draft(request: &RouteRequest) -> Result<RouteDraft, ApiError> {
    let orders: Option<Vec<OrderInput>> = request
        .orders
        .as_ref()
        .map(|orders| {
            orders
                .iter()
                .map(order_input)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    Ok(RouteDraft {
        name: require_name("Route name", &request.name)?,
        route_date: require_day("routeDate", &request.route_date)?,
        driver_id: request.driver_id,
        vehicle_id: request.vehicle_id,
        planned_km: request.planned_km,
        actual_km: request.actual_km,
        fuel_cost_cents: request.fuel_cost,
        note: normalize_note(request.note.as_deref()),
        status: parse_optional_value(request.status.as_deref())?,
        orders,
    })
}

/// Rejects assignments to users who are not drivers.
fn check_driver(
    persistence: &mut SqlitePersistence,
    driver_id: Option<i64>,
) -> Result<(), ApiError> {
    let Some(driver_id) = driver_id else {
        return Ok(());
    };
    let user: UserData = persistence
        .get_user_by_id(driver_id)?
        .ok_or_else(|| ApiError::not_found("user", driver_id))?;
    if user.role == Role::Driver {
        Ok(())
    } else {
        Err(DomainError::NotADriver { user_id: driver_id }.into())
    }
}

fn change_response(outcome: &RouteChangeOutcome) -> RouteChangeResponse {
    RouteChangeResponse {
        route: RouteInfo::from(&outcome.route),
        completed: outcome.completed,
        credited_km: outcome.credit.map(|credit| credit.km),
    }
}

fn log_completion(outcome: &RouteChangeOutcome, actor: &AuthenticatedActor) {
    if outcome.completed {
        debug!(
            route_id = outcome.route.route_id,
            vehicle_id = ?outcome.credit.map(|credit| credit.vehicle_id),
            credited_km = outcome.credit.map_or(0, |credit| credit.km),
            completed_by = actor.id,
            "Route completed"
        );
    }
}

/// Lists routes ordered by date. Drivers only see their own routes.
///
/// # Errors
///
/// Returns an error if a filter value is invalid or the query fails.
pub fn list_routes(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: &RouteQuery,
) -> Result<ListRoutesResponse, ApiError> {
    let driver_id: Option<i64> = if actor.is_dispatcher() {
        query.driver_id
    } else {
        Some(actor.id)
    };
    let filter: RouteFilter = RouteFilter {
        from: parse_query_day("from", query.from.as_deref())?,
        to: parse_query_day("to", query.to.as_deref())?,
        driver_id,
        vehicle_id: query.vehicle_id,
        status: parse_optional_value(query.status.as_deref())?,
    };

    let routes: Vec<RouteData> = persistence.list_routes(&filter)?;
    Ok(ListRoutesResponse {
        routes: routes.iter().map(RouteInfo::from).collect(),
    })
}

/// Returns one route with its orders and daily report.
///
/// # Errors
///
/// Returns an error if the route does not exist or a Driver is not
/// assigned to it.
pub fn get_route(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    route_id: i64,
) -> Result<RouteInfo, ApiError> {
    let route: RouteData = load_route(persistence, route_id)?;
    AuthorizationService::require_route_access(actor, &route, "get_route")?;

    let report: Option<DailyReportData> = persistence.get_daily_report(route_id)?;
    let mut info: RouteInfo = RouteInfo::from(&route);
    info.report = report.as_ref().map(DailyReportInfo::from);
    Ok(info)
}

/// Plans a route. A route created as `COMPLETED` credits its vehicle.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the input is invalid, or a
/// referenced driver or vehicle does not exist.
pub fn create_route(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &RouteRequest,
    now: OffsetDateTime,
) -> Result<RouteChangeResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "create_route")?;
    let draft: RouteDraft = route_draft(request)?;
    check_driver(persistence, draft.driver_id)?;

    let outcome: RouteChangeOutcome =
        persistence.create_route(&draft, ChangeContext::new(Some(actor.id), now))?;
    debug!(
        route_id = outcome.route.route_id,
        route_date = %outcome.route.route_date,
        created_by = actor.id,
        "Route created"
    );
    log_completion(&outcome, actor);
    Ok(change_response(&outcome))
}

/// Replaces a route's fields. When `orders` is supplied it replaces the
/// order list; orders with an ID are updated in place.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the input is invalid, the
/// route is completed and the edit would reopen it, or a reference does
/// not exist.
pub fn update_route(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    route_id: i64,
    request: &RouteRequest,
    now: OffsetDateTime,
) -> Result<RouteChangeResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "update_route")?;
    let draft: RouteDraft = route_draft(request)?;
    check_driver(persistence, draft.driver_id)?;

    let outcome: RouteChangeOutcome =
        persistence.update_route(route_id, &draft, ChangeContext::new(Some(actor.id), now))?;
    log_completion(&outcome, actor);
    Ok(change_response(&outcome))
}

/// Moves a route to a new status.
///
/// # Errors
///
/// Returns an error if the actor is a Driver, the status is unknown, the
/// route does not exist, or the route is completed and the target differs.
pub fn set_route_status(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    route_id: i64,
    request: &StatusRequest,
    now: OffsetDateTime,
) -> Result<RouteChangeResponse, ApiError> {
    AuthorizationService::require_dispatcher(actor, "set_route_status")?;
    let status: RouteStatus = parse_value(&request.status)?;

    let outcome: RouteChangeOutcome =
        persistence.set_route_status(route_id, status, ChangeContext::new(Some(actor.id), now))?;
    log_completion(&outcome, actor);
    Ok(change_response(&outcome))
}

/// Deletes a route with its orders and report.
///
/// # Errors
///
/// Returns an error if the actor is a Driver or the route does not exist.
pub fn delete_route(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    route_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::require_dispatcher(actor, "delete_route")?;
    persistence.delete_route(route_id)?;
    debug!(route_id, deleted_by = actor.id, "Route deleted");
    Ok(())
}

// ============================================================================
// Daily reports
// ============================================================================

/// Files the single daily report for a route.
///
/// The route takes over the reported kilometers and fuel cost, moves to
/// `COMPLETED` and credits its vehicle, unless it was already completed.
///
/// # Errors
///
/// Returns an error if:
/// - The route does not exist
/// - A Driver files for a route not assigned to them
/// - `carCheck` is missing or invalid
/// - The route already has a report
pub fn submit_report(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    route_id: i64,
    request: &DailyReportRequest,
    now: OffsetDateTime,
) -> Result<ReportResponse, ApiError> {
    let route: RouteData = load_route(persistence, route_id)?;
    AuthorizationService::require_route_access(actor, &route, "submit_report")?;

    let car_check: CarCheck = match request.car_check.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_value(raw)?,
        _ => return Err(ApiError::invalid("carCheck", "Car check is required")),
    };
    let report: NewDailyReport = NewDailyReport {
        route_id,
        driver_id: route.driver_id.unwrap_or(actor.id),
        actual_km: request.actual_km,
        fuel_cost_cents: request.fuel_cost,
        car_check,
        note: normalize_note(request.note.as_deref()),
    };

    let outcome: ReportOutcome =
        persistence.submit_daily_report(&report, ChangeContext::new(Some(actor.id), now))?;
    debug!(
        route_id,
        report_id = outcome.report.report_id,
        car_check = %outcome.report.car_check,
        credited_km = outcome.credit.map_or(0, |credit| credit.km),
        "Daily report submitted"
    );

    Ok(ReportResponse {
        report: DailyReportInfo::from(&outcome.report),
        route: RouteInfo::from(&outcome.route),
        credited_km: outcome.credit.map(|credit| credit.km),
    })
}

/// Returns a route's daily report.
///
/// # Errors
///
/// Returns an error if the route or report does not exist, or a Driver is
/// not assigned to the route.
pub fn get_report(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    route_id: i64,
) -> Result<DailyReportInfo, ApiError> {
    let route: RouteData = load_route(persistence, route_id)?;
    AuthorizationService::require_route_access(actor, &route, "get_report")?;

    let report: DailyReportData = persistence
        .get_daily_report(route_id)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("report"),
            message: format!("Route {route_id} has no daily report"),
        })?;
    Ok(DailyReportInfo::from(&report))
}
