// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route, order and daily report queries.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{CarCheck, RouteStatus, format_day};
use std::collections::HashMap;
use tracing::debug;

use crate::data_models::{DailyReportData, OrderData, RouteData, RouteFilter};
use crate::diesel_schema::{daily_reports, orders, routes};
use crate::error::PersistenceError;
use crate::queries::{parse_stored, parse_stored_day};

/// Diesel Queryable struct for route rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = routes)]
struct RouteRow {
    route_id: i64,
    name: String,
    route_date: String,
    driver_id: Option<i64>,
    vehicle_id: Option<i64>,
    planned_km: Option<i64>,
    actual_km: Option<i64>,
    fuel_cost_cents: Option<i64>,
    status: String,
    note: Option<String>,
    completed_at: Option<String>,
    created_at: String,
}

impl RouteRow {
    fn into_data(self, orders: Vec<OrderData>) -> Result<RouteData, PersistenceError> {
        Ok(RouteData {
            route_id: self.route_id,
            name: self.name,
            route_date: parse_stored_day("routes.route_date", &self.route_date)?,
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
            planned_km: self.planned_km,
            actual_km: self.actual_km,
            fuel_cost_cents: self.fuel_cost_cents,
            status: parse_stored::<RouteStatus>("routes.status", &self.status)?,
            note: self.note,
            completed_at: self.completed_at,
            created_at: self.created_at,
            orders,
        })
    }
}

/// Diesel Queryable struct for order rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = orders)]
struct OrderRow {
    order_id: i64,
    route_id: i64,
    position: i32,
    customer: String,
    address: String,
    note: Option<String>,
}

impl From<OrderRow> for OrderData {
    fn from(row: OrderRow) -> Self {
        Self {
            order_id: row.order_id,
            route_id: row.route_id,
            position: row.position,
            customer: row.customer,
            address: row.address,
            note: row.note,
        }
    }
}

/// Diesel Queryable struct for daily report rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = daily_reports)]
struct DailyReportRow {
    report_id: i64,
    route_id: i64,
    driver_id: Option<i64>,
    actual_km: Option<i64>,
    fuel_cost_cents: Option<i64>,
    car_check: String,
    note: Option<String>,
    created_at: String,
}

/// Lists a route's orders in stop order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_orders(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<Vec<OrderData>, PersistenceError> {
    Ok(orders::table
        .filter(orders::route_id.eq(route_id))
        .select(OrderRow::as_select())
        .order_by((orders::position.asc(), orders::order_id.asc()))
        .load::<OrderRow>(conn)?
        .into_iter()
        .map(OrderData::from)
        .collect())
}

/// Retrieves a route with its orders.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if the route is not found.
pub fn get_route(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<Option<RouteData>, PersistenceError> {
    debug!(route_id, "Looking up route");

    let Some(row) = routes::table
        .find(route_id)
        .select(RouteRow::as_select())
        .first::<RouteRow>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let route_orders: Vec<OrderData> = list_orders(conn, route_id)?;
    row.into_data(route_orders).map(Some)
}

/// Retrieves a route that must exist.
///
/// # Errors
///
/// Returns `EntityNotFound` if there is no such route.
pub fn require_route(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<RouteData, PersistenceError> {
    get_route(conn, route_id)?.ok_or(PersistenceError::EntityNotFound {
        entity: "route",
        id: route_id,
    })
}

/// Lists routes matching a filter, ordered by date then ID.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn list_routes(
    conn: &mut SqliteConnection,
    filter: &RouteFilter,
) -> Result<Vec<RouteData>, PersistenceError> {
    let mut query = routes::table.select(RouteRow::as_select()).into_boxed();
    if let Some(from) = filter.from {
        query = query.filter(routes::route_date.ge(format_day(from)));
    }
    if let Some(to) = filter.to {
        query = query.filter(routes::route_date.le(format_day(to)));
    }
    if let Some(driver_id) = filter.driver_id {
        query = query.filter(routes::driver_id.eq(driver_id));
    }
    if let Some(vehicle_id) = filter.vehicle_id {
        query = query.filter(routes::vehicle_id.eq(vehicle_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(routes::status.eq(status.as_str()));
    }

    let rows: Vec<RouteRow> = query
        .order_by((routes::route_date.asc(), routes::route_id.asc()))
        .load::<RouteRow>(conn)?;

    let route_ids: Vec<i64> = rows.iter().map(|row| row.route_id).collect();
    let mut orders_by_route: HashMap<i64, Vec<OrderData>> = HashMap::new();
    for order in orders::table
        .filter(orders::route_id.eq_any(route_ids))
        .select(OrderRow::as_select())
        .order_by((orders::position.asc(), orders::order_id.asc()))
        .load::<OrderRow>(conn)?
    {
        orders_by_route
            .entry(order.route_id)
            .or_default()
            .push(OrderData::from(order));
    }

    rows.into_iter()
        .map(|row| {
            let route_orders: Vec<OrderData> =
                orders_by_route.remove(&row.route_id).unwrap_or_default();
            row.into_data(route_orders)
        })
        .collect()
}

/// Lists IDs of routes the auto-complete sweep should close.
///
/// A candidate is dated strictly before `today`, is not completed and has a
/// vehicle assigned.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_sweep_candidates(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(routes::table
        .filter(routes::route_date.lt(format_day(today)))
        .filter(routes::status.ne(RouteStatus::Completed.as_str()))
        .filter(routes::vehicle_id.is_not_null())
        .select(routes::route_id)
        .order_by((routes::route_date.asc(), routes::route_id.asc()))
        .load::<i64>(conn)?)
}

/// Retrieves the daily report filed for a route.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
/// Returns `Ok(None)` if no report exists.
pub fn get_daily_report(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<Option<DailyReportData>, PersistenceError> {
    let Some(row) = daily_reports::table
        .filter(daily_reports::route_id.eq(route_id))
        .select(DailyReportRow::as_select())
        .first::<DailyReportRow>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    Ok(Some(DailyReportData {
        report_id: row.report_id,
        route_id: row.route_id,
        driver_id: row.driver_id,
        actual_km: row.actual_km,
        fuel_cost_cents: row.fuel_cost_cents,
        car_check: parse_stored::<CarCheck>("daily_reports.car_check", &row.car_check)?,
        note: row.note,
        created_at: row.created_at,
    }))
}

/// Returns whether a daily report exists for a route.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn daily_report_exists(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(diesel::dsl::exists(
        daily_reports::table.filter(daily_reports::route_id.eq(route_id)),
    ))
    .get_result(conn)?)
}
