// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route, order and daily report mutations.
//!
//! Distance is credited only by `complete_in_transaction`, and only when a
//! planned status change reports that it completes the route. A route that
//! is already completed can therefore never credit its vehicle again.

use chrono::NaiveDate;
use diesel::SqliteConnection;
use diesel::prelude::*;
use fleetbook_domain::{
    DomainError, RouteStatus, StatusChange, format_day, is_sweep_candidate, km_to_credit,
    plan_status_change, validate_amount,
};
use std::collections::HashSet;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::{
    ChangeContext, DailyReportData, DistanceCredit, NewDailyReport, OrderInput, ReportOutcome,
    RouteChangeOutcome, RouteData, RouteDraft, SweepStep,
};
use crate::diesel_schema::{daily_reports, orders, routes};
use crate::error::PersistenceError;
use crate::mutations::stamp;
use crate::mutations::vehicles::credit_in_transaction;
use crate::queries::routes::{daily_report_exists, get_daily_report, get_route, require_route};
use crate::queries::users::user_exists;
use crate::queries::vehicles::vehicle_exists;

fn validate_draft(draft: &RouteDraft) -> Result<(), DomainError> {
    validate_amount("plannedKm", draft.planned_km)?;
    validate_amount("actualKm", draft.actual_km)?;
    validate_amount("fuelCost", draft.fuel_cost_cents)
}

fn check_references(
    conn: &mut SqliteConnection,
    driver_id: Option<i64>,
    vehicle_id: Option<i64>,
) -> Result<(), PersistenceError> {
    if let Some(driver_id) = driver_id
        && !user_exists(conn, driver_id)?
    {
        return Err(PersistenceError::EntityNotFound {
            entity: "user",
            id: driver_id,
        });
    }
    if let Some(vehicle_id) = vehicle_id
        && !vehicle_exists(conn, vehicle_id)?
    {
        return Err(PersistenceError::EntityNotFound {
            entity: "vehicle",
            id: vehicle_id,
        });
    }
    Ok(())
}

fn position_of(index: usize) -> Result<i32, PersistenceError> {
    i32::try_from(index + 1)
        .map_err(|_| PersistenceError::Other(format!("Too many orders on one route: {index}")))
}

/// Replaces a route's orders with `inputs`.
///
/// Entries with an `order_id` update that order, entries without one are
/// inserted, and orders not mentioned are deleted. Positions follow the
/// order of `inputs`.
fn apply_orders(
    conn: &mut SqliteConnection,
    route_id: i64,
    inputs: &[OrderInput],
) -> Result<(), PersistenceError> {
    let existing: HashSet<i64> = orders::table
        .filter(orders::route_id.eq(route_id))
        .select(orders::order_id)
        .load::<i64>(conn)?
        .into_iter()
        .collect();

    let mut kept: HashSet<i64> = HashSet::new();
    for order_id in inputs.iter().filter_map(|input| input.order_id) {
        if !existing.contains(&order_id) {
            return Err(PersistenceError::EntityNotFound {
                entity: "order",
                id: order_id,
            });
        }
        kept.insert(order_id);
    }

    let removed: Vec<i64> = existing.difference(&kept).copied().collect();
    if !removed.is_empty() {
        diesel::delete(orders::table.filter(orders::order_id.eq_any(removed))).execute(conn)?;
    }

    for (index, input) in inputs.iter().enumerate() {
        let position: i32 = position_of(index)?;
        match input.order_id {
            Some(order_id) => {
                diesel::update(orders::table.find(order_id))
                    .set((
                        orders::position.eq(position),
                        orders::customer.eq(&input.customer),
                        orders::address.eq(&input.address),
                        orders::note.eq(input.note.as_deref()),
                    ))
                    .execute(conn)?;
            }
            None => {
                diesel::insert_into(orders::table)
                    .values((
                        orders::route_id.eq(route_id),
                        orders::position.eq(position),
                        orders::customer.eq(&input.customer),
                        orders::address.eq(&input.address),
                        orders::note.eq(input.note.as_deref()),
                    ))
                    .execute(conn)?;
            }
        }
    }

    debug!(route_id, orders = inputs.len(), "Orders replaced");
    Ok(())
}

/// Stamps `completed_at` on a route and credits its distance. Must run
/// inside a transaction, and only for a change whose `completes` is set.
fn complete_in_transaction(
    conn: &mut SqliteConnection,
    route_id: i64,
    vehicle_id: Option<i64>,
    actual_km: Option<i64>,
    planned_km: Option<i64>,
    now: OffsetDateTime,
) -> Result<Option<DistanceCredit>, PersistenceError> {
    diesel::update(routes::table.find(route_id))
        .set(routes::completed_at.eq(Some(stamp(now)?)))
        .execute(conn)?;

    let Some(vehicle_id) = vehicle_id else {
        info!(route_id, "Route completed without a vehicle");
        return Ok(None);
    };
    let km: i64 = km_to_credit(actual_km, planned_km);
    let credit: Option<DistanceCredit> = credit_in_transaction(conn, vehicle_id, km)?;
    info!(route_id, vehicle_id, credited_km = km, "Route completed");
    Ok(credit)
}

/// Creates a route and its orders.
///
/// A route created directly as completed credits its vehicle like any
/// other completion.
///
/// # Errors
///
/// Returns `EntityNotFound` if the driver or vehicle does not exist or an
/// order carries an ID, or `RuleViolation` if a distance or cost is
/// negative.
pub fn create_route(
    conn: &mut SqliteConnection,
    draft: &RouteDraft,
    ctx: ChangeContext,
) -> Result<RouteChangeOutcome, PersistenceError> {
    validate_draft(draft)?;
    let created_at: String = stamp(ctx.now)?;
    let change: StatusChange = plan_status_change(
        RouteStatus::Planned,
        draft.status.unwrap_or(RouteStatus::Planned),
    )?;

    conn.immediate_transaction(|conn| {
        check_references(conn, draft.driver_id, draft.vehicle_id)?;

        diesel::insert_into(routes::table)
            .values((
                routes::name.eq(&draft.name),
                routes::route_date.eq(format_day(draft.route_date)),
                routes::driver_id.eq(draft.driver_id),
                routes::vehicle_id.eq(draft.vehicle_id),
                routes::planned_km.eq(draft.planned_km),
                routes::actual_km.eq(draft.actual_km),
                routes::fuel_cost_cents.eq(draft.fuel_cost_cents),
                routes::status.eq(change.to.as_str()),
                routes::note.eq(draft.note.as_deref()),
                routes::created_at.eq(&created_at),
            ))
            .execute(conn)?;
        let route_id: i64 = conn.get_last_insert_rowid()?;
        info!(route_id, route_date = %draft.route_date, "Route created");

        if let Some(inputs) = &draft.orders {
            apply_orders(conn, route_id, inputs)?;
        }

        let credit: Option<DistanceCredit> = if change.completes {
            complete_in_transaction(
                conn,
                route_id,
                draft.vehicle_id,
                draft.actual_km,
                draft.planned_km,
                ctx.now,
            )?
        } else {
            None
        };

        Ok(RouteChangeOutcome {
            route: require_route(conn, route_id)?,
            completed: change.completes,
            credit,
        })
    })
}

/// Overwrites a route's fields, optionally its status and orders.
///
/// # Errors
///
/// Returns `EntityNotFound` if the route, driver, vehicle or a referenced
/// order does not exist, or `RuleViolation` if the route is completed and
/// the new status is not, or an amount is negative.
pub fn update_route(
    conn: &mut SqliteConnection,
    route_id: i64,
    draft: &RouteDraft,
    ctx: ChangeContext,
) -> Result<RouteChangeOutcome, PersistenceError> {
    validate_draft(draft)?;

    conn.immediate_transaction(|conn| {
        let current: RouteData = require_route(conn, route_id)?;
        let change: StatusChange =
            plan_status_change(current.status, draft.status.unwrap_or(current.status))?;
        check_references(conn, draft.driver_id, draft.vehicle_id)?;

        diesel::update(routes::table.find(route_id))
            .set((
                routes::name.eq(&draft.name),
                routes::route_date.eq(format_day(draft.route_date)),
                routes::driver_id.eq(draft.driver_id),
                routes::vehicle_id.eq(draft.vehicle_id),
                routes::planned_km.eq(draft.planned_km),
                routes::actual_km.eq(draft.actual_km),
                routes::fuel_cost_cents.eq(draft.fuel_cost_cents),
                routes::status.eq(change.to.as_str()),
                routes::note.eq(draft.note.as_deref()),
            ))
            .execute(conn)?;

        if let Some(inputs) = &draft.orders {
            apply_orders(conn, route_id, inputs)?;
        }

        let credit: Option<DistanceCredit> = if change.completes {
            complete_in_transaction(
                conn,
                route_id,
                draft.vehicle_id,
                draft.actual_km,
                draft.planned_km,
                ctx.now,
            )?
        } else {
            None
        };

        Ok(RouteChangeOutcome {
            route: require_route(conn, route_id)?,
            completed: change.completes,
            credit,
        })
    })
}

/// Changes only the status of a route.
///
/// # Errors
///
/// Returns `EntityNotFound` if the route does not exist, or `RuleViolation`
/// if the route is completed and `status` is not.
pub fn set_route_status(
    conn: &mut SqliteConnection,
    route_id: i64,
    status: RouteStatus,
    ctx: ChangeContext,
) -> Result<RouteChangeOutcome, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let current: RouteData = require_route(conn, route_id)?;
        let change: StatusChange = plan_status_change(current.status, status)?;
        if change.is_noop() {
            debug!(route_id, status = status.as_str(), "Status unchanged");
            return Ok(RouteChangeOutcome {
                route: current,
                completed: false,
                credit: None,
            });
        }

        diesel::update(routes::table.find(route_id))
            .set(routes::status.eq(change.to.as_str()))
            .execute(conn)?;

        let credit: Option<DistanceCredit> = if change.completes {
            complete_in_transaction(
                conn,
                route_id,
                current.vehicle_id,
                current.actual_km,
                current.planned_km,
                ctx.now,
            )?
        } else {
            None
        };

        Ok(RouteChangeOutcome {
            route: require_route(conn, route_id)?,
            completed: change.completes,
            credit,
        })
    })
}

/// Deletes a route together with its orders and daily report.
///
/// # Errors
///
/// Returns `EntityNotFound` if the route does not exist.
pub fn delete_route(conn: &mut SqliteConnection, route_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(routes::table.find(route_id)).execute(conn)?;
    if rows_affected == 0 {
        return Err(PersistenceError::EntityNotFound {
            entity: "route",
            id: route_id,
        });
    }
    info!(route_id, "Route deleted");
    Ok(())
}

/// Files a driver's daily report and completes the route.
///
/// The reported distance and fuel cost are copied to the route. Filing a
/// report for a route that is already completed records the report but
/// does not credit the vehicle again.
///
/// # Errors
///
/// Returns `EntityNotFound` if the route does not exist, or
/// `RuleViolation` if a report already exists or an amount is negative.
pub fn submit_daily_report(
    conn: &mut SqliteConnection,
    report: &NewDailyReport,
    ctx: ChangeContext,
) -> Result<ReportOutcome, PersistenceError> {
    validate_amount("actualKm", report.actual_km)?;
    validate_amount("fuelCost", report.fuel_cost_cents)?;
    let created_at: String = stamp(ctx.now)?;

    conn.immediate_transaction(|conn| {
        let route: RouteData = require_route(conn, report.route_id)?;
        if daily_report_exists(conn, report.route_id)? {
            return Err(PersistenceError::RuleViolation(DomainError::DuplicateReport {
                route_id: report.route_id,
            }));
        }

        diesel::insert_into(daily_reports::table)
            .values((
                daily_reports::route_id.eq(report.route_id),
                daily_reports::driver_id.eq(Some(report.driver_id)),
                daily_reports::actual_km.eq(report.actual_km),
                daily_reports::fuel_cost_cents.eq(report.fuel_cost_cents),
                daily_reports::car_check.eq(report.car_check.as_str()),
                daily_reports::note.eq(report.note.as_deref()),
                daily_reports::created_at.eq(&created_at),
            ))
            .execute(conn)?;

        let change: StatusChange = plan_status_change(route.status, RouteStatus::Completed)?;
        let actual_km: Option<i64> = report.actual_km.or(route.actual_km);
        let fuel_cost_cents: Option<i64> = report.fuel_cost_cents.or(route.fuel_cost_cents);
        diesel::update(routes::table.find(report.route_id))
            .set((
                routes::actual_km.eq(actual_km),
                routes::fuel_cost_cents.eq(fuel_cost_cents),
                routes::status.eq(change.to.as_str()),
            ))
            .execute(conn)?;

        let credit: Option<DistanceCredit> = if change.completes {
            complete_in_transaction(
                conn,
                report.route_id,
                route.vehicle_id,
                actual_km,
                route.planned_km,
                ctx.now,
            )?
        } else {
            None
        };

        let filed: DailyReportData =
            get_daily_report(conn, report.route_id)?.ok_or(PersistenceError::EntityNotFound {
                entity: "daily report",
                id: report.route_id,
            })?;
        info!(
            route_id = report.route_id,
            driver_id = report.driver_id,
            car_check = report.car_check.as_str(),
            "Daily report filed"
        );

        Ok(ReportOutcome {
            report: filed,
            route: require_route(conn, report.route_id)?,
            credit,
        })
    })
}

/// Completes one past-dated route for the auto-complete sweep.
///
/// The route is re-read inside the transaction; a route that was deleted,
/// completed or re-dated in the meantime is skipped.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn auto_complete_route(
    conn: &mut SqliteConnection,
    route_id: i64,
    today: NaiveDate,
    now: OffsetDateTime,
) -> Result<SweepStep, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let Some(route) = get_route(conn, route_id)? else {
            warn!(route_id, "Sweep candidate vanished");
            return Ok(SweepStep::Skipped);
        };
        if !is_sweep_candidate(
            route.route_date,
            route.status,
            route.vehicle_id.is_some(),
            today,
        ) {
            debug!(route_id, "Route no longer qualifies for auto-complete");
            return Ok(SweepStep::Skipped);
        }

        let change: StatusChange = plan_status_change(route.status, RouteStatus::Completed)?;
        diesel::update(routes::table.find(route_id))
            .set(routes::status.eq(change.to.as_str()))
            .execute(conn)?;

        let credit: Option<DistanceCredit> = complete_in_transaction(
            conn,
            route_id,
            route.vehicle_id,
            route.actual_km,
            route.planned_km,
            now,
        )?;
        Ok(SweepStep::Completed(credit))
    })
}
