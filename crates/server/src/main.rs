// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;
mod sweeper;


use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::Parser;
use fleetbook_api::handlers::{
    auth, availability, inventory, ratings, routes, users, vehicles,
};
use fleetbook_api::{
    AddKmRequest, ApiError, AvailabilityQuery, CreateUserRequest, DailyReportInfo,
    DailyReportRequest, DriverReviewsResponse, ListAvailabilityResponse, ListRepairsResponse,
    ListRoutesResponse, ListSparePartsResponse, ListUsersQuery, ListUsersResponse,
    ListVehiclesResponse, LoginRequest, LoginResponse, MaintenanceResponse, MovementRequest,
    MovementResponse, RepairInfo, RepairRequest, ReportResponse, ResetCounterRequest,
    ResetRatingsResponse, ReviewRequest, ReviewResponse, RouteChangeResponse, RouteInfo,
    RouteQuery, RouteRequest, SetAvailabilityRequest, SetAvailabilityResponse, SetDateRequest,
    SetLimitsRequest, SparePartDetailResponse, SparePartInfo, SparePartRequest, StatusRequest,
    SweepCaller, SweepSummary, UpdateSparePartRequest, UserInfo, VehicleInfo, VehicleRequest,
};
use fleetbook_domain::{local_day_of, parse_timezone};
use fleetbook_persistence::SqlitePersistence;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::session::{SessionUser, authenticate, bearer_token};
use crate::sweeper::run_sweep;

/// Header carrying the shared secret of an external scheduler.
const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Fleetbook Server - dispatch and vehicle-maintenance tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "FLEETBOOK_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "FLEETBOOK_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "FLEETBOOK_PORT", default_value_t = 3000)]
    port: u16,

    /// IANA time zone that decides which calendar day it is for the fleet
    #[arg(long, env = "FLEETBOOK_TIMEZONE", default_value = "Europe/Prague")]
    timezone: String,

    /// Shared secret accepted in the `X-Cron-Secret` header of
    /// `POST /routes/auto-complete`. The header is ignored when unset.
    #[arg(long, env = "FLEETBOOK_CRON_SECRET", hide_env_values = true)]
    cron_secret: Option<String>,

    /// Seconds between automatic sweeps of stale routes. 0 disables the timer.
    #[arg(long, env = "FLEETBOOK_SWEEP_INTERVAL", default_value_t = 3600)]
    sweep_interval_secs: u64,

    /// Login name of the admin created on an empty database
    #[arg(long, env = "FLEETBOOK_ADMIN_LOGIN")]
    admin_login: Option<String>,

    /// Password of the admin created on an empty database
    #[arg(long, env = "FLEETBOOK_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

/// Runtime settings the handlers need.
#[derive(Debug, Clone)]
struct FleetConfig {
    /// Decides the fleet-local calendar day.
    timezone: Tz,
    /// Accepted `X-Cron-Secret`, if any.
    cron_secret: Option<String>,
}

impl FleetConfig {
    /// The fleet-local calendar day at `now`.
    fn today(&self, now: OffsetDateTime) -> Result<NaiveDate, HttpError> {
        local_day_of(now, self.timezone).map_err(|e| HttpError::from(ApiError::from(e)))
    }
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind a Mutex; each request holds it for
/// one operation.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<SqlitePersistence>>,
    live_events: Arc<LiveEventBroadcaster>,
    config: Arc<FleetConfig>,
}

impl AppState {
    fn new(persistence: SqlitePersistence, config: FleetConfig) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            live_events: Arc::new(LiveEventBroadcaster::new()),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live_events)
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: String::from("Internal server error"),
                };
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Response of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Reads the clock once per request.
fn clock(state: &AppState) -> Result<(OffsetDateTime, NaiveDate), HttpError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    Ok((now, state.config.today(now)?))
}

// ============================================================================
// Health & auth
// ============================================================================

/// Handler for GET `/health`. Touches the database so a broken connection
/// shows up as a 500.
async fn handle_health(
    AxumState(state): AxumState<AppState>,
) -> Result<Json<HealthResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    persistence.count_users().map_err(ApiError::from)?;
    drop(persistence);

    Ok(Json(HealthResponse {
        status: String::from("ok"),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let response: LoginResponse = auth::login(&mut persistence, &req, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    headers: HeaderMap,
) -> Result<StatusCode, HttpError> {
    let token: &str = bearer_token(&headers)?;
    let mut persistence = state.persistence.lock().await;
    auth::logout(&mut persistence, token)?;
    info!(user_id = actor.id, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/auth/whoami`.
async fn handle_whoami(SessionUser(actor, user): SessionUser) -> Json<UserInfo> {
    Json(auth::whoami(&actor, &user))
}

// ============================================================================
// Users
// ============================================================================

async fn handle_list_users(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(users::list_users(&mut persistence, &actor, &query)?))
}

async fn handle_create_user(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let user: UserInfo =
        users::create_user(&mut persistence, &actor, &req, OffsetDateTime::now_utc())?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn handle_disable_user(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let user: UserInfo =
        users::disable_user(&mut persistence, &actor, user_id, OffsetDateTime::now_utc())?;
    Ok(Json(user))
}

// ============================================================================
// Vehicles & repairs
// ============================================================================

async fn handle_list_vehicles(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<ListVehiclesResponse>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::list_vehicles(
        &mut persistence,
        &actor,
        today,
    )?))
}

async fn handle_create_vehicle(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<VehicleRequest>,
) -> Result<(StatusCode, Json<VehicleInfo>), HttpError> {
    let (now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    let vehicle: VehicleInfo =
        vehicles::create_vehicle(&mut persistence, &actor, &req, now, today)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn handle_get_vehicle(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<VehicleInfo>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::get_vehicle(
        &mut persistence,
        &actor,
        vehicle_id,
        today,
    )?))
}

async fn handle_update_vehicle(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<VehicleRequest>,
) -> Result<Json<VehicleInfo>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::update_vehicle(
        &mut persistence,
        &actor,
        vehicle_id,
        &req,
        today,
    )?))
}

async fn handle_delete_vehicle(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = state.persistence.lock().await;
    vehicles::delete_vehicle(&mut persistence, &actor, vehicle_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_get_maintenance(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<MaintenanceResponse>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::get_maintenance(
        &mut persistence,
        &actor,
        vehicle_id,
        today,
    )?))
}

async fn handle_add_km(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<AddKmRequest>,
) -> Result<Json<MaintenanceResponse>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::add_km(
        &mut persistence,
        &actor,
        vehicle_id,
        &req,
        today,
    )?))
}

async fn handle_reset_counter(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<ResetCounterRequest>,
) -> Result<Json<MaintenanceResponse>, HttpError> {
    let (now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::reset_counter(
        &mut persistence,
        &actor,
        vehicle_id,
        &req,
        now,
        today,
    )?))
}

async fn handle_set_maintenance_date(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<SetDateRequest>,
) -> Result<Json<MaintenanceResponse>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::set_maintenance_date(
        &mut persistence,
        &actor,
        vehicle_id,
        &req,
        today,
    )?))
}

async fn handle_set_limits(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<SetLimitsRequest>,
) -> Result<Json<MaintenanceResponse>, HttpError> {
    let (_now, today) = clock(&state)?;
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::set_limits(
        &mut persistence,
        &actor,
        vehicle_id,
        &req,
        today,
    )?))
}

async fn handle_list_repairs(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<ListRepairsResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(vehicles::list_repairs(
        &mut persistence,
        &actor,
        vehicle_id,
    )?))
}

async fn handle_create_repair(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(vehicle_id): Path<i64>,
    Json(req): Json<RepairRequest>,
) -> Result<(StatusCode, Json<RepairInfo>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let repair: RepairInfo = vehicles::create_repair(
        &mut persistence,
        &actor,
        vehicle_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok((StatusCode::CREATED, Json(repair)))
}

async fn handle_delete_repair(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(repair_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = state.persistence.lock().await;
    vehicles::delete_repair(&mut persistence, &actor, repair_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Routes & reports
// ============================================================================

async fn handle_list_routes(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<RouteQuery>,
) -> Result<Json<ListRoutesResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let listing: ListRoutesResponse = routes::list_routes(&mut persistence, &actor, &query)?;
    Ok(Json(listing))
}

async fn handle_create_route(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<RouteRequest>,
) -> Result<(StatusCode, Json<RouteChangeResponse>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let change: RouteChangeResponse =
        routes::create_route(&mut persistence, &actor, &req, OffsetDateTime::now_utc())?;
    drop(persistence);

    state
        .live_events
        .broadcast_opt(LiveEvent::for_route_change(&change));
    Ok((StatusCode::CREATED, Json(change)))
}

async fn handle_get_route(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(route_id): Path<i64>,
) -> Result<Json<RouteInfo>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let route: RouteInfo = routes::get_route(&mut persistence, &actor, route_id)?;
    Ok(Json(route))
}

async fn handle_update_route(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(route_id): Path<i64>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteChangeResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let change: RouteChangeResponse = routes::update_route(
        &mut persistence,
        &actor,
        route_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    state
        .live_events
        .broadcast_opt(LiveEvent::for_route_change(&change));
    Ok(Json(change))
}

async fn handle_set_route_status(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(route_id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<RouteChangeResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let change: RouteChangeResponse = routes::set_route_status(
        &mut persistence,
        &actor,
        route_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    state
        .live_events
        .broadcast_opt(LiveEvent::for_route_change(&change));
    Ok(Json(change))
}

async fn handle_delete_route(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(route_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = state.persistence.lock().await;
    routes::delete_route(&mut persistence, &actor, route_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_get_report(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(route_id): Path<i64>,
) -> Result<Json<DailyReportInfo>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let report: DailyReportInfo = routes::get_report(&mut persistence, &actor, route_id)?;
    Ok(Json(report))
}

async fn handle_submit_report(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(route_id): Path<i64>,
    Json(req): Json<DailyReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let response: ReportResponse = routes::submit_report(
        &mut persistence,
        &actor,
        route_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    let event: LiveEvent = LiveEvent::for_report(&response);
    state.live_events.broadcast(&event);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/routes/auto-complete`.
///
/// Accepts either a dispatcher session or the configured `X-Cron-Secret`.
/// A presented secret that does not match is rejected without falling back
/// to the session.
async fn handle_auto_complete(
    AxumState(state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<SweepSummary>, HttpError> {
    if let Some(presented) = headers.get(CRON_SECRET_HEADER) {
        return match state.config.cron_secret.as_deref() {
            Some(secret) if presented.as_bytes() == secret.as_bytes() => {
                info!("Auto-complete triggered by scheduler");
                Ok(Json(run_sweep(&state, SweepCaller::Scheduler).await?))
            }
            _ => {
                warn!("Rejected auto-complete request with a bad cron secret");
                Err(HttpError {
                    status: StatusCode::UNAUTHORIZED,
                    message: String::from("Invalid cron secret"),
                })
            }
        };
    }

    let (actor, _user) = authenticate(&state, &headers).await?;
    Ok(Json(run_sweep(&state, SweepCaller::Actor(&actor)).await?))
}

// ============================================================================
// Spare parts
// ============================================================================

async fn handle_list_spare_parts(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<ListSparePartsResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let parts: ListSparePartsResponse = inventory::list_spare_parts(&mut persistence, &actor)?;
    Ok(Json(parts))
}

async fn handle_create_spare_part(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<SparePartRequest>,
) -> Result<(StatusCode, Json<SparePartInfo>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let part: SparePartInfo =
        inventory::create_spare_part(&mut persistence, &actor, &req, OffsetDateTime::now_utc())?;
    Ok((StatusCode::CREATED, Json(part)))
}

async fn handle_get_spare_part(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(part_id): Path<i64>,
) -> Result<Json<SparePartDetailResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(inventory::get_spare_part(
        &mut persistence,
        &actor,
        part_id,
    )?))
}

async fn handle_update_spare_part(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(part_id): Path<i64>,
    Json(req): Json<UpdateSparePartRequest>,
) -> Result<Json<SparePartInfo>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(inventory::update_spare_part(
        &mut persistence,
        &actor,
        part_id,
        &req,
    )?))
}

async fn handle_delete_spare_part(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(part_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let mut persistence = state.persistence.lock().await;
    inventory::delete_spare_part(&mut persistence, &actor, part_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_record_movement(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(part_id): Path<i64>,
    Json(req): Json<MovementRequest>,
) -> Result<(StatusCode, Json<MovementResponse>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let response: MovementResponse = inventory::record_movement(
        &mut persistence,
        &actor,
        part_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    let event: LiveEvent = LiveEvent::StockMovementRecorded {
        part_id,
        movement_type: response.movement.movement_type,
        quantity: response.movement.quantity,
        balance: response.part.quantity,
        is_low_stock: response.part.is_low_stock,
    };
    state.live_events.broadcast(&event);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_export_movements(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(part_id): Path<i64>,
) -> Result<Response, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let csv: String = inventory::export_movements_csv(&mut persistence, &actor, part_id)?;
    drop(persistence);

    let headers: [(header::HeaderName, String); 2] = [
        (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"part-{part_id}-movements.csv\""),
        ),
    ];
    Ok((headers, csv).into_response())
}

// ============================================================================
// Ratings & availability
// ============================================================================

async fn handle_list_reviews(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(driver_id): Path<i64>,
) -> Result<Json<DriverReviewsResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(ratings::list_reviews(
        &mut persistence,
        &actor,
        driver_id,
    )?))
}

async fn handle_add_review(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(driver_id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), HttpError> {
    let mut persistence = state.persistence.lock().await;
    let review: ReviewResponse = ratings::add_review(
        &mut persistence,
        &actor,
        driver_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn handle_reset_ratings(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(driver_id): Path<i64>,
) -> Result<Json<ResetRatingsResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(ratings::reset_ratings(
        &mut persistence,
        &actor,
        driver_id,
    )?))
}

async fn handle_list_availability(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ListAvailabilityResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(availability::list_availability(
        &mut persistence,
        &actor,
        &query,
    )?))
}

async fn handle_set_availability(
    AxumState(state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<SetAvailabilityRequest>,
) -> Result<Json<SetAvailabilityResponse>, HttpError> {
    let mut persistence = state.persistence.lock().await;
    Ok(Json(availability::set_availability(
        &mut persistence,
        &actor,
        &req,
        OffsetDateTime::now_utc(),
    )?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/live", get(live_events_handler))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/users", get(handle_list_users).post(handle_create_user))
        .route("/users/{user_id}/disable", post(handle_disable_user))
        .route(
            "/vehicles",
            get(handle_list_vehicles).post(handle_create_vehicle),
        )
        .route(
            "/vehicles/{vehicle_id}",
            get(handle_get_vehicle)
                .put(handle_update_vehicle)
                .delete(handle_delete_vehicle),
        )
        .route(
            "/vehicles/{vehicle_id}/maintenance",
            get(handle_get_maintenance),
        )
        .route("/vehicles/{vehicle_id}/km", post(handle_add_km))
        .route("/vehicles/{vehicle_id}/reset", post(handle_reset_counter))
        .route(
            "/vehicles/{vehicle_id}/dates",
            post(handle_set_maintenance_date),
        )
        .route("/vehicles/{vehicle_id}/limits", post(handle_set_limits))
        .route(
            "/vehicles/{vehicle_id}/repairs",
            get(handle_list_repairs).post(handle_create_repair),
        )
        .route("/repairs/{repair_id}", delete(handle_delete_repair))
        .route("/routes", get(handle_list_routes).post(handle_create_route))
        .route("/routes/auto-complete", post(handle_auto_complete))
        .route(
            "/routes/{route_id}",
            get(handle_get_route)
                .put(handle_update_route)
                .delete(handle_delete_route),
        )
        .route("/routes/{route_id}/status", post(handle_set_route_status))
        .route(
            "/routes/{route_id}/report",
            get(handle_get_report).post(handle_submit_report),
        )
        .route(
            "/spare-parts",
            get(handle_list_spare_parts).post(handle_create_spare_part),
        )
        .route(
            "/spare-parts/{part_id}",
            get(handle_get_spare_part)
                .put(handle_update_spare_part)
                .delete(handle_delete_spare_part),
        )
        .route(
            "/spare-parts/{part_id}/movements",
            post(handle_record_movement),
        )
        .route(
            "/spare-parts/{part_id}/movements.csv",
            get(handle_export_movements),
        )
        .route(
            "/drivers/{driver_id}/reviews",
            get(handle_list_reviews)
                .post(handle_add_review)
                .delete(handle_reset_ratings),
        )
        .route(
            "/availability",
            get(handle_list_availability).put(handle_set_availability),
        )
        .with_state(app_state)
}

/// Creates the first admin on an empty database.
async fn bootstrap_admin_account(
    state: &AppState,
    login_name: Option<&str>,
    password: Option<&str>,
) -> Result<(), ApiError> {
    let mut persistence = state.persistence.lock().await;
    match (login_name, password) {
        (Some(login_name), Some(password)) => {
            let created: Option<UserInfo> = users::bootstrap_admin(
                &mut persistence,
                login_name,
                password,
                OffsetDateTime::now_utc(),
            )?;
            if created.is_none() {
                info!("Users already exist; skipping admin bootstrap");
            }
        }
        (None, None) => {
            if persistence.count_users()? == 0 {
                warn!("No users exist; start with --admin-login and --admin-password");
            }
        }
        _ => warn!("Both --admin-login and --admin-password are needed to bootstrap an admin"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing fleetbook server");

    let timezone: Tz = parse_timezone(&args.timezone)?;
    info!(timezone = %timezone, "Fleet time zone");

    let persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let cron_secret: Option<String> = args
        .cron_secret
        .clone()
        .filter(|secret| !secret.trim().is_empty());
    if cron_secret.is_none() {
        info!("No cron secret configured; X-Cron-Secret is ignored");
    }

    let app_state: AppState = AppState::new(
        persistence,
        FleetConfig {
            timezone,
            cron_secret,
        },
    );

    bootstrap_admin_account(
        &app_state,
        args.admin_login.as_deref(),
        args.admin_password.as_deref(),
    )
    .await?;

    let _sweeper = sweeper::spawn(app_state.clone(), args.sweep_interval_secs);

    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
