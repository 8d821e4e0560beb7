// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The auto-complete sweep.
//!
//! Routes dated before the fleet-local `today` that are still open and
//! have a vehicle are completed one by one. Each route is closed in its own
//! transaction, so a failure on one route does not stop the others.

use chrono::NaiveDate;
use fleetbook_domain::format_day;
use fleetbook_persistence::{SqlitePersistence, SweepStep};
use time::OffsetDateTime;
use tracing::{debug, error, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{SweepFailure, SweepSummary, SweptRoute};

/// Who triggered a sweep.
#[derive(Debug, Clone, Copy)]
pub enum SweepCaller<'a> {
    /// A logged-in user. Must be a dispatcher.
    Actor(&'a AuthenticatedActor),
    /// The background timer or an external scheduler holding the shared
    /// secret.
    Scheduler,
}

/// Completes every stale open route.
///
/// # Errors
///
/// Returns an error if a user caller is not a dispatcher or the candidate
/// query fails. Failures on individual routes are reported in the summary.
pub fn auto_complete_routes(
    persistence: &mut SqlitePersistence,
    caller: SweepCaller<'_>,
    today: NaiveDate,
    now: OffsetDateTime,
) -> Result<SweepSummary, ApiError> {
    if let SweepCaller::Actor(actor) = caller {
        AuthorizationService::require_dispatcher(actor, "auto_complete_routes")?;
    }

    let candidates: Vec<i64> = persistence.list_sweep_candidates(today)?;
    let mut completed: Vec<SweptRoute> = Vec::new();
    let mut skipped: usize = 0;
    let mut failures: Vec<SweepFailure> = Vec::new();

    for route_id in &candidates {
        match persistence.auto_complete_route(*route_id, today, now) {
            Ok(SweepStep::Completed(credit)) => {
                debug!(route_id, ?credit, "Route auto-completed");
                completed.push(SweptRoute {
                    route_id: *route_id,
                    vehicle_id: credit.map(|c| c.vehicle_id),
                    credited_km: credit.map_or(0, |c| c.km),
                });
            }
            Ok(SweepStep::Skipped) => skipped += 1,
            Err(err) => {
                error!(route_id, error = %err, "Failed to auto-complete route");
                failures.push(SweepFailure {
                    route_id: *route_id,
                    message: ApiError::from(err).to_string(),
                });
            }
        }
    }

    info!(
        today = %today,
        candidates = candidates.len(),
        completed = completed.len(),
        skipped,
        failed = failures.len(),
        "Auto-complete sweep finished"
    );

    Ok(SweepSummary {
        today: format_day(today),
        candidates: candidates.len(),
        completed,
        skipped,
        failures,
    })
}
