// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background timer for the auto-complete sweep.

use std::time::Duration;

use fleetbook_api::{SweepCaller, SweepSummary, auto_complete_routes};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::live::LiveEvent;
use crate::{AppState, HttpError};

/// Runs one sweep against the fleet-local day and announces the result.
///
/// # Errors
///
/// Returns an error if a user caller is not a dispatcher, the clock cannot
/// be read in the fleet time zone, or the candidate query fails.
pub async fn run_sweep(
    state: &AppState,
    caller: SweepCaller<'_>,
) -> Result<SweepSummary, HttpError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let today = state.config.today(now)?;

    let mut persistence = state.persistence.lock().await;
    let summary: SweepSummary = auto_complete_routes(&mut persistence, caller, today, now)?;
    drop(persistence);

    let event: Option<LiveEvent> = LiveEvent::for_sweep(&summary);
    state.live_events.broadcast_opt(event);
    Ok(summary)
}

/// Starts the periodic sweep. The first run happens immediately so routes
/// left open while the server was down are closed at start-up.
///
/// Returns `None` when `interval_secs` is zero.
pub fn spawn(state: AppState, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        info!("Auto-complete timer disabled");
        return None;
    }

    info!(interval_secs, "Starting auto-complete timer");
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = run_sweep(&state, SweepCaller::Scheduler).await {
                error!(error = %err.message, "Scheduled auto-complete sweep failed");
            }
        }
    }))
}
