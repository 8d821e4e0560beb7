// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live event streaming for dispatch screens.
//!
//! Events are informational notifications about changes that already
//! happened. Clients still read the authoritative state over HTTP.
//!
//! # Architecture
//!
//! - Events are broadcast to all connected clients
//! - No commands are accepted over the WebSocket
//! - A slow client may miss events when the buffer overflows

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use fleetbook_api::{ReportResponse, RouteChangeResponse, SweepSummary};
use fleetbook_domain::{CarCheck, MovementType};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
const EVENT_BUFFER_SIZE: usize = 100;

/// Live event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A route reached `COMPLETED` through an edit or status change.
    RouteCompleted {
        route_id: i64,
        vehicle_id: Option<i64>,
        /// Kilometers credited to the vehicle. Zero when nothing was credited.
        credited_km: i64,
    },
    /// The auto-complete sweep closed at least one route.
    RoutesAutoCompleted {
        /// The fleet-local day the sweep compared against.
        today: String,
        route_ids: Vec<i64>,
        failed: usize,
    },
    /// Stock moved in or out of a spare part.
    StockMovementRecorded {
        part_id: i64,
        movement_type: MovementType,
        quantity: i64,
        /// Quantity on hand after the movement.
        balance: i64,
        is_low_stock: bool,
    },
    /// A driver filed a route's daily report.
    DailyReportSubmitted {
        route_id: i64,
        report_id: i64,
        car_check: CarCheck,
        credited_km: i64,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

impl LiveEvent {
    /// The event for a route change, if it completed the route.
    #[must_use]
    pub fn for_route_change(change: &RouteChangeResponse) -> Option<Self> {
        change.completed.then(|| Self::RouteCompleted {
            route_id: change.route.route_id,
            vehicle_id: change.route.vehicle_id,
            credited_km: change.credited_km.unwrap_or(0),
        })
    }

    /// The event for a filed daily report.
    #[must_use]
    pub fn for_report(response: &ReportResponse) -> Self {
        Self::DailyReportSubmitted {
            route_id: response.route.route_id,
            report_id: response.report.report_id,
            car_check: response.report.car_check,
            credited_km: response.credited_km.unwrap_or(0),
        }
    }

    /// The event for a sweep, if it closed anything.
    #[must_use]
    pub fn for_sweep(summary: &SweepSummary) -> Option<Self> {
        (!summary.completed.is_empty()).then(|| Self::RoutesAutoCompleted {
            today: summary.today.clone(),
            route_ids: summary.completed.iter().map(|r| r.route_id).collect(),
            failed: summary.failures.len(),
        })
    }
}

/// Broadcaster for live events.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a new event broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected clients.
    ///
    /// If no clients are connected, the event is dropped.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                debug!(?event, "No receivers for live event");
            }
        }
    }

    /// Broadcasts an event if there is one.
    pub fn broadcast_opt(&self, event: Option<LiveEvent>) {
        if let Some(event) = event {
            self.broadcast(&event);
        }
    }

    /// Subscribes to events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles WebSocket upgrade requests for live event streaming.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

/// Sends a connection confirmation, then streams events until the client
/// disconnects or an error occurs.
async fn handle_socket(socket: WebSocket, broadcaster: Arc<LiveEventBroadcaster>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    let connected_event = LiveEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(?e, "Failed to serialize live event");
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live client lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live event stream");
}
