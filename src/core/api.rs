//! HTTP + WebSocket API for the dimension clock
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /status - Latest status report
//! - POST /input - Enqueue a front-panel event
//! - POST /recalibrate - Enqueue an OK press
//! - WS /ws - Live reports out, key commands in
//!
//! The API never touches the session. Reads come from the `LiveHub` the
//! tick loop publishes into; writes go through the bounded input queue.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::core::keys::parse_command;
use crate::core::sink::ReportSink;
use crate::error::{ClockError, ClockResult};
use crate::types::{InputEvent, InputKey, StatusReport};

/// Reports buffered per WebSocket subscriber before it starts lagging
const LIVE_CHANNEL_SIZE: usize = 64;

/// Fan-out point between the tick loop and API clients
#[derive(Clone)]
pub struct LiveHub {
    latest: Arc<watch::Sender<Option<StatusReport>>>,
    live: broadcast::Sender<StatusReport>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveHub {
    /// Create an empty hub
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        let (live, _) = broadcast::channel(LIVE_CHANNEL_SIZE);
        Self { latest: Arc::new(latest), live }
    }

    /// Most recent report, if any tick has run
    pub fn latest(&self) -> Option<StatusReport> {
        self.latest.borrow().clone()
    }

    /// Subscribe to every future report
    pub fn subscribe(&self) -> broadcast::Receiver<StatusReport> {
        self.live.subscribe()
    }

    /// Live WebSocket subscribers
    pub fn subscriber_count(&self) -> usize {
        self.live.receiver_count()
    }
}

impl ReportSink for LiveHub {
    fn publish(&mut self, report: &StatusReport) {
        self.latest.send_replace(Some(report.clone()));
        // No subscribers is not an error
        let _ = self.live.send(report.clone());
    }
}

/// App state
pub struct AppState {
    pub hub: LiveHub,
    pub input: mpsc::Sender<InputEvent>,
    pub started: Instant,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_ms: u64,
    pub calibrated: bool,
    pub subscribers: usize,
}

/// Input accepted response
#[derive(Debug, Serialize, Deserialize)]
pub struct InputResponse {
    pub accepted: bool,
    pub key: InputKey,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message.to_string() }))
}

/// Create the API router
pub fn create_router(hub: LiveHub, input: mpsc::Sender<InputEvent>) -> Router {
    let state = Arc::new(AppState {
        hub,
        input,
        started: Instant::now(),
    });

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/input", post(post_input))
        .route("/recalibrate", post(recalibrate))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        uptime_ms: state.started.elapsed().as_millis() as u64,
        calibrated: state.hub.latest().is_some_and(|r| r.is_calibrated()),
        subscribers: state.hub.subscriber_count(),
    })
}

/// Latest report
async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusReport>, (StatusCode, Json<ErrorResponse>)> {
    state
        .hub
        .latest()
        .map(Json)
        .ok_or_else(|| error(StatusCode::SERVICE_UNAVAILABLE, "no sample taken yet"))
}

fn enqueue(
    state: &AppState,
    event: InputEvent,
) -> Result<(StatusCode, Json<InputResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.input.try_send(event) {
        Ok(()) => {
            debug!(key = %event.key, "input queued");
            Ok((StatusCode::ACCEPTED, Json(InputResponse { accepted: true, key: event.key })))
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(key = %event.key, "input queue full, event dropped");
            Err(error(StatusCode::TOO_MANY_REQUESTS, "input queue full"))
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            Err(error(StatusCode::SERVICE_UNAVAILABLE, "clock stopped"))
        }
    }
}

/// Enqueue a front-panel event
async fn post_input(
    State(state): State<Arc<AppState>>,
    Json(event): Json<InputEvent>,
) -> Result<(StatusCode, Json<InputResponse>), (StatusCode, Json<ErrorResponse>)> {
    enqueue(&state, event)
}

/// Enqueue an OK press
async fn recalibrate(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<InputResponse>), (StatusCode, Json<ErrorResponse>)> {
    enqueue(&state, InputEvent::press(InputKey::Ok))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.hub.subscribe();
    let input = state.input.clone();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx, input))
}

/// JSON event or a keypad command line
fn parse_ws_command(text: &str) -> Option<InputEvent> {
    serde_json::from_str::<InputEvent>(text)
        .ok()
        .or_else(|| parse_command(text))
}

/// Handle WebSocket connection
async fn handle_websocket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<StatusReport>,
    input: mpsc::Sender<InputEvent>,
) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(report) => {
                    let json = match serde_json::to_string(&report) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!(error = %e, "report serialization failed");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match parse_ws_command(&text) {
                    Some(event) => {
                        if input.try_send(event).is_err() {
                            warn!(key = %event.key, "input queue unavailable, event dropped");
                        }
                    }
                    None => debug!(text = %text, "ignoring websocket message"),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Run the API server
pub async fn run_server(addr: &str, hub: LiveHub, input: mpsc::Sender<InputEvent>) -> ClockResult<()> {
    let router = create_router(hub, input);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ClockError::Server(format!("bind {}: {}", addr, e)))?;
    info!(addr, "API listening");
    axum::serve(listener, router)
        .await
        .map_err(|e| ClockError::Server(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
