//! Health check endpoints.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness probe (always 200 if server is up)
//! - `GET /health/ready` - Readiness probe (503 when the store does not answer)

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::service::run_blocking;
use crate::state::ServerState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: &'static str,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Active WebSocket connections.
    pub ws_connections: u64,
    /// Chat messages accepted since start.
    pub chat_messages: u64,
    /// Sequence number of the last product broadcast.
    pub broadcast_seq: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub reason: &'static str,
}

/// Liveness probe: `GET /health`
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let metrics = &state.metrics;

    Json(HealthResponse {
        status: "healthy",
        uptime_secs: state.uptime_secs(),
        ws_connections: metrics.ws_count(),
        chat_messages: metrics.chat_count(),
        broadcast_seq: state.broadcaster.current_seq(),
    })
}

/// Readiness probe: `GET /health/ready`
pub async fn ready(State(state): State<ServerState>) -> (StatusCode, Json<ReadyResponse>) {
    let store_ok = run_blocking(&state.store, |s| s.ping()).await.unwrap_or(false);

    if store_ok {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                reason: "store reachable",
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                reason: "store unavailable",
            }),
        )
    }
}
