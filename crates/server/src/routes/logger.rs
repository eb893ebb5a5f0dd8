//! Log level smoke test: `GET /loggertest`
//!
//! Emits one event per level so the active filter can be checked from the
//! outside. Which lines actually appear depends on `RUST_LOG`.

use axum::Json;
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Serialize)]
pub struct LoggerTestResponse {
    pub message: &'static str,
    pub levels: [&'static str; 5],
}

pub async fn logger_test() -> Json<LoggerTestResponse> {
    trace!(target: "loggertest", "trace level event");
    debug!(target: "loggertest", "debug level event");
    info!(target: "loggertest", "info level event");
    warn!(target: "loggertest", "warn level event");
    error!(target: "loggertest", "error level event");

    Json(LoggerTestResponse {
        message: "Logger test completed",
        levels: ["trace", "debug", "info", "warn", "error"],
    })
}
