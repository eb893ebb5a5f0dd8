//! Route handlers for the server.
//!
//! # Modules
//!
//! - [`health`]: Health and readiness endpoints
//! - [`products`]: `/api/products` CRUD
//! - [`carts`]: `/api/carts` lines and checkout
//! - [`sessions`]: register, login, current user, logout
//! - [`views`]: server-rendered HTML pages
//! - [`ws`]: WebSocket product stream and chat
//! - [`mocks`]: generated sample products
//! - [`logger`]: log level smoke test

pub mod carts;
pub mod health;
pub mod logger;
pub mod mocks;
pub mod products;
pub mod sessions;
pub mod views;
pub mod ws;

use axum::Json;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use serde_json::json;
use types::{DocumentId, ErrorCode};

use crate::error::{AppError, AppResult};

/// Parse a path id, failing with `code` when it is not a document id.
pub(crate) fn parse_id(raw: &str, code: ErrorCode) -> AppResult<DocumentId> {
    DocumentId::parse(raw).map_err(|_| AppError::code(code))
}

/// Decode a JSON body, reporting malformed input as a 400.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

/// Fallback for unknown routes: `404 {"message": "Page not found"}`
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Page not found" })))
}
