//! Unified error handling for the server.
//!
//! Provides a single error type that maps to HTTP responses.
//!
//! # Response bodies
//!
//! - Coded errors: `{"name": "PRODUCT_NOT_FOUND", "code": 404, "message": "..."}`
//! - Payload validation: `{"error": "..."}` (400)

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storage::StoreError;
use tracing::error;
use types::{ErrorCode, QueryError, ValidationError};

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Named error code with a client-facing message.
    #[error("{message}")]
    Coded { code: ErrorCode, message: String },

    /// Rejected request payload (400, `{"error": ...}` body).
    #[error("{0}")]
    Validation(String),

    /// Internal server error (500). The detail is logged, not returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Error with the code's default message.
    pub fn code(code: ErrorCode) -> Self {
        Self::Coded {
            code,
            message: code.message().to_string(),
        }
    }

    /// Error with a specific message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Coded {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Coded { code, .. } => {
                StatusCode::from_u16(code.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Coded { code, message } => json!({
                "name": code.name(),
                "code": status.as_u16(),
                "message": message,
            }),
            AppError::Validation(message) => json!({ "error": message }),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                let code = ErrorCode::InternalServerError;
                json!({
                    "name": code.name(),
                    "code": status.as_u16(),
                    "message": code.message(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::DuplicateCode(code) => AppError::with_message(
                ErrorCode::DuplicateProductCode,
                format!("Product with code '{code}' already exists"),
            ),
            StoreError::DuplicateEmail(_) => AppError::code(ErrorCode::UserAlreadyExists),
            StoreError::ProductNotFound(_) => AppError::code(ErrorCode::ProductNotFound),
            StoreError::CartNotFound(_) => AppError::code(ErrorCode::CartNotFound),
            StoreError::ProductNotInCart(_) => AppError::code(ErrorCode::ProductNotInCart),
            StoreError::Sqlite(_) | StoreError::Encoding(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::with_message(ErrorCode::InvalidQuery, err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
