//! Session endpoints.
//!
//! # Endpoints
//!
//! - `POST /api/sessions/register` - Create an account (and its cart)
//! - `POST /api/sessions/login` - Verify credentials, set `sessionToken`
//! - `GET /api/sessions/current` - The signed-in user
//! - `POST /api/sessions/logout` - Clear the session cookie

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storage::UserDraft;
use tracing::{info, warn};
use types::{ErrorCode, LoginRequest, PublicUser, RegisterRequest};

use super::parse_json;
use crate::auth::{self, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::service::blocking;
use crate::state::ServerState;

/// `{"status": "success", "payload": user}`
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: &'static str,
    pub payload: PublicUser,
}

impl UserResponse {
    fn new(user: PublicUser) -> Self {
        Self {
            status: "success",
            payload: user,
        }
    }
}

/// Run password hashing off the async workers.
async fn cpu<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {e}")))
}

/// Register: `POST /api/sessions/register`
pub async fn register(State(state): State<ServerState>, body: Bytes) -> AppResult<Response> {
    let request: RegisterRequest = parse_json(&body)?;
    request.check().map_err(AppError::Validation)?;

    let password = request.password.clone();
    let password_hash = cpu(move || auth::hash_password(&password)).await??;

    let draft = UserDraft {
        first_name: request.first_name,
        last_name: request.last_name,
        role: state.role_for(&request.email),
        email: request.email,
        age: request.age,
        password_hash,
    };
    let user = blocking(&state.store, move |s| s.create_user(draft)).await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::new(PublicUser::from(&user)))).into_response())
}

/// Log in: `POST /api/sessions/login`
pub async fn login(State(state): State<ServerState>, body: Bytes) -> AppResult<Response> {
    let LoginRequest { email, password } = parse_json(&body)?;

    let user = blocking(&state.store, move |s| s.find_user_by_email(&email)).await?;
    let Some(user) = user else {
        return Err(AppError::code(ErrorCode::InvalidCredentials));
    };

    let hash = user.password_hash.clone();
    if !cpu(move || auth::verify_password(&password, &hash)).await? {
        warn!(user_id = %user.id, "failed login");
        return Err(AppError::code(ErrorCode::InvalidCredentials));
    }

    let token = state.sessions.issue(&user.id)?;
    let cookie = auth::session_cookie(&token, state.sessions.ttl())?;

    info!(user_id = %user.id, "user logged in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(UserResponse::new(PublicUser::from(&user))),
    )
        .into_response())
}

/// Current user: `GET /api/sessions/current`
pub async fn current(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::new(PublicUser::from(&user)))
}

/// Log out: `POST /api/sessions/logout`
pub async fn logout() -> Response {
    (
        [(SET_COOKIE, auth::clear_session_cookie())],
        Json(serde_json::json!({ "status": "success", "message": "Logged out" })),
    )
        .into_response()
}
