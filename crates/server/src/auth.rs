//! Sessions and password hashing.
//!
//! A session is a signed cookie, `sessionToken=<user_id>.<expiry>.<signature>`,
//! where the signature is a hex HMAC-SHA256 over `<user_id>.<expiry>`.
//! Nothing is kept server side; logout clears the cookie.

use std::time::Duration;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use types::{DocumentId, ErrorCode, User};

use crate::error::{AppError, AppResult};
use crate::service::blocking;
use crate::state::ServerState;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionToken";

/// Longest accepted session lifetime. Longer ttls are capped to this.
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

// =============================================================================
// Signed tokens
// =============================================================================

/// Secret and lifetime for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Vec<u8>,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl: ttl.min(MAX_SESSION_TTL),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sign(&self, payload: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(payload.as_bytes());
        Some(mac)
    }

    /// Issue a token for `user_id` expiring after the configured ttl.
    pub fn issue(&self, user_id: &DocumentId) -> AppResult<String> {
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| AppError::Internal("session ttl out of range".into()))?;
        let expires = Utc::now()
            .timestamp()
            .checked_add(ttl)
            .ok_or_else(|| AppError::Internal("session expiry out of range".into()))?;
        let payload = format!("{user_id}.{expires}");
        let mac = self
            .sign(&payload)
            .ok_or_else(|| AppError::Internal("invalid session secret".into()))?;
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    /// The user id inside a token, if the signature holds and it has not expired.
    pub fn verify(&self, token: &str) -> Option<DocumentId> {
        let (payload, signature) = token.rsplit_once('.')?;
        let expected = hex::decode(signature).ok()?;
        self.sign(payload)?.verify_slice(&expected).ok()?;

        let (user_id, expires) = payload.split_once('.')?;
        let expires: i64 = expires.parse().ok()?;
        if expires <= Utc::now().timestamp() {
            debug!("expired session token");
            return None;
        }
        DocumentId::parse(user_id).ok()
    }
}

// =============================================================================
// Passwords
// =============================================================================

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(format!("salt: {e}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hash: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

// =============================================================================
// Cookies
// =============================================================================

/// Value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn session_cookie(token: &str, ttl: Duration) -> AppResult<HeaderValue> {
    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    );
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("sessionToken=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

// =============================================================================
// Extractors
// =============================================================================

/// The signed-in user. Rejects with 401 when there is no valid session.
pub struct CurrentUser(pub User);

/// The signed-in user, if any.
pub struct MaybeUser(pub Option<User>);

async fn session_user(parts: &Parts, state: &ServerState) -> AppResult<Option<User>> {
    let Some(user_id) = read_cookie(&parts.headers, SESSION_COOKIE)
        .and_then(|token| state.sessions.verify(token))
    else {
        return Ok(None);
    };
    blocking(&state.store, move |s| s.get_user(&user_id)).await
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| AppError::code(ErrorCode::Unauthorized))
    }
}

impl FromRequestParts<ServerState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state).await?))
    }
}
