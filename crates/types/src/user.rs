//! Users and session payloads.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[display("user")]
    User,
    #[display("admin")]
    Admin,
}

/// A stored user. Carries the password hash; never serialise it to clients,
/// use [`PublicUser`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub first_name: String,
    pub last_name: String,
    /// Unique, stored lower-cased.
    pub email: String,
    pub age: Option<u32>,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    /// The cart created alongside the user.
    pub cart: DocumentId,
}

/// User fields safe to return over the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub role: Role,
    pub cart: DocumentId,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            age: user.age,
            role: user.role,
            cart: user.cart.clone(),
        }
    }
}

/// `POST /api/sessions/register` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub password: String,
}

impl RegisterRequest {
    pub fn check(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required".into());
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err("A valid email is required".into());
        }
        if self.password.len() < 6 {
            return Err("Password must be at least 6 characters".into());
        }
        Ok(())
    }
}

/// `POST /api/sessions/login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Normalise an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
