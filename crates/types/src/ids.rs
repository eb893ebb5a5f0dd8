//! Document identifiers.
//!
//! Every stored document is keyed by a 24-character lowercase hex string
//! (the same shape as a MongoDB ObjectId), so ids coming from URLs can be
//! rejected up front before any store lookup.

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Number of hex characters in a document id.
pub const DOCUMENT_ID_LEN: usize = 24;

/// Error returned when a string is not a well-formed document id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid document id: {0:?}")]
pub struct InvalidId(pub String);

/// Identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh id from 12 random bytes.
    pub fn generate() -> Self {
        let bytes = uuid::Uuid::new_v4().into_bytes();
        let hex: String = bytes[..DOCUMENT_ID_LEN / 2]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        Self(hex)
    }

    /// Parse an id, accepting upper-case hex but storing it lower-cased.
    pub fn parse(raw: &str) -> Result<Self, InvalidId> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(InvalidId(raw.to_string()))
        }
    }

    /// Check the id shape without allocating.
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == DOCUMENT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DocumentId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
