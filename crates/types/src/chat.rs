//! Chat messages exchanged over `/ws/chat`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub user: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// What a client sends to post a message.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub user: String,
    pub message: String,
}

impl IncomingMessage {
    /// Trimmed `(user, message)` if both are usable.
    pub fn sanitized(&self) -> Option<(String, String)> {
        let user = self.user.trim();
        let message = self.message.trim();
        if user.is_empty() || message.is_empty() || message.chars().count() > MAX_MESSAGE_LEN {
            return None;
        }
        Some((user.to_string(), message.to_string()))
    }
}
