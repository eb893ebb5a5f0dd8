//! User accounts and chat messages.

use chrono::Utc;
use types::{Cart, ChatMessage, DocumentId, Role, User};

use crate::document::{self, Collection};
use crate::error::{StoreError, StoreResult, is_unique_violation};
use crate::store::Store;

/// Everything needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<u32>,
    pub password_hash: String,
    pub role: Role,
}

impl Store {
    /// Create a user together with their cart.
    pub fn create_user(&self, draft: UserDraft) -> StoreResult<User> {
        let email = types::user::normalize_email(&draft.email);
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let cart = Cart::new(DocumentId::generate());
        document::insert(&tx, Collection::Carts, &cart.id, &cart)?;

        let user = User {
            id: DocumentId::generate(),
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email,
            age: draft.age,
            password_hash: draft.password_hash,
            role: draft.role,
            cart: cart.id,
        };

        match document::insert(&tx, Collection::Users, &user.id, &user) {
            Ok(()) => {}
            Err(StoreError::Sqlite(e)) if is_unique_violation(&e) => {
                return Err(StoreError::DuplicateEmail(user.email));
            }
            Err(e) => return Err(e),
        }

        tx.commit()?;
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = types::user::normalize_email(email);
        document::find_by_field(&self.conn.lock(), Collection::Users, "email", &email)
    }

    pub fn get_user(&self, id: &DocumentId) -> StoreResult<Option<User>> {
        document::get(&self.conn.lock(), Collection::Users, id)
    }

    pub fn add_message(&self, user: &str, message: &str) -> StoreResult<ChatMessage> {
        let msg = ChatMessage {
            id: DocumentId::generate(),
            user: user.to_string(),
            message: message.to_string(),
            sent_at: Utc::now(),
        };
        document::insert(&self.conn.lock(), Collection::Messages, &msg.id, &msg)?;
        Ok(msg)
    }

    /// The most recent `limit` messages, oldest first.
    pub fn list_messages(&self, limit: usize) -> StoreResult<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = document::all(&self.conn.lock(), Collection::Messages)?;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }
}
