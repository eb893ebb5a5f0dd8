//! Generic document operations over the `documents` table.
//!
//! Helpers take a `&Connection` so they work equally on a plain connection
//! and inside a `Transaction` (which derefs to one).

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use types::DocumentId;

use crate::error::StoreResult;

/// Named collections in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Products,
    Carts,
    Users,
    Tickets,
    Messages,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Carts => "carts",
            Collection::Users => "users",
            Collection::Tickets => "tickets",
            Collection::Messages => "messages",
        }
    }
}

pub(crate) fn insert<T: Serialize>(
    conn: &Connection,
    collection: Collection,
    id: &DocumentId,
    doc: &T,
) -> StoreResult<()> {
    let body = serde_json::to_string(doc)?;
    conn.execute(
        "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
        params![collection.as_str(), id.as_str(), body],
    )?;
    Ok(())
}

pub(crate) fn get<T: DeserializeOwned>(
    conn: &Connection,
    collection: Collection,
    id: &DocumentId,
) -> StoreResult<Option<T>> {
    let body: Option<String> = conn
        .prepare_cached("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")?
        .query_row(params![collection.as_str(), id.as_str()], |row| row.get(0))
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

/// Overwrite a document body in place, keeping its natural-order position.
pub(crate) fn replace<T: Serialize>(
    conn: &Connection,
    collection: Collection,
    id: &DocumentId,
    doc: &T,
) -> StoreResult<bool> {
    let body = serde_json::to_string(doc)?;
    let changed = conn.execute(
        "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
        params![collection.as_str(), id.as_str(), body],
    )?;
    Ok(changed > 0)
}

pub(crate) fn delete(conn: &Connection, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
    let changed = conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection.as_str(), id.as_str()],
    )?;
    Ok(changed > 0)
}

/// Every document in a collection, in natural order.
pub(crate) fn all<T: DeserializeOwned>(conn: &Connection, collection: Collection) -> StoreResult<Vec<T>> {
    let mut stmt =
        conn.prepare_cached("SELECT body FROM documents WHERE collection = ?1 ORDER BY seq")?;
    let bodies = stmt
        .query_map(params![collection.as_str()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    bodies
        .iter()
        .map(|body| serde_json::from_str(body).map_err(Into::into))
        .collect()
}

/// First document whose top-level `field` equals `value`.
pub(crate) fn find_by_field<T: DeserializeOwned>(
    conn: &Connection,
    collection: Collection,
    field: &str,
    value: &str,
) -> StoreResult<Option<T>> {
    let path = format!("$.{field}");
    let body: Option<String> = conn
        .prepare_cached(
            "SELECT body FROM documents
             WHERE collection = ?1 AND json_extract(body, ?2) = ?3
             ORDER BY seq LIMIT 1",
        )?
        .query_row(params![collection.as_str(), path, value], |row| row.get(0))
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}
