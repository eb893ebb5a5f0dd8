//! Database schema and configuration
//!
//! **SoC:** This module ONLY defines schema, no business logic

use rusqlite::Connection;
use std::path::Path;

/// Storage configuration (declarative)
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to SQLite database (`:memory:` for in-memory)
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// Initialize database with schema
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    // One table for every collection; `seq` gives natural (insertion) order
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            UNIQUE(collection, id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq)",
        [],
    )?;

    // Uniqueness lives in the database so concurrent writers cannot race past it
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_products_code
         ON documents(json_extract(body, '$.code'))
         WHERE collection = 'products'",
        [],
    )?;

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
         ON documents(json_extract(body, '$.email'))
         WHERE collection = 'users'",
        [],
    )?;

    Ok(())
}
