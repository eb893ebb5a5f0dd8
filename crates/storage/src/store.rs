//! The document store handle.
//!
//! Uses interior mutability (Mutex) so one `Arc<Store>` can be shared across
//! request handlers. Every operation is short and synchronous; async callers
//! run it on the blocking pool.

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

use crate::error::StoreResult;
use crate::schema::{StorageConfig, init_schema};

pub struct Store {
    pub(crate) conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the store described by `config`.
    pub fn new(config: StorageConfig) -> StoreResult<Self> {
        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };

        init_schema(&conn)?;
        info!(path = %config.path, "document store ready");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::new(StorageConfig::default())
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        Self::new(StorageConfig::from_path(path))
    }

    /// Cheap liveness probe for health checks.
    pub fn ping(&self) -> bool {
        self.conn
            .lock()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}
