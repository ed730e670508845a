//! SQLite-backed `Store`: durable queue items, topics, and fingerprint cache.

mod fingerprint;
mod queue;
mod topics;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::StorageError;
use crate::migrations;

/// Type alias for a pooled connection handle.
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Durable store for queue items, topics, and the fingerprint cache.
///
/// Cheaply `Clone`-able: wraps an `r2d2::Pool`, which is itself an `Arc`. Every
/// blocking call below draws a connection from the pool for the duration of
/// one operation and returns it on drop — no connection is ever cached on a
/// task or shared across tasks.
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: Pool<SqliteConnectionManager>,
    /// Whether the opened database still uses the legacy single-column
    /// `title` form of `queue_items`. Detected once at open time via
    /// `PRAGMA table_info`; read paths branch on this, write paths to new
    /// rows always use the two-column form (a legacy DB simply never gains
    /// new rows with `current_title` populated until migrated out-of-band).
    pub(crate) legacy_schema: bool,
}

pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    pool.get().map_err(StorageError::from)
}

impl Store {
    /// Opens (creating if absent) the SQLite database at `db_path`, running
    /// migrations and detecting the queue table's column layout.
    pub fn open(db_path: &Path, busy_timeout_secs: u64) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Migration(e.to_string()))?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder().max_size(8).build(manager)?;

        let conn = pool.get()?;
        migrations::run_migrations(&conn, busy_timeout_secs)?;
        let legacy_schema = !migrations::column_exists(&conn, "queue_items", "original_title");
        if legacy_schema {
            tracing::warn!(
                "queue_items uses the legacy single-column title schema; reads/writes will \
                 use title-compatibility paths until migrated"
            );
        }
        drop(conn);

        Ok(Self { pool, legacy_schema })
    }

}
