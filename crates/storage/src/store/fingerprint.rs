//! Opaque get/put cache for the downstream content generator.
//!
//! The core queue never calls these itself; they exist so the fingerprint
//! cache can live in the same embedded database as the queue and topic
//! tables without the Store interpreting the blob it stores.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{get_conn, Store};
use crate::error::StorageError;
use crate::retry::with_busy_retry;

impl Store {
    /// Fetches the cached value for `key`, if present.
    pub fn fingerprint_get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.query_row("SELECT value FROM fingerprint_cache WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(StorageError::from)
    }

    /// Inserts or replaces the cached value for `key`.
    pub fn fingerprint_put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        with_busy_retry(|| {
            conn.execute(
                "INSERT INTO fingerprint_cache (key, value, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, created_at = excluded.created_at",
                params![key, value, now],
            )
        })?;
        Ok(())
    }
}
