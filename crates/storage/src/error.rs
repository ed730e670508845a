//! Typed error enum for the storage layer.
//!
//! Replaces ad-hoc `anyhow::Result` in the store's public surface so callers
//! (the Worker Pool, the Intake Port) can match on specific failure modes —
//! not found, duplicate, or a transient busy/locked error worth retrying —
//! instead of downcasting an opaque `anyhow::Error`.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Row not found for an expected-present entity.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation (dedup on `original_title`).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The write retry budget (see `retry::with_busy_retry`) was exhausted while the
    /// database was locked. Transient: the caller should skip this tick and try again
    /// on the next poll.
    #[error("database busy after exhausting retry budget: {0}")]
    Busy(#[source] rusqlite::Error),

    /// Any other SQLite/connection-pool failure not covered above.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Failed to acquire a pooled connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Row data could not be deserialized into a domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Migration failure.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Whether this error is likely transient and worth a caller-level retry
    /// (as opposed to a genuine data or logic error).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    /// Whether this error is a unique-constraint violation.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Classifies a raw `rusqlite::Error` into `Busy` vs `Database`/`Duplicate`.
///
/// Not a blanket passthrough: the busy/locked and unique-constraint cases need
/// different treatment by callers, so the mapping is explicit here rather than
/// left for each call site to reclassify.
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as SqlError;

        if let SqlError::SqliteFailure(ref sqlite_err, _) = err {
            if matches!(sqlite_err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) {
                return Self::Busy(err);
            }
            if sqlite_err.code == ErrorCode::ConstraintViolation {
                return Self::Duplicate(err.to_string());
            }
        }
        Self::Database(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}
