//! Durable storage for topicforge: queue items, topics, and the fingerprint cache.
//!
//! SQLite in WAL mode via an `r2d2` connection pool. All methods on [`Store`]
//! are synchronous (`rusqlite` is sync); async callers reach them through
//! `tokio::task::spawn_blocking`, each drawing its own pooled connection for
//! the duration of one call.

mod error;
mod migrations;
mod retry;
mod store;

pub use error::StorageError;
pub use store::{PooledConn, Store};

#[cfg(test)]
mod tests;
