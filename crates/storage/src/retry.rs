//! Bounded-retry wrapper around busy-writer contention.
//!
//! SQLite serializes writers; under concurrent workers a write can transiently
//! observe `SQLITE_BUSY`/`SQLITE_LOCKED` even with WAL mode and a server-side
//! `busy_timeout`. This loop is the second line of defense: up to
//! `STORE_WRITE_MAX_ATTEMPTS` attempts, exponential backoff starting at
//! `STORE_WRITE_BACKOFF_BASE_MS`, doubling each time, capped at
//! `STORE_WRITE_BACKOFF_CAP_MS`.

use std::time::Duration;

use topicforge_core::constants::{
    STORE_WRITE_BACKOFF_BASE_MS, STORE_WRITE_BACKOFF_CAP_MS, STORE_WRITE_MAX_ATTEMPTS,
};

use crate::error::StorageError;

/// Runs `op` up to `STORE_WRITE_MAX_ATTEMPTS` times, sleeping with exponential
/// backoff between attempts that fail with a busy/locked error. Any other
/// error, or a busy error on the final attempt, is returned immediately.
///
/// `op` is synchronous (rusqlite is sync); callers invoke this from inside a
/// `spawn_blocking` closure, so a `std::thread::sleep` here is acceptable.
pub fn with_busy_retry<T>(
    mut op: impl FnMut() -> Result<T, rusqlite::Error>,
) -> Result<T, StorageError> {
    let mut backoff_ms = STORE_WRITE_BACKOFF_BASE_MS;
    for attempt in 1..=STORE_WRITE_MAX_ATTEMPTS {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                let storage_err = StorageError::from(err);
                if !storage_err.is_transient() || attempt == STORE_WRITE_MAX_ATTEMPTS {
                    return Err(storage_err);
                }
                tracing::warn!(attempt, backoff_ms, "database busy, retrying");
                std::thread::sleep(Duration::from_millis(backoff_ms));
                backoff_ms = (backoff_ms * 2).min(STORE_WRITE_BACKOFF_CAP_MS);
            },
        }
    }
    unreachable!("loop always returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rusqlite::ffi;

    use super::*;

    fn busy_error() -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error { code: ffi::ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".to_owned()),
        )
    }

    #[test]
    fn succeeds_immediately_when_op_succeeds() {
        let calls = Cell::new(0);
        let result = with_busy_retry(|| {
            calls.set(calls.get() + 1);
            Ok::<_, rusqlite::Error>(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retries_on_busy_then_succeeds() {
        let calls = Cell::new(0);
        let result = with_busy_retry(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(busy_error())
            } else {
                Ok(())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausts_budget_and_returns_busy_error() {
        let calls = Cell::new(0);
        let result = with_busy_retry(|| {
            calls.set(calls.get() + 1);
            Err::<(), _>(busy_error())
        });
        assert!(matches!(result.unwrap_err(), StorageError::Busy(_)));
        assert_eq!(calls.get(), STORE_WRITE_MAX_ATTEMPTS);
    }

    #[test]
    fn non_transient_error_returns_immediately() {
        let calls = Cell::new(0);
        let result = with_busy_retry(|| {
            calls.set(calls.get() + 1);
            Err::<(), _>(rusqlite::Error::QueryReturnedNoRows)
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
