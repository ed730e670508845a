//! Bridges the blocking `Store` API into async service methods.
//!
//! `rusqlite` calls are synchronous; every `Store` call here runs on the
//! blocking thread pool via `tokio::task::spawn_blocking` so it never stalls
//! the async runtime's worker threads.

use topicforge_storage::StorageError;

use crate::error::ServiceError;

pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ServiceError::from),
        Err(join_err) => Err(ServiceError::Internal(join_err.to_string())),
    }
}
