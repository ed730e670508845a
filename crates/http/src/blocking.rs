//! Helpers for running blocking `Store` operations from async handlers.
//!
//! Eliminates the boilerplate of spawning a blocking task, handling a join
//! error, and converting the storage error into an `ApiError`.

use axum::Json;
use serde::Serialize;
use topicforge_storage::StorageError;

use crate::api_error::ApiError;

pub(crate) async fn blocking_json<T, F>(f: F) -> Result<Json<T>, ApiError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static + Serialize,
{
    blocking_result(f).await.map(Json)
}

pub(crate) async fn blocking_result<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| ApiError::from(topicforge_service::ServiceError::from(e))),
        Err(join_err) => {
            tracing::error!(error = %join_err, "blocking task panicked");
            Err(ApiError::Internal(topicforge_service::ServiceError::Internal(join_err.to_string())))
        },
    }
}
