//! Typed error enum for the service layer.
//!
//! Unifies storage and LLM failures into a single error type, so callers
//! (the HTTP edge, the Worker Pool) can match on specific failure modes
//! instead of downcasting an opaque `anyhow::Error`.

use thiserror::Error;
use topicforge_core::CoreError;
use topicforge_llm::LlmError;
use topicforge_storage::StorageError;

/// Service-layer error unifying storage, LLM, and domain validation failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// LLM API call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Caller provided invalid input (empty title, etc.).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// A blocking storage task panicked or was cancelled before completing.
    #[error("internal: background task failed: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether this error is likely transient and worth a caller-level retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Llm(e) => e.is_transient(),
            Self::InvalidInput(_) | Self::Internal(_) => false,
        }
    }

    /// Whether this error represents a not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }

    /// Whether the caller's input was the problem, as opposed to a backend failure.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Whether this error is a unique-constraint violation on the queue.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_duplicate())
    }
}
