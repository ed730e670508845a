//! Typed error enum for the core crate.

use thiserror::Error;

/// Errors originating from core domain type parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Failed to parse a queue item state string.
    #[error("invalid queue item state: {0}")]
    InvalidState(String),
    /// A submitted title was empty after trimming whitespace.
    #[error("title is empty after trimming whitespace")]
    EmptyTitle,
}
