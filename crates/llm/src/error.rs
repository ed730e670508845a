//! Typed error enum for the LLM crate.
//!
//! Classifies every failure mode as fatal-per-key, transient-per-key, or
//! fatal-per-batch, since the credential pool and the Batch Processor each
//! need to react differently (see `LlmError::is_transient`).

use thiserror::Error;

/// Errors from LLM API operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP 401/403. Fatal per key: the credential pool disables the key
    /// permanently, never retried even after a cooldown would expire.
    #[error("auth error on key ending in ...{key_suffix}: {body}")]
    AuthError { key_suffix: String, body: String },

    /// HTTP 429. Transient per key: cool the key down, rotate to the next.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Response body mentions both "quota" and "exceeded". Same per-key
    /// cooldown treatment as `RateLimited`.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// HTTP 500/502/503/529. Retried once on the same key before rotating.
    #[error("transient server error (HTTP {code}): {body}")]
    Transient5xx { code: u16, body: String },

    /// The envelope wasn't a valid JSON array of `CleanedTitle`, or its ids
    /// didn't match the input ids. Fatal per batch; the key is not penalized.
    #[error("response validation failed: {0}")]
    ParseError(String),

    /// The per-call timeout elapsed. Transient; rotates key on next attempt.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Every credential is cooling down or permanently disabled. No HTTP
    /// request was attempted.
    #[error("no usable LLM credentials available")]
    NoUsableKeys,

    /// Transport-level failure not classified as a timeout (DNS, connection
    /// reset, TLS, etc.). Treated as transient.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl LlmError {
    /// Whether this error should cause the caller to requeue the batch
    /// (subject to the `retry_count` cap) rather than mark it permanently
    /// failed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_)
                | Self::QuotaExceeded(_)
                | Self::Transient5xx { .. }
                | Self::Timeout(_)
                | Self::NoUsableKeys
                | Self::Transport(_)
        )
    }
}
