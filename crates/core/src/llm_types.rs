//! Shared types for the LLM response envelope.
//!
//! Defined in `core` (rather than the `llm` crate) so both `llm` (which parses the
//! envelope) and `service` (which turns each entry into a `Topic`) depend on the
//! same struct without a cross-dependency between them.

use serde::{Deserialize, Serialize};

/// One entry of the strict JSON array the LLM is required to return: one per input id.
///
/// Missing required fields or a type mismatch on any entry fails the whole batch
/// (see `LlmError::Validation` / the Batch Processor's `FatalFail` path) — this type
/// intentionally has no `#[serde(default)]` on the required fields so `serde_json`
/// rejects a short entry instead of silently zero-filling it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedTitle {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub technologies: Vec<String>,
    pub complexity_level: String,
    /// Any additional structured fields the prompt asked for beyond the core set.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
