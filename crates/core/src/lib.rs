//! Core domain types, errors and env config shared across every topicforge crate.

/// Shared numeric defaults and caps (batch size, timeouts, retry budgets).
pub mod constants;
/// Environment variable parsing with warn-on-invalid-value semantics.
pub mod env_config;
/// Typed error enum for domain parsing/validation failures.
mod error;
/// The strict JSON envelope returned by the LLM, shared by `llm` and `service`.
mod llm_types;
/// The `QueueItem` domain type and its lifecycle state.
mod queue_item;
/// The `Topic` domain type.
mod topic;

pub use env_config::env_parse_with_default;
pub use error::CoreError;
pub use llm_types::CleanedTitle;
pub use queue_item::{QueueItem, QueueItemState, StateCounts, SubmitOutcome};
pub use topic::{PaginatedTopics, Topic};
