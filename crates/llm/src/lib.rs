//! Stateless adapter over a remote chat-completions LLM API.
//!
//! Owns a round-robin, cooldown-aware credential pool and classifies every
//! remote failure into the taxonomy the Worker Pool and Batch Processor need
//! to tell transient from fatal failures apart.

mod ai_types;
mod client;
mod credential;
mod error;

pub use client::{LlmClient, DEFAULT_MODEL};
pub use error::LlmError;
