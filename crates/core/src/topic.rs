//! The `Topic` domain type: the canonical record derived from a completed `QueueItem`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The LLM-cleaned, structured record produced once a `QueueItem` completes.
///
/// `id` shares the `QueueItem`'s id (see `DESIGN.md` for the open-question decision);
/// `extra` carries any structured fields the LLM envelope returned beyond the core
/// set, so a richer prompt doesn't require a schema migration to round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub queue_item_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub technologies: Vec<String>,
    pub complexity_level: String,
    #[serde(default)]
    pub extra: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A page of `Topic` rows, as returned by `GET /topics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedTopics {
    pub items: Vec<Topic>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}
