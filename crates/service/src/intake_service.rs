//! The Intake Port: the only entry point that creates or inspects
//! `QueueItem`s on behalf of the HTTP edge.
//!
//! A thin async wrapper around `Store`, matching the shape of every other
//! service in this workspace: it owns nothing but a handle to its backend
//! and moves each blocking call onto the blocking thread pool.

use std::sync::Arc;

use topicforge_core::{QueueItem, QueueItemState, StateCounts, SubmitOutcome};
use topicforge_storage::Store;

use crate::blocking::blocking;
use crate::error::ServiceError;

/// Counts plus a sample of recent failures, backing `GET /processing-status`.
#[derive(Debug, Clone)]
pub struct ProcessingStatus {
    pub counts: StateCounts,
    pub recent_failures: Vec<QueueItem>,
}

/// Dedup-aware intake for user-submitted titles, and read access to queue state.
pub struct IntakeService {
    store: Arc<Store>,
}

impl IntakeService {
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Submits one title. Trims whitespace and rejects an empty result;
    /// otherwise dedupes against `original_title` and reports which of the
    /// four `SubmitOutcome` variants applied.
    ///
    /// The outcome label is read from a lookup taken just before the write;
    /// under concurrent submission of the same title the label can rarely
    /// lag reality by one transition, but the row itself (and its id) is
    /// always correct — `Store::enqueue` is the sole source of truth there.
    pub async fn submit(&self, title: &str) -> Result<(i64, SubmitOutcome), ServiceError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidInput(topicforge_core::CoreError::EmptyTitle));
        }

        let prior_state = {
            let store = Arc::clone(&self.store);
            let owned = trimmed.to_owned();
            blocking(move || store.lookup_by_title(&owned)).await?.map(|item| item.state)
        };

        let (id, created) = {
            let store = Arc::clone(&self.store);
            let owned = trimmed.to_owned();
            blocking(move || store.enqueue(&owned)).await?
        };

        let outcome = if created {
            SubmitOutcome::Queued
        } else {
            match prior_state {
                Some(QueueItemState::Failed) => SubmitOutcome::Retried,
                Some(QueueItemState::Completed) => SubmitOutcome::Skipped,
                _ => SubmitOutcome::AlreadyQueued,
            }
        };
        Ok((id, outcome))
    }

    /// Submits every title in `titles`, one at a time. A single invalid
    /// (empty) title does not fail the rest of the batch — its slot in the
    /// result vector carries the error instead.
    pub async fn submit_batch(&self, titles: &[String]) -> Vec<Result<(i64, SubmitOutcome), ServiceError>> {
        let mut results = Vec::with_capacity(titles.len());
        for title in titles {
            results.push(self.submit(title).await);
        }
        results
    }

    /// Current per-state counts plus the most recent failures, for the
    /// processing-status API.
    pub async fn status(&self, recent_failures_limit: usize) -> Result<ProcessingStatus, ServiceError> {
        let counts = {
            let store = Arc::clone(&self.store);
            blocking(move || store.count_by_state()).await?
        };
        let recent_failures = {
            let store = Arc::clone(&self.store);
            blocking(move || store.recent_failures(recent_failures_limit)).await?
        };
        Ok(ProcessingStatus { counts, recent_failures })
    }
}
