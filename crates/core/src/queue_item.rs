//! The `QueueItem` domain type and its lifecycle state.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a `QueueItem`.
///
/// A `QueueItem` moves `pending -> processing -> {completed, failed}`, with `failed`
/// able to transition back to `pending` on resubmission (see [`crate::constants`]
/// and the store's resubmit policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueItemState {
    /// Waiting to be claimed by a worker.
    Pending,
    /// Claimed by a worker, in flight to (or awaiting a response from) the LLM.
    Processing,
    /// The LLM cleaned the title successfully and a `Topic` row exists.
    Completed,
    /// Processing failed and the retry budget (if any) is exhausted.
    Failed,
}

impl QueueItemState {
    /// The lowercase string used to persist this state in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for QueueItemState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::InvalidState(other.to_owned())),
        }
    }
}

impl std::fmt::Display for QueueItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single submitted title and its processing lifecycle.
///
/// `original_title` is byte-for-byte immutable once inserted (invariant I2/I3 of the
/// specification); `current_title` is populated only on a successful `completed`
/// transition (invariant I1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    pub original_title: String,
    pub current_title: Option<String>,
    pub state: QueueItemState,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueItem {
    /// Whether this item can still be claimed for processing.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, QueueItemState::Pending)
    }
}

/// Per-state counts backing the processing-status API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StateCounts {
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Outcome of a single `Submit` call against the Intake Port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// A brand-new row was inserted.
    Queued,
    /// An existing `pending`/`processing` row already covers this title.
    AlreadyQueued,
    /// The title was already `completed`; nothing to do.
    Skipped,
    /// A previously `failed` row was reset back to `pending`.
    Retried,
}
