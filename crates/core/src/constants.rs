//! Shared constants for topicforge.
//!
//! Centralizes magic numbers that would otherwise be duplicated across crates.

/// Hard cap on items sent to the LLM in a single batch, regardless of configuration.
pub const MAX_BATCH_SIZE: usize = 5;

/// Default number of items sent to the LLM in a single batch (`WORKER_BATCH_SIZE`).
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default poll interval between worker pool ticks, in seconds (`WORKER_POLL_INTERVAL`).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default executor capacity, i.e. max concurrently-executing batches (`WORKER_MAX_PARALLEL`).
pub const DEFAULT_MAX_PARALLEL: usize = 80;

/// Default threshold after which a `processing` item is considered stale, in seconds
/// (`WORKER_STALE_TIMEOUT`).
pub const DEFAULT_STALE_TIMEOUT_SECS: i64 = 30 * 60;

/// Default cap on transient-failure requeues before an item is marked `failed`
/// (`WORKER_MAX_RETRY`).
pub const DEFAULT_MAX_RETRY: i32 = 3;

/// Default drain deadline on graceful shutdown, in seconds (`WORKER_SHUTDOWN_DRAIN`).
pub const DEFAULT_SHUTDOWN_DRAIN_SECS: u64 = 30;

/// Default per-key cooldown after a rate-limit or quota error, in seconds (`LLM_KEY_COOLDOWN`).
pub const DEFAULT_LLM_KEY_COOLDOWN_SECS: u64 = 60;

/// Default per-call LLM timeout, in seconds (`LLM_TIMEOUT`).
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Default SQLite busy timeout, in milliseconds (`STORE_BUSY_TIMEOUT`, stored in seconds upstream).
pub const DEFAULT_STORE_BUSY_TIMEOUT_SECS: u64 = 30;

/// Maximum attempts in the busy-retry loop around a single write.
pub const STORE_WRITE_MAX_ATTEMPTS: u32 = 5;

/// Initial backoff before the first retry of a busy write, in milliseconds.
pub const STORE_WRITE_BACKOFF_BASE_MS: u64 = 100;

/// Cap on the exponential backoff between busy-write retries, in milliseconds.
pub const STORE_WRITE_BACKOFF_CAP_MS: u64 = 1600;

/// Default number of recent failures surfaced by the status API.
pub const DEFAULT_RECENT_FAILURES_LIMIT: usize = 10;

/// Default page size for the topic listing endpoint.
pub const DEFAULT_PAGE_SIZE: usize = 20;
