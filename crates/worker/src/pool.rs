//! The Worker Pool: a polling scheduler that claims pending queue items and
//! dispatches them to the Batch Processor under a bounded-parallel executor.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::MissedTickBehavior;
use topicforge_core::QueueItem;
use topicforge_service::{BatchOutcome, BatchProcessor};
use topicforge_storage::Store;

/// Tunables for a `WorkerPool`, one-to-one with the `WORKER_*` environment
/// variables.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Max items per LLM call. The pool never exceeds
    /// `topicforge_core::constants::MAX_BATCH_SIZE` regardless of this value.
    pub batch_size: usize,
    pub poll_interval: Duration,
    /// Executor capacity W: max concurrently-executing batches.
    pub max_parallel: usize,
    pub stale_timeout: Duration,
    pub max_retry: i32,
    pub shutdown_drain: Duration,
}

/// Polls `Store` for pending items and dispatches them to `BatchProcessor`
/// under a `Semaphore`-bounded executor, one permit per in-flight batch.
pub struct WorkerPool {
    store: Arc<Store>,
    processor: Arc<BatchProcessor>,
    semaphore: Arc<Semaphore>,
    config: WorkerPoolConfig,
}

impl WorkerPool {
    #[must_use]
    pub fn new(store: Arc<Store>, processor: Arc<BatchProcessor>, config: WorkerPoolConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_parallel));
        Self { store, processor, semaphore, config }
    }

    /// Runs the poll loop until `shutdown` resolves. On shutdown, stops
    /// polling, drains in-flight batches up to `shutdown_drain`, then
    /// unconditionally resets every still-`processing` item back to
    /// `pending` — a clean shutdown never leaves an item stuck mid-flight.
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        self.recover_stale("startup").await;

        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stale_sweep = tokio::time::interval(self.config.stale_timeout);
        stale_sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = poll.tick() => self.tick().await,
                _ = stale_sweep.tick() => self.recover_stale("periodic").await,
            }
        }

        tracing::info!("worker pool shutting down, draining in-flight batches");
        self.drain().await;
        self.recover_stale("shutdown").await;
    }

    async fn recover_stale(&self, phase: &'static str) {
        let store = Arc::clone(&self.store);
        let older_than_secs = if phase == "shutdown" { 0 } else { self.config.stale_timeout.as_secs() as i64 };
        match tokio::task::spawn_blocking(move || store.reset_stale(older_than_secs)).await {
            Ok(Ok(n)) if n > 0 => tracing::info!(count = n, phase, "reset stale processing rows"),
            Ok(Ok(_)) => {},
            Ok(Err(e)) => tracing::error!(error = %e, phase, "stale recovery failed"),
            Err(e) => tracing::error!(error = %e, phase, "stale recovery task panicked"),
        }
    }

    /// Waits for every outstanding permit to free up, i.e. every in-flight
    /// batch to finish, up to `shutdown_drain`.
    async fn drain(&self) {
        let permits = u32::try_from(self.config.max_parallel).unwrap_or(u32::MAX);
        let wait = Arc::clone(&self.semaphore).acquire_many_owned(permits);
        if tokio::time::timeout(self.config.shutdown_drain, wait).await.is_err() {
            tracing::warn!("shutdown drain deadline reached with batches still in flight");
        }
    }

    async fn tick(&self) {
        let available_permits = self.semaphore.available_permits();
        if available_permits == 0 {
            return;
        }

        let claim_size = backpressure_claim_size(available_permits, self.config.batch_size);
        let store = Arc::clone(&self.store);
        let items = match tokio::task::spawn_blocking(move || store.claim_pending(claim_size)).await {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "claim_pending failed");
                return;
            },
            Err(e) => {
                tracing::error!(error = %e, "claim_pending task panicked");
                return;
            },
        };
        if items.is_empty() {
            return;
        }

        let batch_size = self.config.batch_size.min(topicforge_core::constants::MAX_BATCH_SIZE).max(1);
        for chunk in items.chunks(batch_size) {
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else { return };
            let store = Arc::clone(&self.store);
            let processor = Arc::clone(&self.processor);
            let max_retry = self.config.max_retry;
            let batch = chunk.to_vec();
            tokio::spawn(async move {
                let _permit = permit;
                run_batch(&store, &processor, &batch, max_retry).await;
            });
        }
    }
}

/// `min(available_permits * B, 10 * B, 30)` — bounds how many pending items
/// one poll tick claims, so claimed-but-undispatched work never piles up far
/// beyond what this tick can actually hand to the executor.
fn backpressure_claim_size(available_permits: usize, batch_size: usize) -> usize {
    available_permits.saturating_mul(batch_size).min(10 * batch_size).min(30)
}

/// Sends one batch through the Batch Processor and persists its outcome.
/// Fire-and-forget from the caller's perspective: the permit held by the
/// caller's `tokio::spawn` is this function's only synchronization point.
async fn run_batch(store: &Arc<Store>, processor: &BatchProcessor, batch: &[QueueItem], max_retry: i32) {
    match processor.process(batch).await {
        BatchOutcome::Success(results) => {
            for result in results {
                let topic = result.topic_payload;
                let store = Arc::clone(store);
                let id = result.id;
                let outcome = tokio::task::spawn_blocking(move || {
                    let extra = serde_json::Value::Object(topic.extra.clone());
                    store.complete(
                        id,
                        &topic.title,
                        &topic.description,
                        &topic.category,
                        &topic.tags,
                        &topic.technologies,
                        &topic.complexity_level,
                        &extra,
                    )
                })
                .await;
                match outcome {
                    Ok(Ok(())) => {},
                    Ok(Err(e)) => tracing::error!(id, error = %e, "failed to persist completed item"),
                    Err(e) => tracing::error!(id, error = %e, "persist-completed task panicked"),
                }
            }
        },
        BatchOutcome::TransientFail(reason) => {
            for item in batch {
                let store = Arc::clone(store);
                let id = item.id;
                let reason = reason.clone();
                let outcome = tokio::task::spawn_blocking(move || store.requeue_transient(id, &reason, max_retry)).await;
                match outcome {
                    Ok(Ok(())) => {},
                    Ok(Err(e)) => tracing::error!(id, error = %e, "failed to requeue transient failure"),
                    Err(e) => tracing::error!(id, error = %e, "requeue task panicked"),
                }
            }
        },
        BatchOutcome::FatalFail(reason) => {
            for item in batch {
                let store = Arc::clone(store);
                let id = item.id;
                let reason = reason.clone();
                let outcome = tokio::task::spawn_blocking(move || store.fail(id, &reason)).await;
                match outcome {
                    Ok(Ok(())) => {},
                    Ok(Err(e)) => tracing::error!(id, error = %e, "failed to record fatal failure"),
                    Err(e) => tracing::error!(id, error = %e, "fail task panicked"),
                }
            }
        },
    }
}
