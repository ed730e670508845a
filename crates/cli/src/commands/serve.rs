use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use topicforge_core::{constants, env_parse_with_default};
use topicforge_http::{create_router, AppState};
use topicforge_llm::LlmClient;
use topicforge_service::{BatchProcessor, IntakeService};
use topicforge_storage::Store;
use topicforge_worker::{WorkerPool, WorkerPoolConfig};

/// `LLM_API_KEYS` parsed to zero usable keys at startup — the process cannot
/// make progress on any item, so it exits with code 2 rather than serving
/// traffic it can never complete.
#[derive(Debug, thiserror::Error)]
#[error("LLM_API_KEYS is unset or empty: at least one usable key is required")]
pub(crate) struct NoUsableKeys;

fn parse_api_keys() -> Vec<String> {
    std::env::var("LLM_API_KEYS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) async fn run() -> Result<()> {
    let keys = parse_api_keys();
    if keys.is_empty() {
        return Err(NoUsableKeys.into());
    }

    let store_path = std::env::var("STORE_PATH").unwrap_or_else(|_| "./data/app.db".to_owned());
    if let Some(parent) = Path::new(&store_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating store directory {}", parent.display()))?;
    }
    let busy_timeout =
        env_parse_with_default("STORE_BUSY_TIMEOUT", constants::DEFAULT_STORE_BUSY_TIMEOUT_SECS);
    let store = Arc::new(
        Store::open(Path::new(&store_path), busy_timeout)
            .with_context(|| format!("opening store at {store_path}"))?,
    );

    let base_url = std::env::var("LLM_BASE_URL").context("LLM_BASE_URL must be set")?;
    let cooldown = Duration::from_secs(env_parse_with_default(
        "LLM_KEY_COOLDOWN",
        constants::DEFAULT_LLM_KEY_COOLDOWN_SECS,
    ));
    let timeout =
        Duration::from_secs(env_parse_with_default("LLM_TIMEOUT", constants::DEFAULT_LLM_TIMEOUT_SECS));
    let mut llm = LlmClient::new(keys, base_url, cooldown, timeout);
    if let Ok(model) = std::env::var("LLM_MODEL") {
        llm = llm.with_model(model);
    }
    let llm = Arc::new(llm);
    tracing::info!(key_count = llm.key_count(), "LLM client initialized");

    let intake = Arc::new(IntakeService::new(Arc::clone(&store)));
    let processor = Arc::new(BatchProcessor::new(Arc::clone(&llm)));

    let worker_config = WorkerPoolConfig {
        batch_size: env_parse_with_default("WORKER_BATCH_SIZE", constants::DEFAULT_BATCH_SIZE),
        poll_interval: Duration::from_secs(env_parse_with_default(
            "WORKER_POLL_INTERVAL",
            constants::DEFAULT_POLL_INTERVAL_SECS,
        )),
        max_parallel: env_parse_with_default("WORKER_MAX_PARALLEL", constants::DEFAULT_MAX_PARALLEL),
        stale_timeout: Duration::from_secs(env_parse_with_default(
            "WORKER_STALE_TIMEOUT",
            constants::DEFAULT_STALE_TIMEOUT_SECS.unsigned_abs(),
        )),
        max_retry: env_parse_with_default("WORKER_MAX_RETRY", constants::DEFAULT_MAX_RETRY),
        shutdown_drain: Duration::from_secs(env_parse_with_default(
            "WORKER_SHUTDOWN_DRAIN",
            constants::DEFAULT_SHUTDOWN_DRAIN_SECS,
        )),
    };
    let pool = Arc::new(WorkerPool::new(Arc::clone(&store), processor, worker_config));

    let host = std::env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let port: u16 = env_parse_with_default("HTTP_PORT", 8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid HTTP_HOST/HTTP_PORT: {host}:{port}"))?;

    let state = Arc::new(AppState::new(Arc::clone(&store), intake));
    let router = create_router(state);
    let listener =
        tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, "starting HTTP server");
    let server = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal());
    let worker_handle = tokio::spawn(Arc::clone(&pool).run(shutdown_signal()));

    server.await.context("HTTP server error")?;
    worker_handle.await.context("worker pool task panicked")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
