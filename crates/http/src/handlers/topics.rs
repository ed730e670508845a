//! `POST /topics`, `GET /processing-status`, `GET /topics`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use topicforge_core::{PaginatedTopics, QueueItem, StateCounts, SubmitOutcome};

use crate::api_error::ApiError;
use crate::blocking::blocking_result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitTopicsRequest {
    pub titles: Vec<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct SubmitTopicsResponse {
    pub queued: Vec<i64>,
    pub skipped: Vec<i64>,
    pub retried: Vec<i64>,
    pub already_queued: Vec<i64>,
}

/// `POST /topics`: submits every title via `Intake.SubmitBatch`, bucketing
/// each into the response by its `SubmitOutcome`, preserving input order
/// within each bucket. A single invalid title does not fail the request.
pub async fn submit_topics(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitTopicsRequest>,
) -> Json<SubmitTopicsResponse> {
    let results = state.intake.submit_batch(&req.titles).await;
    let mut response = SubmitTopicsResponse::default();
    for result in results {
        match result {
            Ok((id, SubmitOutcome::Queued)) => response.queued.push(id),
            Ok((id, SubmitOutcome::Skipped)) => response.skipped.push(id),
            Ok((id, SubmitOutcome::Retried)) => response.retried.push(id),
            Ok((id, SubmitOutcome::AlreadyQueued)) => response.already_queued.push(id),
            Err(e) => tracing::warn!(error = %e, "one title in a batch submission was rejected"),
        }
    }
    Json(response)
}

#[derive(Debug, Serialize)]
pub struct ProcessingStatusResponse {
    #[serde(flatten)]
    pub counts: StateCounts,
    pub recent_failures: Vec<QueueItem>,
}

/// `GET /processing-status`: current per-state counts and the most recent
/// failures, for UI polling.
pub async fn processing_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProcessingStatusResponse>, ApiError> {
    let status = state.intake.status(topicforge_core::constants::DEFAULT_RECENT_FAILURES_LIMIT).await?;
    Ok(Json(ProcessingStatusResponse { counts: status.counts, recent_failures: status.recent_failures }))
}

#[derive(Debug, Deserialize)]
pub struct ListTopicsQuery {
    /// Named `state` on the wire per the submission API's vocabulary, but a
    /// `Topic` has no `state` field of its own — this filters on `category`
    /// instead (see `DESIGN.md`).
    pub state: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// `GET /topics?state=…&page=…&page_size=…`: read-only listing over `Store`.
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTopicsQuery>,
) -> Result<Json<PaginatedTopics>, ApiError> {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(topicforge_core::constants::DEFAULT_PAGE_SIZE as u64);
    let store = Arc::clone(&state.store);
    let category = query.state;
    let topics = blocking_result(move || store.list_topics(category.as_deref(), page, page_size)).await?;
    Ok(Json(topics))
}
