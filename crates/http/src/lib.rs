//! HTTP API server (Axum): submission, processing-status, and topic-listing.

pub mod api_error;
mod blocking;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use topicforge_service::IntakeService;
use topicforge_storage::Store;

/// Shared application state handed to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub store: Arc<Store>,
    pub intake: Arc<IntakeService>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<Store>, intake: Arc<IntakeService>) -> Self {
        Self { store, intake }
    }
}

/// Builds the Axum router: submission, status, listing, and a health check.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/topics", post(handlers::submit_topics))
        .route("/topics", get(handlers::list_topics))
        .route("/processing-status", get(handlers::processing_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http_body_util::BodyExt as _;
    use tower::ServiceExt as _;

    use super::*;

    fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
        let temp_dir = tempfile::TempDir::new().expect("tempdir");
        let store = Arc::new(Store::open(&temp_dir.path().join("test.db"), 5).expect("open store"));
        let intake = Arc::new(IntakeService::new(Arc::clone(&store)));
        (Arc::new(AppState::new(store, intake)), temp_dir)
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let (state, _dir) = test_state();
        let app = create_router(state);
        let response = app
            .oneshot(axum::http::Request::builder().uri("/healthz").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn submit_then_list_round_trips_through_the_router() {
        let (state, _dir) = test_state();
        let app = create_router(state);
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/topics")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"titles": ["Async Rust Patterns"]}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["queued"].as_array().unwrap().len(), 1);

        let request = axum::http::Request::builder()
            .uri("/processing-status")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["pending"], 1);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_with_bad_request() {
        let (state, _dir) = test_state();
        let app = create_router(state);
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/topics")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"titles": [""]}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["queued"].as_array().unwrap().is_empty());
    }
}
