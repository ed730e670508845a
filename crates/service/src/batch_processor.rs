//! The Batch Processor: a pure function from a claimed batch of `QueueItem`s
//! to an outcome, with no storage side effects of its own.
//!
//! Keeping this free of `Store` calls means the Worker Pool decides what to
//! persist (and when) from the outcome, and this type stays trivially
//! testable against a stubbed `LlmClient`.

use std::sync::Arc;

use topicforge_core::{CleanedTitle, QueueItem};
use topicforge_llm::LlmClient;

/// The result of sending one batch to the LLM.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Every item in the batch was cleaned successfully.
    Success(Vec<PerItemResult>),
    /// The whole batch failed for a reason worth retrying (rate limit, 5xx,
    /// timeout, transport). The caller should requeue every item in the
    /// batch via `Store::requeue_transient`.
    TransientFail(String),
    /// The whole batch failed for a reason not worth retrying (auth error,
    /// malformed response). The caller should fail every item in the batch
    /// via `Store::fail`.
    FatalFail(String),
}

/// One cleaned title, ready to be persisted via `Store::complete`.
#[derive(Debug, Clone)]
pub struct PerItemResult {
    pub id: i64,
    pub cleaned_title: String,
    pub topic_payload: CleanedTitle,
}

/// Turns claimed `QueueItem`s into an LLM outcome.
///
/// Stateless beyond the shared `LlmClient`; safe to share across every
/// concurrently-running batch via `Arc`.
pub struct BatchProcessor {
    llm: Arc<LlmClient>,
}

impl BatchProcessor {
    #[must_use]
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Sends `items` to the LLM as a single call and classifies the result.
    ///
    /// `items` is expected to already be capped at the configured batch size
    /// (and the hard `MAX_BATCH_SIZE` ceiling) by the caller; an empty slice
    /// trivially succeeds with no work done.
    pub async fn process(&self, items: &[QueueItem]) -> BatchOutcome {
        if items.is_empty() {
            return BatchOutcome::Success(Vec::new());
        }

        let payload: Vec<(i64, String)> =
            items.iter().map(|item| (item.id, item.original_title.clone())).collect();

        match self.llm.chat_completion(&payload).await {
            Ok(cleaned) => {
                let results = cleaned
                    .into_iter()
                    .map(|topic| PerItemResult {
                        id: topic.id,
                        cleaned_title: topic.title.clone(),
                        topic_payload: topic,
                    })
                    .collect();
                BatchOutcome::Success(results)
            },
            Err(e) if e.is_transient() => BatchOutcome::TransientFail(e.to_string()),
            Err(e) => BatchOutcome::FatalFail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use topicforge_core::QueueItemState;

    fn item(id: i64, title: &str) -> QueueItem {
        QueueItem {
            id,
            original_title: title.to_owned(),
            current_title: None,
            state: QueueItemState::Processing,
            error_message: None,
            retry_count: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn chat_ok_body(topics_json: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": format!("{{\"topics\": {topics_json}}}") }
            }]
        })
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_a_network_call() {
        let server = MockServer::start().await;
        let llm = Arc::new(LlmClient::new(
            vec!["key".to_owned()],
            server.uri(),
            Duration::from_secs(60),
            Duration::from_secs(5),
        ));
        let processor = BatchProcessor::new(llm);

        let outcome = processor.process(&[]).await;
        assert!(matches!(outcome, BatchOutcome::Success(results) if results.is_empty()));
    }

    #[tokio::test]
    async fn successful_batch_returns_one_result_per_item() {
        let server = MockServer::start().await;
        let topics_json = r#"[{"id":1,"title":"Clean A","description":"d","category":"rust",
            "tags":["rust"],"technologies":["tokio"],"complexity_level":"beginner"},
            {"id":2,"title":"Clean B","description":"d","category":"rust",
            "tags":[],"technologies":[],"complexity_level":"advanced"}]"#;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_ok_body(topics_json)))
            .mount(&server)
            .await;

        let llm = Arc::new(LlmClient::new(
            vec!["key".to_owned()],
            server.uri(),
            Duration::from_secs(60),
            Duration::from_secs(5),
        ));
        let processor = BatchProcessor::new(llm);
        let items = vec![item(1, "1. raw a"), item(2, "2. raw b")];

        let outcome = processor.process(&items).await;
        match outcome {
            BatchOutcome::Success(results) => {
                assert_eq!(results.len(), 2);
                assert_eq!(results[0].cleaned_title, "Clean A");
                assert_eq!(results[1].cleaned_title, "Clean B");
            },
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limited_batch_is_a_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let llm = Arc::new(LlmClient::new(
            vec!["only-key".to_owned()],
            server.uri(),
            Duration::from_secs(60),
            Duration::from_secs(5),
        ));
        let processor = BatchProcessor::new(llm);
        let outcome = processor.process(&[item(1, "raw")]).await;
        assert!(matches!(outcome, BatchOutcome::TransientFail(_)));
    }

    #[tokio::test]
    async fn auth_failure_is_a_fatal_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let llm = Arc::new(LlmClient::new(
            vec!["bad-key".to_owned()],
            server.uri(),
            Duration::from_secs(60),
            Duration::from_secs(5),
        ));
        let processor = BatchProcessor::new(llm);
        let outcome = processor.process(&[item(1, "raw")]).await;
        assert!(matches!(outcome, BatchOutcome::FatalFail(_)));
    }
}
