use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use topicforge_core::CleanedTitle;

use crate::ai_types::{ChatRequest, ChatResponse, Message, ResponseFormat, TopicsEnvelope};
use crate::credential::CredentialPool;
use crate::error::LlmError;

/// Default model sent in each request when the caller doesn't override it.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You clean up raw, user-submitted topic titles for a technical \
content pipeline. For each input, strip leading numeric or bullet prefixes (e.g. \"24.\"), \
markdown emphasis characters, emoji, and verbose filler phrases, while preserving the topic's \
meaning. Then classify the cleaned topic. Respond with a single JSON object of the form \
{\"topics\": [{\"id\": <int>, \"title\": <string>, \"description\": <string>, \"category\": \
<string>, \"tags\": [<string>], \"technologies\": [<string>], \"complexity_level\": <string>}]} \
— exactly one entry per input id, in any order, with no additional commentary.";

/// Stateless adapter over a remote chat-completions API.
///
/// Owns the credential pool and HTTP client; safe to share across every
/// concurrent worker behind an `Arc` (see `topicforge_worker`).
pub struct LlmClient {
    http: reqwest::Client,
    credentials: CredentialPool,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    /// Builds a client over `keys` (must be non-empty; the caller is
    /// responsible for surfacing exit code 2 if `LLM_API_KEYS` parsed to
    /// zero usable keys at startup).
    #[must_use]
    pub fn new(keys: Vec<String>, base_url: String, cooldown: Duration, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials: CredentialPool::new(keys, cooldown),
            base_url,
            model: DEFAULT_MODEL.to_owned(),
            timeout,
        }
    }

    /// Overrides the model identifier sent in each request.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Number of keys configured, usable or not. Used by callers to decide
    /// whether startup should fail with exit code 2.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.credentials.len()
    }

    /// Cleans a batch of `(id, original_title)` pairs in one call. Returns a
    /// `CleanedTitle` per input id, in the same order as `items`.
    ///
    /// Retries a transient 5xx once on the same key before rotating; a
    /// rate-limit, quota, or timeout error rotates to the next key
    /// immediately (after cooling the key down). An auth error disables the
    /// key and fails the call immediately, without trying another key — the
    /// Batch Processor treats that as fatal for this batch, and the next
    /// batch's call will simply skip the now-disabled key.
    pub async fn chat_completion(
        &self,
        items: &[(i64, String)],
    ) -> Result<Vec<CleanedTitle>, LlmError> {
        let request = self.build_request(items);
        let max_attempts = self.credentials.len().max(1);
        let mut last_err = None;

        for _ in 0..max_attempts {
            let Some(key) = self.credentials.acquire() else {
                return Err(LlmError::NoUsableKeys);
            };

            match self.send_once(&key, &request).await {
                Ok(content) => return Self::parse_and_validate(&content, items),
                Err(LlmError::AuthError { key_suffix, body }) => {
                    self.credentials.disable(&key);
                    tracing::warn!(key_suffix, "LLM key disabled after auth error");
                    return Err(LlmError::AuthError { key_suffix, body });
                },
                Err(LlmError::Transient5xx { code, body }) => {
                    tracing::warn!(code, "transient LLM error, retrying same key once");
                    match self.send_once(&key, &request).await {
                        Ok(content) => return Self::parse_and_validate(&content, items),
                        Err(e) => last_err = Some(e),
                    }
                },
                Err(err @ (LlmError::RateLimited(_) | LlmError::QuotaExceeded(_))) => {
                    self.credentials.cool_down(&key);
                    last_err = Some(err);
                },
                Err(err @ (LlmError::Timeout(_) | LlmError::Transport(_))) => {
                    last_err = Some(err);
                },
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or(LlmError::NoUsableKeys))
    }

    fn build_request(&self, items: &[(i64, String)]) -> ChatRequest {
        let user_content = items
            .iter()
            .map(|(id, title)| format!("{{\"id\": {id}, \"original_title\": {title:?}}}"))
            .collect::<Vec<_>>()
            .join("\n");

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message { role: "system".to_owned(), content: SYSTEM_PROMPT.to_owned() },
                Message { role: "user".to_owned(), content: user_content },
            ],
            response_format: ResponseFormat { format_type: "json_object".to_owned() },
        }
    }

    async fn send_once(&self, key: &str, request: &ChatRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Transport(e)
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            let body: ChatResponse = resp
                .json()
                .await
                .map_err(|e| LlmError::ParseError(format!("invalid chat response envelope: {e}")))?;
            let content = body
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::ParseError("empty response: no choices returned".to_owned()))?
                .message
                .content;
            return Ok(content);
        }

        let code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        if matches!(code, 401 | 403) {
            return Err(LlmError::AuthError { key_suffix: key_suffix(key), body: body_text });
        }
        if is_quota_exceeded(&body_text) {
            return Err(LlmError::QuotaExceeded(body_text));
        }
        if code == 429 {
            return Err(LlmError::RateLimited(body_text));
        }
        if matches!(code, 500 | 502 | 503 | 529) {
            return Err(LlmError::Transient5xx { code, body: body_text });
        }
        Err(LlmError::ParseError(format!("unexpected HTTP status {code}: {body_text}")))
    }

    fn parse_and_validate(
        content: &str,
        items: &[(i64, String)],
    ) -> Result<Vec<CleanedTitle>, LlmError> {
        let envelope: TopicsEnvelope = serde_json::from_str(content)
            .map_err(|e| LlmError::ParseError(format!("invalid topics envelope: {e}")))?;

        let expected: BTreeSet<i64> = items.iter().map(|(id, _)| *id).collect();
        let actual: BTreeSet<i64> = envelope.topics.iter().map(|t| t.id).collect();
        if expected != actual {
            return Err(LlmError::ParseError(format!(
                "envelope id mismatch: expected {expected:?}, got {actual:?}"
            )));
        }

        let mut by_id: HashMap<i64, CleanedTitle> =
            envelope.topics.into_iter().map(|t| (t.id, t)).collect();
        Ok(items.iter().filter_map(|(id, _)| by_id.remove(id)).collect())
    }
}

fn key_suffix(key: &str) -> String {
    let len = key.len();
    key.get(len.saturating_sub(4)..).unwrap_or(key).to_owned()
}

fn is_quota_exceeded(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("quota") && lower.contains("exceeded")
}
