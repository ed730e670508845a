//! Wire types for the chat-completions request/response shape.
//!
//! This client does not use a structured function-calling API: it asks for
//! `response_format: {"type": "json_object"}` and validates the returned JSON
//! itself against [`topicforge_core::CleanedTitle`].

use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub response_format: ResponseFormat,
}

#[derive(Serialize, Clone)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Serialize, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

/// The envelope the LLM is instructed (in the prompt) to return: a bare JSON
/// array under a `topics` key, one entry per input id. Some providers insist
/// on wrapping arrays in an object when `json_object` mode is requested, so
/// the prompt asks for `{"topics": [...]}` rather than a bare top-level array.
#[derive(Deserialize)]
pub struct TopicsEnvelope {
    pub topics: Vec<topicforge_core::CleanedTitle>,
}
