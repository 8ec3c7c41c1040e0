//! Chat completions Data Transfer Objects
//!
//! Request/response shapes of the OpenAI-compatible chat completions endpoint,
//! plus the JSON payloads our prompts ask the model to put in its message.
//! DO NOT use these types outside the curator module - convert to domain types.
//!
//! API Reference: https://platform.openai.com/docs/api-reference/chat

use serde::{Deserialize, Serialize};

/// Body for `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message<'a>>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

/// Response from `POST /chat/completions`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Error body returned on non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}

/// Payload requested by the candidate prompt.
///
/// Entries stay untyped here; the adapter validates each one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongsPayload {
    #[serde(default)]
    pub songs: Vec<serde_json::Value>,
}

/// Payload requested by the chat prompt
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub message: Option<String>,
    #[serde(default)]
    pub should_show_suggestions: bool,
}

/// Payload requested by the playlist naming prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistMetaPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}
