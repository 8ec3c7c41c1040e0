//! OpenAI-compatible chat completions client
//!
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! Billing and key problems are reported as `CuratorError::Quota` so callers
//! can tell them apart from transient failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::naming::PlaylistMeta;
use super::{CuratorApi, CuratorError, DraftRequest, adapter, dto, prompts};
use crate::model::{Candidate, ChatReply, Song};

/// Chat completions API client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new("sk-test", "gpt-4o", base_url, Duration::from_secs(5))
    }

    /// Run one JSON-mode completion and return the message content
    async fn complete(&self, system: &str, user: &str) -> Result<String, CuratorError> {
        if self.api_key.is_empty() {
            return Err(CuratorError::Unconfigured("OpenAI API key".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = dto::ChatRequest {
            model: &self.model,
            messages: vec![
                dto::Message {
                    role: "system",
                    content: system,
                },
                dto::Message {
                    role: "user",
                    content: user,
                },
            ],
            response_format: dto::ResponseFormat::json_object(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CuratorError::Timeout
                } else {
                    CuratorError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = response.json::<dto::ErrorResponse>().await.ok();
            return Err(classify_failure(status, error.map(|e| e.error)));
        }

        let response = response
            .json::<dto::ChatResponse>()
            .await
            .map_err(|e| CuratorError::Parse(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CuratorError::Parse("empty completion".to_string()))
    }
}

/// Map a non-success status to an error kind.
fn classify_failure(status: StatusCode, error: Option<dto::ErrorBody>) -> CuratorError {
    let message = error
        .as_ref()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )
        });
    let quota_code = error.as_ref().is_some_and(|e| {
        e.code.as_deref() == Some("insufficient_quota")
            || e.error_type.as_deref() == Some("insufficient_quota")
    });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::PAYMENT_REQUIRED | StatusCode::FORBIDDEN => {
            CuratorError::Quota(message)
        }
        StatusCode::TOO_MANY_REQUESTS if quota_code => CuratorError::Quota(message),
        StatusCode::TOO_MANY_REQUESTS => CuratorError::Network(message),
        s if s.is_server_error() => CuratorError::Network(message),
        _ => CuratorError::Api(message),
    }
}

#[async_trait]
impl CuratorApi for OpenAiClient {
    async fn draft_candidates(&self, request: &DraftRequest) -> Result<Vec<Candidate>, CuratorError> {
        let content = self
            .complete(&prompts::draft_system(request.count), &prompts::draft_user(request))
            .await?;
        adapter::to_candidates(&content)
    }

    async fn chat_reply(&self, prompt: &str) -> Result<ChatReply, CuratorError> {
        let content = self.complete(prompts::CHAT_SYSTEM, prompt).await?;
        adapter::to_chat_reply(&content)
    }

    async fn describe_playlist(
        &self,
        liked: &[Song],
        prompt: &str,
    ) -> Result<Option<PlaylistMeta>, CuratorError> {
        let content = self
            .complete(prompts::NAMING_SYSTEM, &prompts::naming_user(liked, prompt))
            .await?;
        adapter::to_playlist_meta(&content)
    }
}
