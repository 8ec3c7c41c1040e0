//! Language-model curator - drafts candidate songs and playlist copy.
//!
//! - `client.rs` talks to an OpenAI-compatible chat completions endpoint
//! - `prompts.rs` holds the prompt text
//! - `adapter.rs` validates the loosely typed JSON the model returns
//! - `naming.rs` covers playlist titles, including the offline fallback
//!
//! The generator depends on the [`CuratorApi`] trait, so tests drive it with
//! [`mocks::MockCurator`].

mod adapter;
mod client;
pub mod dto;
mod naming;
mod prompts;

use async_trait::async_trait;

use crate::model::{Candidate, ChatReply, Song};

pub use client::OpenAiClient;
pub use naming::PlaylistMeta;

/// Errors from the language-model service
#[derive(Debug, Clone, thiserror::Error)]
pub enum CuratorError {
    /// Key rejected or credits exhausted; retrying will not help
    #[error("Quota or billing problem: {0}")]
    Quota(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("Missing configuration: {0}")]
    Unconfigured(String),
}

impl CuratorError {
    /// Whether the service cannot be used at all with the current setup.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CuratorError::Quota(_) | CuratorError::Unconfigured(_))
    }

    /// Whether a later attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CuratorError::Network(_) | CuratorError::Timeout)
    }
}

/// One request for a batch of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRequest {
    pub prompt: String,
    pub count: usize,
    /// Artists already shown in the session
    pub avoid_artists: Vec<String>,
    /// "Title by Artist" labels already surfaced
    pub avoid_songs: Vec<String>,
}

impl DraftRequest {
    pub fn new(prompt: impl Into<String>, count: usize) -> Self {
        Self {
            prompt: prompt.into(),
            count,
            avoid_artists: Vec::new(),
            avoid_songs: Vec::new(),
        }
    }
}

/// Language-model operations used by the pipeline
#[async_trait]
pub trait CuratorApi: Send + Sync {
    /// Ask for a batch of candidate songs.
    async fn draft_candidates(&self, request: &DraftRequest) -> Result<Vec<Candidate>, CuratorError>;

    /// Short conversational reply to a prompt.
    async fn chat_reply(&self, prompt: &str) -> Result<ChatReply, CuratorError>;

    /// Title and description for a liked set; `None` when the model gave no title.
    async fn describe_playlist(
        &self,
        liked: &[Song],
        prompt: &str,
    ) -> Result<Option<PlaylistMeta>, CuratorError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(CuratorError::Quota("x".into()).is_unavailable());
        assert!(CuratorError::Unconfigured("x".into()).is_unavailable());
        assert!(!CuratorError::Timeout.is_unavailable());
        assert!(CuratorError::Timeout.is_transient());
        assert!(CuratorError::Network("x".into()).is_transient());
        assert!(!CuratorError::Parse("x".into()).is_transient());
    }

    #[tokio::test]
    async fn test_mock_serves_batches_in_order() {
        use mocks::{MockCurator, candidates};

        let mock = MockCurator::with_batches(vec![candidates(&[("A", "X")])])
            .then(Err(CuratorError::Timeout));
        let req = DraftRequest::new("p", 5);
        assert_eq!(mock.draft_candidates(&req).await.unwrap().len(), 1);
        assert!(mock.draft_candidates(&req).await.is_err());
        assert!(mock.draft_candidates(&req).await.unwrap().is_empty());
        assert_eq!(mock.draft_count(), 3);
    }
}
