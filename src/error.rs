//! Error type shared by the session workflows.
//!
//! Each subsystem keeps its own `thiserror` enum
//! (e.g. [`GenerationError`](crate::generator::GenerationError)); [`Error`]
//! wraps them for code that crosses subsystems. The CLI converts to `anyhow`.
//!
//! # Example
//!
//! ```ignore
//! use vibe_swipe::error::{Error, Result, ResultExt};
//!
//! async fn liked(pool: &SqlitePool, session: &str) -> Result<Vec<Song>> {
//!     db::liked_songs(pool, session).await.with_context("loading liked songs")
//! }
//! ```

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure a session workflow can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog or preview service error
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] crate::enrichment::EnrichmentError),

    /// Language-model service error
    #[error("Curator error: {0}")]
    Curator(#[from] crate::curator::CuratorError),

    /// Suggestion generation failed
    #[error(transparent)]
    Generation(#[from] crate::generator::GenerationError),

    /// Playlist export failed
    #[error("Export failed: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Session, song or playlist that does not exist (or belongs to someone else)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected before doing any work
    #[error("Invalid request: {0}")]
    Invalid(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid request error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationError;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("playlist 42");
        assert!(err.to_string().contains("playlist 42"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::invalid("no liked songs").context("while finalizing session");
        let msg = err.to_string();
        assert!(msg.contains("while finalizing session"));
        assert!(msg.contains("no liked songs"));
    }

    #[test]
    fn test_generation_error_is_transparent() {
        let err: Error = GenerationError::ServiceUnavailable("quota".to_string()).into();
        assert_eq!(err.to_string(), "Suggestion service unavailable: quota");
    }

    #[test]
    fn test_root_skips_context() {
        let err = Error::from(GenerationError::Cancelled)
            .context("outer")
            .context("outermost");
        assert!(matches!(err.root(), Error::Generation(GenerationError::Cancelled)));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::invalid("test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}
