//! Session workflows: the entry points behind the CLI.
//!
//! A session starts with a submitted prompt. Every song issued in it is stored
//! so "generate more" can rebuild the session's duplicate tracker, swipes are
//! recorded against those songs, and the liked set becomes a playlist that can
//! be exported. All reads and writes are scoped to one owner.

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::curator::{CuratorApi, PlaylistMeta};
use crate::db::{self, Session, SessionSong};
use crate::dedup::DuplicateTracker;
use crate::error::{Error, Result, ResultExt};
use crate::export::{ExportSummary, PlaylistExporter};
use crate::generator::{GenerationOutcome, SuggestionGenerator};
use crate::model::{GenerationRequest, Playlist, SwipeAction};

/// Longest accepted playlist title
const MAX_TITLE_CHARS: usize = 50;

/// Reply to a submitted prompt.
#[derive(Debug, Clone)]
pub struct PromptReply {
    pub session: Session,
    pub message: String,
    /// `None` when the prompt was conversational
    pub outcome: Option<GenerationOutcome>,
}

pub struct SessionService {
    pool: SqlitePool,
    generator: SuggestionGenerator,
    curator: Arc<dyn CuratorApi>,
    exporter: PlaylistExporter,
    owner_id: String,
}

impl SessionService {
    pub fn new(
        pool: SqlitePool,
        generator: SuggestionGenerator,
        curator: Arc<dyn CuratorApi>,
        exporter: PlaylistExporter,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            generator,
            curator,
            exporter,
            owner_id: owner_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn target_count(&self) -> usize {
        self.generator.policy().target_count
    }

    fn fresh_tracker(&self) -> DuplicateTracker {
        DuplicateTracker::new(self.generator.policy().max_per_artist)
    }

    /// Submit a prompt: chat reply, a new session, and its first batch.
    pub async fn submit_prompt(
        &self,
        prompt: &str,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<PromptReply> {
        let request = GenerationRequest::new(prompt, self.target_count());
        let mut tracker = self.fresh_tracker();
        let response = self
            .generator
            .respond(&request, force, &mut tracker, cancel)
            .await?;

        let session = db::create_session(&self.pool, &self.owner_id, request.trimmed_prompt())
            .await
            .with_context("creating session")?;
        if let Some(outcome) = &response.outcome {
            db::append_session_songs(&self.pool, &session.id, &outcome.songs)
                .await
                .with_context("storing suggestions")?;
        }

        tracing::info!(
            target: "vibe_swipe::session",
            session = %session.id,
            songs = response.outcome.as_ref().map_or(0, |o| o.songs.len()),
            "Prompt submitted"
        );

        Ok(PromptReply {
            session,
            message: response.message,
            outcome: response.outcome,
        })
    }

    /// Another batch for an existing session, excluding everything it issued.
    pub async fn generate_more(
        &self,
        session_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome> {
        let session = self.owned_session(session_id).await?;
        let issued = db::session_songs(&self.pool, &session.id)
            .await
            .with_context("loading session songs")?;
        let mut tracker = db::load_tracker(
            &self.pool,
            &session.id,
            self.generator.policy().max_per_artist,
        )
        .await
        .with_context("rebuilding duplicate tracker")?;

        let request = GenerationRequest::new(session.prompt.clone(), self.target_count())
            .excluding(issued.into_iter().map(|s| s.song.id));
        let outcome = self.generator.generate(&request, &mut tracker, cancel).await?;

        db::append_session_songs(&self.pool, &session.id, &outcome.songs)
            .await
            .with_context("storing suggestions")?;
        Ok(outcome)
    }

    /// The owner's most recent session.
    pub async fn latest_session(&self) -> Result<Session> {
        db::latest_session(&self.pool, &self.owner_id)
            .await?
            .ok_or_else(|| Error::not_found("no sessions yet; run `vibe-swipe suggest` first"))
    }

    pub async fn songs(&self, session_id: &str) -> Result<Vec<SessionSong>> {
        let session = self.owned_session(session_id).await?;
        Ok(db::session_songs(&self.pool, &session.id).await?)
    }

    pub async fn swipe(&self, session_id: &str, song_id: &str, action: SwipeAction) -> Result<()> {
        let session = self.owned_session(session_id).await?;
        if !db::record_swipe(&self.pool, &session.id, song_id, action).await? {
            return Err(Error::not_found(format!("song {} in session {}", song_id, session.id)));
        }
        tracing::debug!(target: "vibe_swipe::session", song = song_id, action = action.as_str(), "Swipe recorded");
        Ok(())
    }

    /// Turn the session's liked songs into a stored playlist.
    ///
    /// The title comes from `title` when given, else from the model, else
    /// from the deterministic fallback.
    pub async fn finalize(&self, session_id: &str, title: Option<&str>) -> Result<Playlist> {
        let session = self.owned_session(session_id).await?;
        let liked = db::liked_songs(&self.pool, &session.id).await?;
        if liked.is_empty() {
            return Err(Error::invalid("like at least one song before creating a playlist"));
        }

        let mut meta = match self.curator.describe_playlist(&liked, &session.prompt).await {
            Ok(Some(meta)) => meta,
            Ok(None) => PlaylistMeta::fallback(&liked, &session.prompt),
            Err(e) => {
                tracing::warn!(target: "vibe_swipe::session", "Playlist naming failed, using fallback: {}", e);
                PlaylistMeta::fallback(&liked, &session.prompt)
            }
        };
        if let Some(title) = title {
            meta.title = clean_title(title)?;
        }

        let playlist = db::create_playlist(
            &self.pool,
            &self.owner_id,
            &meta.title,
            Some(&meta.description),
            &liked,
        )
        .await
        .with_context("saving playlist")?;
        tracing::info!(target: "vibe_swipe::session", playlist = playlist.id, songs = liked.len(), "Playlist created");
        Ok(playlist)
    }

    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        Ok(db::list_playlists(&self.pool, &self.owner_id).await?)
    }

    pub async fn playlist(&self, playlist_id: i64) -> Result<Playlist> {
        db::get_playlist(&self.pool, playlist_id, &self.owner_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("playlist {}", playlist_id)))
    }

    pub async fn rename_playlist(&self, playlist_id: i64, title: &str) -> Result<()> {
        let title = clean_title(title)?;
        if !db::rename_playlist(&self.pool, playlist_id, &self.owner_id, &title).await? {
            return Err(Error::not_found(format!("playlist {}", playlist_id)));
        }
        Ok(())
    }

    pub async fn delete_playlist(&self, playlist_id: i64) -> Result<()> {
        if !db::delete_playlist(&self.pool, playlist_id, &self.owner_id).await? {
            return Err(Error::not_found(format!("playlist {}", playlist_id)));
        }
        Ok(())
    }

    /// Export a stored playlist with the user's catalog token.
    ///
    /// `account_id` defaults to the token's owner.
    pub async fn export_playlist(
        &self,
        playlist_id: i64,
        access_token: &str,
        account_id: Option<&str>,
    ) -> Result<ExportSummary> {
        let playlist = self.playlist(playlist_id).await?;
        let description = playlist.description.as_deref();

        let summary = match account_id {
            Some(owner) => {
                self.exporter
                    .export(access_token, owner, &playlist.title, &playlist.songs, description)
                    .await?
            }
            None => {
                self.exporter
                    .export_for_current_user(access_token, &playlist.title, &playlist.songs, description)
                    .await?
            }
        };

        db::set_export_url(&self.pool, playlist.id, &self.owner_id, &summary.playlist_url)
            .await
            .with_context("saving export link")?;
        Ok(summary)
    }

    async fn owned_session(&self, session_id: &str) -> Result<Session> {
        match db::get_session(&self.pool, session_id).await? {
            Some(session) if session.owner_id == self.owner_id => Ok(session),
            _ => Err(Error::not_found(format!("session {}", session_id))),
        }
    }
}

fn clean_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::invalid("playlist title is empty"));
    }
    Ok(title.chars().take(MAX_TITLE_CHARS).collect())
}
