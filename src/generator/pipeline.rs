//! The generation state machine.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use super::mood::MoodCategory;
use super::policy::{AcceptancePolicy, GenerationPolicy};
use super::{GenerationError, GenerationOutcome};
use crate::curator::{CuratorApi, CuratorError, DraftRequest};
use crate::dedup::{Admission, DuplicateTracker, IssuedSong};
use crate::enrichment::{
    CatalogApi, EnrichmentError, PreviewCatalogApi, PreviewHit, PreviewResolver, TrackMatch,
};
use crate::model::{Candidate, ChatReply, DEFAULT_DURATION_SECS, GenerationRequest, Genres, Song};

/// Answer to a submitted prompt
#[derive(Debug, Clone)]
pub struct PromptResponse {
    pub message: String,
    /// `None` when the prompt was conversational and suggestions were not forced
    pub outcome: Option<GenerationOutcome>,
}

/// A candidate that passed the filter and waits for enrichment.
struct Pending {
    candidate: Candidate,
    /// Already-resolved catalog match (fallback results)
    matched: Option<TrackMatch>,
}

enum Phase {
    Draft,
    Filter(Vec<Pending>),
    Enrich(VecDeque<Pending>),
    Fallback,
    Done,
}

/// Mutable state of one run.
struct Run {
    prompt: String,
    target: usize,
    category: MoodCategory,
    exclude_ids: Vec<String>,
    songs: Vec<Song>,
    drafts_sent: usize,
    drafted_ok: bool,
    fallback_used: bool,
}

impl Run {
    fn remaining(&self) -> usize {
        self.target.saturating_sub(self.songs.len())
    }
}

/// Orchestrates curator, catalog and preview lookups into a song batch
pub struct SuggestionGenerator {
    curator: Arc<dyn CuratorApi>,
    catalog: Arc<dyn CatalogApi>,
    previews: PreviewResolver,
    policy: GenerationPolicy,
}

impl SuggestionGenerator {
    pub fn new(
        curator: Arc<dyn CuratorApi>,
        catalog: Arc<dyn CatalogApi>,
        secondary: Arc<dyn PreviewCatalogApi>,
        policy: GenerationPolicy,
    ) -> Self {
        Self {
            previews: PreviewResolver::new(Arc::clone(&catalog), secondary),
            curator,
            catalog,
            policy,
        }
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Handle a submitted prompt: chat reply first, then suggestions when the
    /// reply asks for them or `force` is set.
    pub async fn respond(
        &self,
        request: &GenerationRequest,
        force: bool,
        tracker: &mut DuplicateTracker,
        cancel: &CancellationToken,
    ) -> Result<PromptResponse, GenerationError> {
        let prompt = request.trimmed_prompt();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidInput("prompt is empty".to_string()));
        }

        let reply = match self.bounded(cancel, self.curator.chat_reply(prompt)).await? {
            Ok(reply) => reply,
            Err(e) if e.is_unavailable() => {
                return Err(GenerationError::ServiceUnavailable(e.to_string()));
            }
            Err(e) => {
                tracing::warn!(target: "vibe_swipe::generator", "Chat reply failed: {}", e);
                ChatReply {
                    message: ChatReply::DEFAULT_MESSAGE.to_string(),
                    should_suggest: true,
                }
            }
        };

        let outcome = if reply.should_suggest || force {
            Some(self.generate(request, tracker, cancel).await?)
        } else {
            None
        };

        Ok(PromptResponse {
            message: reply.message,
            outcome,
        })
    }

    /// Produce up to `request.target_count` enriched, non-duplicate songs.
    ///
    /// The tracker is only updated when the run completes; a failed or
    /// cancelled run leaves it untouched.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        tracker: &mut DuplicateTracker,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerationError> {
        let prompt = request.trimmed_prompt();
        if prompt.is_empty() {
            return Err(GenerationError::InvalidInput("prompt is empty".to_string()));
        }
        if request.target_count == 0 {
            return Err(GenerationError::InvalidInput(
                "target count must be at least 1".to_string(),
            ));
        }

        let mut working = tracker.clone();
        working.exclude_ids(&request.exclude_ids);
        working.begin_batch();

        let mut run = Run {
            prompt: prompt.to_string(),
            target: request.target_count,
            category: MoodCategory::detect(prompt),
            exclude_ids: request.exclude_ids.clone(),
            songs: Vec::with_capacity(request.target_count),
            drafts_sent: 0,
            drafted_ok: false,
            fallback_used: false,
        };

        tracing::info!(
            target: "vibe_swipe::generator",
            prompt_len = prompt.len(),
            target = run.target,
            category = run.category.name(),
            excluded = request.exclude_ids.len(),
            "Starting generation"
        );

        let mut phase = Phase::Draft;

        loop {
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }

            phase = match phase {
                Phase::Draft => self.draft(&mut run, &working, cancel).await?,

                Phase::Filter(pending) => {
                    let admitted = filter(&mut working, pending);
                    if admitted.is_empty() {
                        Phase::Draft
                    } else {
                        Phase::Enrich(admitted)
                    }
                }

                Phase::Enrich(queue) => {
                    self.enrich(&mut run, &mut working, queue, cancel)
                        .await?;
                    Phase::Draft
                }

                Phase::Fallback => {
                    run.fallback_used = true;
                    self.fallback(&mut run, &mut working, cancel)
                        .await?;
                    Phase::Done
                }

                Phase::Done => break,
            };
        }

        for song in &run.songs {
            working.record_issued(
                song.id.clone(),
                IssuedSong {
                    key: song.duplicate_key(),
                    label: song.label(),
                    artist: song.artist.clone(),
                },
            );
        }
        *tracker = working;

        tracing::info!(
            target: "vibe_swipe::generator",
            accepted = run.songs.len(),
            target = run.target,
            round = run.drafts_sent,
            fallback = run.fallback_used,
            "Generation finished"
        );

        Ok(GenerationOutcome {
            target: run.target,
            rounds: run.drafts_sent,
            fallback_used: run.fallback_used,
            songs: run.songs,
        })
    }

    /// Draft phase: ask the model for candidates, or decide where to go next.
    async fn draft(
        &self,
        run: &mut Run,
        tracker: &DuplicateTracker,
        cancel: &CancellationToken,
    ) -> Result<Phase, GenerationError> {
        if run.remaining() == 0 {
            return Ok(Phase::Done);
        }
        if run.drafts_sent >= self.policy.draft_budget() {
            return Ok(Phase::Fallback);
        }

        let request = self.draft_request(run, tracker);
        run.drafts_sent += 1;
        tracing::info!(
            target: "vibe_swipe::generator",
            round = run.drafts_sent,
            accepted = run.songs.len(),
            target = run.target,
            requested = request.count,
            "Drafting candidates"
        );

        let result = self
            .bounded(cancel, self.curator.draft_candidates(&request))
            .await?;

        match result {
            Ok(candidates) => {
                run.drafted_ok = true;
                tracing::info!(
                    target: "vibe_swipe::generator",
                    round = run.drafts_sent,
                    received = candidates.len(),
                    "Draft received"
                );
                Ok(Phase::Filter(
                    candidates
                        .into_iter()
                        .map(|candidate| Pending {
                            candidate,
                            matched: None,
                        })
                        .collect(),
                ))
            }
            Err(e) if e.is_unavailable() || e.is_transient() => {
                if run.drafted_ok {
                    tracing::warn!(target: "vibe_swipe::generator", "Draft failed after earlier success, falling back: {}", e);
                    Ok(Phase::Fallback)
                } else if e.is_transient() && run.drafts_sent < self.policy.draft_budget() {
                    tracing::warn!(target: "vibe_swipe::generator", round = run.drafts_sent, "Draft failed, retrying: {}", e);
                    Ok(Phase::Draft)
                } else {
                    Err(GenerationError::ServiceUnavailable(e.to_string()))
                }
            }
            Err(e) => {
                // Unusable output counts as an empty batch
                tracing::warn!(target: "vibe_swipe::generator", round = run.drafts_sent, "Draft unusable: {}", e);
                Ok(Phase::Draft)
            }
        }
    }

    fn draft_request(&self, run: &Run, tracker: &DuplicateTracker) -> DraftRequest {
        let mut request = DraftRequest::new(run.prompt.clone(), self.policy.draft_size(run.remaining()));

        request.avoid_artists = tracker.artists_for(&run.exclude_ids);
        request.avoid_songs = tracker.labels_for(&run.exclude_ids);
        for song in &run.songs {
            if !request
                .avoid_artists
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&song.artist))
            {
                request.avoid_artists.push(song.artist.clone());
            }
            request.avoid_songs.push(song.label());
        }
        request
    }

    /// Enrich phase: resolve admitted candidates window by window.
    ///
    /// Each window holds at most `remaining` candidates so the batch can never
    /// overshoot the target. Results are applied in admission order.
    async fn enrich(
        &self,
        run: &mut Run,
        tracker: &mut DuplicateTracker,
        mut queue: VecDeque<Pending>,
        cancel: &CancellationToken,
    ) -> Result<(), GenerationError> {
        while !queue.is_empty() && run.remaining() > 0 {
            let access_token = self.ensure_token(cancel).await?;
            let take = run.remaining().min(queue.len());
            let window: Vec<Pending> = queue.drain(..take).collect();

            let category = run.category;
            let lookups = stream::iter(window)
                .map(|pending| {
                    let access_token = access_token.clone();
                    async move {
                        let song = self.enrich_one(&pending, &access_token, category).await;
                        (pending.candidate, song)
                    }
                })
                .buffered(self.policy.enrich_concurrency)
                .collect::<Vec<_>>();

            let results = tokio::select! {
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                results = lookups => results,
            };
            if cancel.is_cancelled() {
                return Err(GenerationError::Cancelled);
            }

            for (candidate, song) in results {
                self.apply(run, tracker, candidate, song);
            }
        }

        // Whatever is left was admitted but never needed
        for pending in queue {
            tracker.release_artist(&pending.candidate.artist);
        }
        Ok(())
    }

    /// Put one enrichment result into the batch, or give its artist slot back.
    fn apply(
        &self,
        run: &mut Run,
        tracker: &mut DuplicateTracker,
        candidate: Candidate,
        song: Option<Song>,
    ) {
        let Some(mut song) = song else {
            tracker.release_artist(&candidate.artist);
            return;
        };

        if run.remaining() == 0 {
            tracker.release_artist(&candidate.artist);
            return;
        }

        // The catalog may spell the work differently from the model
        let canonical = song.duplicate_key();
        if canonical != candidate.duplicate_key() && tracker.seen(&canonical) {
            tracing::debug!(target: "vibe_swipe::generator", song = %song.label(), "Canonical duplicate dropped");
            tracker.release_artist(&candidate.artist);
            return;
        }

        // The throttle counts the credited artist, not the model's spelling
        if !tracker.transfer_artist(&candidate.artist, &song.artist) {
            tracing::debug!(target: "vibe_swipe::generator", song = %song.label(), "Credited artist throttled");
            tracker.release_artist(&candidate.artist);
            return;
        }
        tracker.remember(canonical);

        song.id = fresh_id(run.songs.len(), tracker);
        tracing::debug!(target: "vibe_swipe::generator", song = %song.label(), id = %song.id, "Accepted");
        run.songs.push(song);
    }

    /// Catalog match, preview resolution and acceptance check for one candidate.
    ///
    /// Failures are absorbed: the candidate is simply not accepted.
    async fn enrich_one(
        &self,
        pending: &Pending,
        access_token: &str,
        category: MoodCategory,
    ) -> Option<Song> {
        let candidate = &pending.candidate;

        let matched = match &pending.matched {
            Some(m) => Some(m.clone()),
            None => {
                let lookup = self
                    .with_catalog_token(access_token, |token| {
                        let catalog = Arc::clone(&self.catalog);
                        let title = candidate.title.clone();
                        let artist = candidate.artist.clone();
                        async move { catalog.search_track(&title, &artist, &token).await }
                    })
                    .await;
                match lookup {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!(target: "vibe_swipe::generator", candidate = %candidate.label(), "Catalog lookup failed: {}", e);
                        None
                    }
                }
            }
        };

        if matched.is_none() && self.policy.acceptance == AcceptancePolicy::Strict {
            tracing::debug!(target: "vibe_swipe::generator", candidate = %candidate.label(), "No catalog match");
            return None;
        }

        let (title, artist) = match &matched {
            Some(m) => (m.title.clone(), m.artist.clone()),
            None => (candidate.title.clone(), candidate.artist.clone()),
        };

        let preview = tokio::time::timeout(
            self.policy.call_timeout,
            self.previews.resolve_with_match(&title, &artist, matched.as_ref()),
        )
        .await
        .unwrap_or_else(|_| {
            tracing::warn!(target: "vibe_swipe::generator", candidate = %candidate.label(), "Preview lookup timed out");
            None
        });

        let song = build_song(candidate, matched, preview, category, title, artist);
        match self.policy.acceptance {
            AcceptancePolicy::Strict if !song.is_complete() => {
                tracing::debug!(target: "vibe_swipe::generator", candidate = %candidate.label(), "Missing art or preview");
                None
            }
            _ => Some(song),
        }
    }

    /// Fallback phase: canned catalog queries for the detected mood.
    async fn fallback(
        &self,
        run: &mut Run,
        tracker: &mut DuplicateTracker,
        cancel: &CancellationToken,
    ) -> Result<(), GenerationError> {
        if run.remaining() == 0 {
            return Ok(());
        }

        tracing::info!(
            target: "vibe_swipe::generator",
            category = run.category.name(),
            accepted = run.songs.len(),
            target = run.target,
            "Running fallback queries"
        );

        for query in run.category.fallback_queries(&run.prompt) {
            if run.remaining() == 0 {
                break;
            }

            let access_token = self.ensure_token(cancel).await?;
            let limit = self.policy.fallback_per_query;
            let search = self.with_catalog_token(&access_token, |token| {
                let catalog = Arc::clone(&self.catalog);
                let query = query.clone();
                async move { catalog.search(&query, limit, &token).await }
            });
            let matches = match cancellable(cancel, search).await? {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::warn!(target: "vibe_swipe::generator", %query, "Fallback query failed: {}", e);
                    continue;
                }
            };

            let pending = matches
                .into_iter()
                .map(|m| Pending {
                    candidate: fallback_candidate(&m, run.category),
                    matched: Some(m),
                })
                .collect();
            let admitted = filter(tracker, pending);
            self.enrich(run, tracker, admitted, cancel).await?;
        }
        Ok(())
    }

    /// Get the service token (cached by the client), retrying with backoff.
    async fn ensure_token(&self, cancel: &CancellationToken) -> Result<String, GenerationError> {
        let mut delay = self.policy.auth_backoff;
        let mut last_error = None;

        for attempt in 1..=self.policy.auth_attempts {
            let fetched = self.bounded(cancel, self.catalog.service_token()).await?;

            match fetched {
                Ok(fresh) => return Ok(fresh.access_token),
                Err(e @ EnrichmentError::Unconfigured(_)) => {
                    return Err(GenerationError::AuthFailure(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(target: "vibe_swipe::generator", attempt, "Catalog token request failed: {}", e);
                    last_error = Some(e);
                }
            }

            if attempt < self.policy.auth_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                delay *= 2;
            }
        }

        Err(GenerationError::AuthFailure(
            last_error.map_or_else(|| "no attempts made".to_string(), |e| e.to_string()),
        ))
    }

    /// Run a catalog call with a timeout; on 401 fetch a fresh token and retry once.
    async fn with_catalog_token<T, F, Fut>(
        &self,
        access_token: &str,
        call: F,
    ) -> Result<T, EnrichmentError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, EnrichmentError>>,
    {
        let timeout = self.policy.call_timeout;
        let first = tokio::time::timeout(timeout, call(access_token.to_string()))
            .await
            .unwrap_or(Err(EnrichmentError::Timeout));

        match first {
            Err(EnrichmentError::Unauthorized) => {
                tracing::debug!(target: "vibe_swipe::generator", "Catalog token rejected, refreshing");
                let fresh = tokio::time::timeout(timeout, self.catalog.service_token())
                    .await
                    .unwrap_or(Err(EnrichmentError::Timeout))?;
                tokio::time::timeout(timeout, call(fresh.access_token))
                    .await
                    .unwrap_or(Err(EnrichmentError::Timeout))
            }
            other => other,
        }
    }

    /// Await an external call under the per-call timeout, aborting on cancellation.
    async fn bounded<T, E, Fut>(
        &self,
        cancel: &CancellationToken,
        call: Fut,
    ) -> Result<Result<T, E>, GenerationError>
    where
        Fut: Future<Output = Result<T, E>>,
        E: TimedOut,
    {
        cancellable(cancel, tokio::time::timeout(self.policy.call_timeout, call))
            .await
            .map(|result| result.unwrap_or_else(|_| Err(E::timed_out())))
    }
}

/// Error types that have a timeout variant.
trait TimedOut {
    fn timed_out() -> Self;
}

impl TimedOut for CuratorError {
    fn timed_out() -> Self {
        CuratorError::Timeout
    }
}

impl TimedOut for EnrichmentError {
    fn timed_out() -> Self {
        EnrichmentError::Timeout
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = T>,
) -> Result<T, GenerationError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
        result = call => Ok(result),
    }
}

/// Filter phase: admit candidates through the tracker, in order.
fn filter(tracker: &mut DuplicateTracker, pending: Vec<Pending>) -> VecDeque<Pending> {
    let offered = pending.len();
    let admitted: VecDeque<Pending> = pending
        .into_iter()
        .filter(|p| match tracker.admit(&p.candidate) {
            Admission::Accepted => true,
            Admission::Duplicate => {
                tracing::debug!(target: "vibe_swipe::generator", candidate = %p.candidate.label(), "Duplicate skipped");
                false
            }
            Admission::ArtistThrottled => {
                tracing::debug!(target: "vibe_swipe::generator", candidate = %p.candidate.label(), "Artist throttled");
                false
            }
        })
        .collect();
    tracing::debug!(target: "vibe_swipe::generator", offered, admitted = admitted.len(), "Filtered candidates");
    admitted
}

/// `gen_{unix_millis}_{index}_{random hex}`, never one of the excluded ids.
fn fresh_id(index: usize, tracker: &DuplicateTracker) -> String {
    loop {
        let id = format!(
            "gen_{}_{}_{:08x}",
            chrono::Utc::now().timestamp_millis(),
            index,
            rand::random::<u32>()
        );
        if !tracker.is_excluded_id(&id) {
            return id;
        }
    }
}

fn category_genres(category: MoodCategory) -> Genres {
    category.genres().iter().take(2).map(|g| g.to_string()).collect()
}

/// Merge candidate, catalog match and preview into a song.
///
/// Title and artist are the catalog's canonical spelling when a match exists.
fn build_song(
    candidate: &Candidate,
    matched: Option<TrackMatch>,
    preview: Option<PreviewHit>,
    category: MoodCategory,
    title: String,
    artist: String,
) -> Song {
    let genres = if candidate.genres.is_empty() {
        category_genres(category)
    } else {
        candidate.genres.clone()
    };

    let (album, album_art, catalog_duration) = match matched {
        Some(m) => (m.album, m.album_art, m.duration_secs),
        None => (None, None, None),
    };
    let album_art = album_art.or_else(|| preview.as_ref().and_then(|p| p.artwork.clone()));

    Song {
        id: String::new(),
        title,
        artist,
        album: album.or_else(|| candidate.album.clone()),
        album_art,
        duration: catalog_duration
            .filter(|secs| *secs > 0)
            .unwrap_or(candidate.duration)
            .max(1),
        genres,
        energy: Some(candidate.energy),
        valence: Some(candidate.valence),
        preview_url: preview.map(|p| p.url),
    }
}

/// Candidate for a fallback search hit, styled after the mood.
fn fallback_candidate(matched: &TrackMatch, category: MoodCategory) -> Candidate {
    Candidate {
        title: matched.title.clone(),
        artist: matched.artist.clone(),
        album: matched.album.clone(),
        genres: category_genres(category),
        energy: category.energy(),
        valence: category.valence(),
        duration: matched.duration_secs.unwrap_or(DEFAULT_DURATION_SECS),
    }
}
