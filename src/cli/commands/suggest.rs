//! Session commands: prompt, generate more, swipe, list.

use tokio::runtime::Runtime;

use super::{build_service, cancel_on_ctrl_c, explain, open_pool, print_song};
use crate::config::Config;
use crate::generator::GenerationOutcome;
use crate::model::SwipeAction;
use crate::session::SessionService;

/// Submit a prompt and print the first batch
pub fn cmd_suggest(rt: &Runtime, config: &Config, prompt: &str, force: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        let cancel = cancel_on_ctrl_c();

        let reply = service
            .submit_prompt(prompt, force, &cancel)
            .await
            .map_err(explain)?;

        println!("{}", reply.message);
        println!();
        println!("Session: {}", reply.session.id);
        match &reply.outcome {
            Some(outcome) => print_outcome(outcome),
            None => println!("No songs yet. Re-run with --force to get suggestions anyway."),
        }
        Ok(())
    })
}

/// Generate another batch for a session
pub fn cmd_more(rt: &Runtime, config: &Config, session: Option<&str>) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        let session_id = resolve_session(&service, session).await?;
        let cancel = cancel_on_ctrl_c();

        println!("Session: {}", session_id);
        let outcome = service
            .generate_more(&session_id, &cancel)
            .await
            .map_err(explain)?;
        print_outcome(&outcome);
        Ok(())
    })
}

/// Record a like or skip
pub fn cmd_swipe(
    rt: &Runtime,
    config: &Config,
    session: &str,
    song_id: &str,
    action: SwipeAction,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        service.swipe(session, song_id, action).await?;
        match action {
            SwipeAction::Like => println!("♥ Liked {}", song_id),
            SwipeAction::Skip => println!("✗ Skipped {}", song_id),
        }
        Ok(())
    })
}

/// List a session's songs with their swipe state
pub fn cmd_songs(rt: &Runtime, config: &Config, session: Option<&str>) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, open_pool(config).await?);
        let session_id = resolve_session(&service, session).await?;
        let songs = service.songs(&session_id).await?;

        if songs.is_empty() {
            println!("No songs in session {}", session_id);
            return Ok(());
        }

        let liked = songs
            .iter()
            .filter(|s| s.swipe == Some(SwipeAction::Like))
            .count();
        println!("Session {} ({} songs, {} liked)", session_id, songs.len(), liked);
        println!("{:-<60}", "");
        for (i, entry) in songs.iter().enumerate() {
            print_song(i, &entry.song, entry.swipe);
        }
        Ok(())
    })
}

/// The given session id, or the owner's latest session.
pub(super) async fn resolve_session(
    service: &SessionService,
    session: Option<&str>,
) -> anyhow::Result<String> {
    match session {
        Some(id) => Ok(id.to_string()),
        None => Ok(service.latest_session().await?.id),
    }
}

fn print_outcome(outcome: &GenerationOutcome) {
    if outcome.songs.is_empty() {
        println!("No songs found for this vibe. Try describing it differently.");
        return;
    }
    println!("{:-<60}", "");
    for (i, song) in outcome.songs.iter().enumerate() {
        print_song(i, song, None);
    }
    println!("{:-<60}", "");
    if outcome.is_short() {
        println!(
            "⚠ Only found {} of {} songs",
            outcome.songs.len(),
            outcome.target
        );
    }
    if outcome.fallback_used {
        println!("Some songs came from catalog search instead of the model.");
    }
    println!("Swipe with: vibe-swipe swipe <session> <song-id> like|skip");
}
