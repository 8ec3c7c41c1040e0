//! Adapter layer: Convert model output to domain models
//!
//! This is the ONLY place where language-model JSON is turned into domain
//! types. Model output is loosely typed, so every entry is validated here:
//! malformed entries are rejected and missing numeric fields get explicit
//! defaults.

use serde_json::Value;

use super::CuratorError;
use super::dto;
use super::naming::PlaylistMeta;
use crate::model::{Candidate, ChatReply, DEFAULT_DURATION_SECS, Genres};

/// Most genre tags kept per candidate
const MAX_GENRES: usize = 3;
const MAX_TITLE_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 150;
/// Longer durations are treated as garbage, not as a real track
const MAX_DURATION_SECS: u32 = 6 * 60 * 60;

/// Parse the candidate payload, skipping entries that fail validation.
pub fn to_candidates(content: &str) -> Result<Vec<Candidate>, CuratorError> {
    let entries = match serde_json::from_str::<Value>(content)
        .map_err(|e| CuratorError::Parse(e.to_string()))?
    {
        Value::Array(entries) => entries,
        value => {
            serde_json::from_value::<dto::SongsPayload>(value)
                .map_err(|e| CuratorError::Parse(e.to_string()))?
                .songs
        }
    };

    let total = entries.len();
    let candidates: Vec<Candidate> = entries.iter().filter_map(to_candidate).collect();
    if candidates.len() < total {
        tracing::debug!(
            target: "vibe_swipe::curator",
            rejected = total - candidates.len(),
            total,
            "Dropped malformed candidates"
        );
    }
    Ok(candidates)
}

/// Validate one entry.
pub fn to_candidate(entry: &Value) -> Option<Candidate> {
    let obj = entry.as_object()?;
    let title = non_empty_str(obj.get("title"))?;
    let artist = non_empty_str(obj.get("artist"))?;

    Some(Candidate {
        title,
        artist,
        album: non_empty_str(obj.get("album")),
        genres: genres(obj.get("genres")),
        energy: unit_interval(obj.get("energy"))?,
        valence: unit_interval(obj.get("valence"))?,
        duration: duration_secs(obj.get("duration")),
    })
}

pub fn to_chat_reply(content: &str) -> Result<ChatReply, CuratorError> {
    let payload: dto::ChatPayload =
        serde_json::from_str(content).map_err(|e| CuratorError::Parse(e.to_string()))?;
    Ok(ChatReply {
        message: payload
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ChatReply::DEFAULT_MESSAGE.to_string()),
        should_suggest: payload.should_show_suggestions,
    })
}

/// Parse naming output; `None` when no usable title came back.
pub fn to_playlist_meta(content: &str) -> Result<Option<PlaylistMeta>, CuratorError> {
    let payload: dto::PlaylistMetaPayload =
        serde_json::from_str(content).map_err(|e| CuratorError::Parse(e.to_string()))?;

    let Some(title) = payload.title.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    Ok(Some(PlaylistMeta {
        title: truncate_chars(title.trim(), MAX_TITLE_CHARS),
        description: payload
            .description
            .filter(|d| !d.trim().is_empty())
            .map(|d| truncate_chars(d.trim(), MAX_DESCRIPTION_CHARS))
            .unwrap_or_else(|| PlaylistMeta::DEFAULT_DESCRIPTION.to_string()),
    }))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn genres(value: Option<&Value>) -> Genres {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|g| non_empty_str(Some(g)))
            .take(MAX_GENRES)
            .collect(),
        Some(Value::String(_)) => non_empty_str(value).into_iter().collect(),
        _ => Genres::new(),
    }
}

/// Missing or null → 0.5; numbers clamp to [0, 1]; anything else is invalid.
fn unit_interval(value: Option<&Value>) -> Option<f32> {
    match value {
        None | Some(Value::Null) => Some(0.5),
        Some(Value::Number(n)) => n.as_f64().map(|v| v.clamp(0.0, 1.0) as f32),
        Some(_) => None,
    }
}

/// Seconds from a number or an "m:ss" string; anything unusable → default.
fn duration_secs(value: Option<&Value>) -> u32 {
    let secs = match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite() && *v > 0.0).map(|v| {
            // Values this large are milliseconds
            if v >= 10_000.0 { v / 1000.0 } else { v }
        }),
        Some(Value::String(s)) => parse_clock(s),
        _ => None,
    };
    secs.map(f64::round)
        .filter(|v| *v >= 1.0 && *v <= f64::from(MAX_DURATION_SECS))
        .map(|v| v as u32)
        .unwrap_or(DEFAULT_DURATION_SECS)
}

fn parse_clock(s: &str) -> Option<f64> {
    let s = s.trim();
    match s.split_once(':') {
        Some((m, sec)) => {
            let m: u32 = m.trim().parse().ok()?;
            let sec: u32 = sec.trim().parse().ok()?;
            let total = m.checked_mul(60)?.checked_add(sec)?;
            (sec < 60).then_some(f64::from(total))
        }
        None => s.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
