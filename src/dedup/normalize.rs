//! Normalization of (title, artist) pairs into a [`DuplicateKey`].
//!
//! The transform is deterministic and idempotent: lower-case, drop bracketed
//! or dashed version qualifiers ("(Remix)", "- Live at ...", "[feat. X]"),
//! drop featured-artist clauses, strip punctuation and collapse whitespace.

use std::fmt;

/// Words that mark a bracketed or dashed suffix as a version qualifier.
const QUALIFIERS: &[&str] = &[
    "remix", "live", "acoustic", "feat", "ft", "featuring", "with", "remaster",
    "remastered", "version", "edit", "mix", "demo", "radio", "extended", "mono",
    "stereo", "deluxe", "instrumental", "unplugged", "single", "explicit", "clean",
];

/// Words that start a featured-artist clause once punctuation is gone.
const FEATURE_MARKERS: &[&str] = &["feat", "ft", "featuring"];

/// Normalized identity of a musical work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey(String);

impl DuplicateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuild a key from its stored string form.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the duplicate key for a title and artist.
pub fn normalize(title: &str, artist: &str) -> DuplicateKey {
    DuplicateKey(format!("{}|{}", normalize_title(title), normalize_artist(artist)))
}

/// Normalize a song title.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let without_brackets = strip_qualified_groups(&lowered);
    let without_dash = strip_dash_qualifier(&without_brackets);
    strip_feature_clause(&collapse(without_dash))
}

/// Normalize an artist credit. "&" is read as "and" so "A & B" and
/// "A and B" collapse to the same key.
pub fn normalize_artist(artist: &str) -> String {
    let lowered = artist.to_lowercase().replace('&', " and ");
    let without_brackets = strip_qualified_groups(&lowered);
    strip_feature_clause(&collapse(&without_brackets))
}

/// Normalized lead artist of a credit, used for the per-artist throttle.
///
/// "Sam Smith ft. Kim Petras" and "Sam Smith & Calvin Harris" both map to
/// "sam smith".
pub fn primary_artist(artist: &str) -> String {
    let lowered = artist.to_lowercase();
    let cut = [" & ", ", ", " x ", " and ", " with "]
        .iter()
        .filter_map(|sep| lowered.find(sep))
        .min()
        .unwrap_or(lowered.len());
    normalize_artist(&lowered[..cut])
}

/// Remove `(...)` and `[...]` groups whose content contains a qualifier word.
fn strip_qualified_groups(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find(['(', '[']) {
        let close_char = if rest[open..].starts_with('(') { ')' } else { ']' };
        let Some(close_rel) = rest[open + 1..].find(close_char) else {
            break;
        };
        let close = open + 1 + close_rel;
        let inner = &rest[open + 1..close];

        out.push_str(&rest[..open]);
        if !has_qualifier(inner) {
            out.push(' ');
            out.push_str(inner);
            out.push(' ');
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Drop a " - Live at ..." style suffix when it starts with a qualifier word.
fn strip_dash_qualifier(input: &str) -> &str {
    match input.find(" - ") {
        Some(idx) if has_qualifier(&input[idx + 3..]) => &input[..idx],
        _ => input,
    }
}

/// Cut everything from the first featured-artist marker that is not the
/// leading word. Expects collapsed input.
fn strip_feature_clause(input: &str) -> String {
    let words: Vec<&str> = input.split(' ').collect();
    let end = words
        .iter()
        .skip(1)
        .position(|w| FEATURE_MARKERS.contains(w))
        .map_or(words.len(), |idx| idx + 1);
    words[..end].join(" ")
}

fn has_qualifier(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| QUALIFIERS.contains(&word))
}

/// Drop apostrophes, replace other punctuation with spaces and collapse runs
/// of whitespace.
fn collapse(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remix_suffix_is_ignored() {
        assert_eq!(
            normalize("Hello World (Remix)", "Artist"),
            normalize("hello world", "Artist")
        );
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(
            normalize("Don't Stop Me Now!", "QUEEN"),
            normalize("dont stop me now", "Queen")
        );
    }

    #[test]
    fn test_dash_live_suffix_stripped() {
        assert_eq!(
            normalize("Yellow - Live at Glastonbury", "Coldplay"),
            normalize("Yellow", "Coldplay")
        );
    }

    #[test]
    fn test_dash_without_qualifier_kept() {
        assert_ne!(
            normalize("Part One - The Beginning", "Band"),
            normalize("Part One", "Band")
        );
    }

    #[test]
    fn test_feature_clause_stripped_from_title_and_artist() {
        assert_eq!(
            normalize("Unholy (feat. Kim Petras)", "Sam Smith ft. Kim Petras"),
            normalize("Unholy", "Sam Smith")
        );
    }

    #[test]
    fn test_non_qualifier_brackets_kept() {
        // Parenthetical subtitles are part of the work's name
        assert_eq!(
            normalize_title("Montero (Call Me By Your Name)"),
            "montero call me by your name"
        );
    }

    #[test]
    fn test_ampersand_equals_and() {
        assert_eq!(normalize_artist("Simon & Garfunkel"), normalize_artist("Simon and Garfunkel"));
    }

    #[test]
    fn test_leading_feat_word_kept() {
        assert_eq!(normalize_title("Feat of Strength"), "feat of strength");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_title("  Blinding    Lights  "), "blinding lights");
    }

    #[test]
    fn test_primary_artist() {
        assert_eq!(primary_artist("Sam Smith ft. Kim Petras"), "sam smith");
        assert_eq!(primary_artist("The Kid LAROI & Justin Bieber"), "the kid laroi");
        assert_eq!(primary_artist("Daft Punk"), "daft punk");
    }

    #[test]
    fn test_unclosed_bracket_does_not_panic() {
        assert_eq!(normalize_title("Song (Remix"), "song remix");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn words() -> impl Strategy<Value = String> {
            prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9 ',.!?&-]{0,40}")
                .unwrap()
        }

        proptest! {
            /// Normalizing already-normalized text changes nothing
            #[test]
            fn normalize_title_is_idempotent(title in words()) {
                let once = normalize_title(&title);
                prop_assert_eq!(normalize_title(&once), once.clone());
            }

            #[test]
            fn normalize_artist_is_idempotent(artist in words()) {
                let once = normalize_artist(&artist);
                prop_assert_eq!(normalize_artist(&once), once.clone());
            }

            /// Letter case never changes the key
            #[test]
            fn key_ignores_case(title in words(), artist in words()) {
                prop_assert_eq!(
                    normalize(&title.to_uppercase(), &artist.to_uppercase()),
                    normalize(&title.to_lowercase(), &artist.to_lowercase())
                );
            }

            /// A bracketed remix qualifier never changes the key
            #[test]
            fn key_ignores_remix_suffix(title in "[a-z]{1,12}( [a-z]{1,12}){0,3}", artist in words()) {
                let suffixed = format!("{} (Remix)", title);
                prop_assert_eq!(normalize(&suffixed, &artist), normalize(&title, &artist));
            }

            /// Keys only contain lower-case alphanumerics, single spaces and the separator
            #[test]
            fn key_is_clean(title in words(), artist in words()) {
                let key = normalize(&title, &artist);
                prop_assert!(!key.as_str().contains("  "));
                prop_assert!(key
                    .as_str()
                    .chars()
                    .all(|c| c == '|' || c == ' ' || c.is_alphanumeric()));
            }
        }
    }
}
