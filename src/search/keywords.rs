//! Keyword normalization for stored index rows.
//!
//! Index rows hold a flattened, lowercased word list padded with a single
//! space on each side, so a `LIKE '% word %'` lookup matches whole words.

use std::sync::OnceLock;

use regex::Regex;

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn punctuation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("static regex"))
}

/// Normalize free text into the stored keyword form.
///
/// Strips markup tags, drops punctuation, lowercases, and collapses runs of
/// whitespace. Empty input yields an empty string (no padding).
pub fn normalize_keywords(text: &str) -> String {
    let without_tags = tag_pattern().replace_all(text, " ");
    let without_punct = punctuation_pattern().replace_all(&without_tags, " ");
    let words: Vec<String> = without_punct
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return String::new();
    }
    format!(" {} ", words.join(" "))
}
