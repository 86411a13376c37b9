//! Sentence-level selection of functional requirements.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words marking a sentence as a likely functional requirement (matched case-insensitively).
pub const REQUIREMENT_KEYWORDS: [&str; 6] = ["shall", "must", "create", "update", "delete", "system"];

static SENTENCE_TERMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]").expect("static sentence terminator pattern"));

/// Splits `text` on `.`, `!` and `?`, trims each segment and keeps the non-empty ones that
/// contain a requirement keyword. Source order is preserved; terminators are dropped.
pub fn filter_requirements(text: &str) -> Vec<String> {
    SENTENCE_TERMINATOR
        .split(text)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty() && is_requirement(sentence))
        .map(str::to_owned)
        .collect()
}

/// True when the sentence mentions any of [`REQUIREMENT_KEYWORDS`].
pub fn is_requirement(sentence: &str) -> bool {
    let lowered = sentence.to_lowercase();
    REQUIREMENT_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}
