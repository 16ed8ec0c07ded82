//! Deterministic scoring and tagging
//!
//! All functions here are pure. Lengths are counted in Unicode scalar values
//! (chars), not bytes, so the same document scores the same regardless of
//! script.

use once_cell::sync::Lazy;

/// Built-in tag vocabulary, matched case-insensitively as substrings
pub static DEFAULT_TAG_VOCABULARY: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "consciousness",
        "awareness",
        "mindfulness",
        "wisdom",
        "healing",
        "community",
        "collective",
        "spatial",
        "infinite",
        "transcendence",
        "sacred",
        "spiritual",
        "evolution",
        "growth",
        "transformation",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
});

pub const MIN_IMPACT: f64 = 1.0;
pub const MAX_IMPACT: f64 = 10.0;
pub const MIN_REACH: f64 = 1.0;
pub const MAX_REACH: f64 = 100.0;

/// Impact score: one point per 1000 chars, clamped to [1, 10]
pub fn impact_score(text: &str) -> f64 {
    (text.chars().count() as f64 / 1000.0).clamp(MIN_IMPACT, MAX_IMPACT)
}

/// Reach score: one point per 100 chars, clamped to [1, 100]
pub fn reach_score(text: &str) -> f64 {
    (text.chars().count() as f64 / 100.0).clamp(MIN_REACH, MAX_REACH)
}

/// Vocabulary terms found in `text`
///
/// Case-insensitive substring match. Result keeps vocabulary order and holds
/// each term at most once; blank vocabulary entries never match.
pub fn extract_tags(text: &str, vocabulary: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut tags: Vec<String> = Vec::new();

    for term in vocabulary {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() || tags.iter().any(|t| *t == needle) {
            continue;
        }
        if haystack.contains(&needle) {
            tags.push(needle);
        }
    }

    tags
}

/// First `max_chars` chars of `text`, trimmed
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim().to_string()
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
