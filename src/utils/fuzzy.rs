//! Fuzzy matching utilities
//!
//! Edit-distance helpers shared by the classifier, the compound splitter and
//! the executor's topic matching.

use strsim::{levenshtein, osa_distance};

/// Result of a fuzzy match with the matched value and its distance
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub value: String,
    pub distance: usize,
}

/// Split text into lowercase word tokens, dropping punctuation
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Case-insensitive edit distance
pub fn distance(a: &str, b: &str) -> usize {
    levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Edit distance where swapping two neighbouring letters costs one edit
pub fn typo_distance(a: &str, b: &str) -> usize {
    osa_distance(&a.to_lowercase(), &b.to_lowercase())
}

/// True if `token` is within `max_distance` edits of `word`.
///
/// Tokens shorter than `min_len` must match literally; short words are too
/// close to each other for edit distance to mean anything.
pub fn within(token: &str, word: &str, max_distance: usize, min_len: usize) -> bool {
    if token.eq_ignore_ascii_case(word) {
        return true;
    }
    if token.chars().count() < min_len || max_distance == 0 {
        return false;
    }
    distance(token, word) <= max_distance
}

/// Like [`within`], but a swapped pair of letters ("celar") is a single edit
pub fn within_typo(token: &str, word: &str, max_distance: usize, min_len: usize) -> bool {
    if token.eq_ignore_ascii_case(word) {
        return true;
    }
    if token.chars().count() < min_len || max_distance == 0 {
        return false;
    }
    typo_distance(token, word) <= max_distance
}

/// Find the closest candidate within `max_distance`
///
/// Ties keep the earlier candidate.
pub fn find_best_match(
    token: &str,
    candidates: &[&str],
    max_distance: usize,
    min_len: usize,
) -> Option<FuzzyMatch> {
    let mut best: Option<FuzzyMatch> = None;

    for candidate in candidates {
        if !within(token, candidate, max_distance, min_len) {
            continue;
        }
        let d = distance(token, candidate);
        if best.as_ref().map(|b| d < b.distance).unwrap_or(true) {
            best = Some(FuzzyMatch {
                value: candidate.to_string(),
                distance: d,
            });
        }
    }

    best
}

/// True if every token of `needle` has a close token in `haystack`.
///
/// Used when a plain substring search finds nothing ("phisics" vs "physics").
pub fn all_tokens_close(needle: &str, haystack: &str, max_distance: usize, min_len: usize) -> bool {
    let needle_tokens = tokens(needle);
    if needle_tokens.is_empty() {
        return false;
    }
    let hay_tokens = tokens(haystack);

    needle_tokens.iter().all(|n| {
        hay_tokens
            .iter()
            .any(|h| within(h, n, max_distance, min_len))
    })
}
