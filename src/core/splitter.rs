//! Compound request splitting
//!
//! Breaks "delete all flashcards and make 5 notes on it" into ordered
//! segments, and tracks the topic that later segments may refer back to.

use super::classifier::{Lexicon, MatchKind};
use super::dates::strip_temporal;
use super::extractor::TOPIC_PREPOSITIONS;
use super::text_normalizer::parse_number;
use crate::utils::fuzzy;
use tracing::debug;

/// Single-word connectors
const CONNECTORS: &[&str] = &["and", "then", "also", "plus", "next", "&", ",", ";"];

/// Two-word connectors, checked before single words
const CONNECTOR_PAIRS: &[(&str, &str)] = &[
    ("after", "that"),
    ("and", "then"),
    ("and", "also"),
    ("and", "next"),
];

/// Words after "next" that make it a date ("next friday"), not a connector
const NEXT_DATE_WORDS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "week",
    "month", "year", "time", "morning", "evening",
];

/// Words that point back at an earlier topic
const BACKREFERENCES: &[&str] = &["it", "that", "this", "related", "them", "those", "these", "same"];

/// Placeholders that never count as a real topic
const GENERIC_TOPICS: &[&str] = &[
    "it", "that", "this", "them", "those", "these", "everything", "all", "related", "stuff",
    "things", "thing", "something", "anything", "more", "some", "new", "few", "many", "other",
    "same", "random", "different", "easy", "hard", "medium", "my", "the", "a", "an", "one",
];

/// Splits compound requests into ordered single-action segments
#[derive(Debug, Clone)]
pub struct CompoundSplitter {
    lexicon: Lexicon,
}

impl CompoundSplitter {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Does the text contain any connector?
    pub fn is_compound(&self, text: &str) -> bool {
        let words = words(text);
        (0..words.len()).any(|i| connector_at(&words, i).is_some())
    }

    /// Split into ordered segments; a non-compound request comes back as-is
    pub fn split(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let pieces = if self.is_compound(text) {
            self.split_on_connectors(text)
        } else {
            vec![text.to_string()]
        };

        let segments: Vec<String> = pieces
            .iter()
            .flat_map(|piece| self.split_mixed_verbs(piece))
            .filter(|s| !s.trim().is_empty())
            .collect();

        debug!("✂️ '{}' -> {:?}", text, segments);
        segments
    }

    /// Cut at every connector, then glue back pieces that cannot stand alone
    fn split_on_connectors(&self, text: &str) -> Vec<String> {
        let words = words(text);
        let mut raw: Vec<(String, Option<String>)> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut joiner: Option<String> = None;
        let mut i = 0;

        while i < words.len() {
            if let Some(width) = connector_at(&words, i) {
                if !current.is_empty() {
                    raw.push((current.join(" "), joiner.take()));
                    current.clear();
                }
                joiner = Some(words[i..i + width].join(" "));
                i += width;
                continue;
            }
            current.push(words[i]);
            i += 1;
        }
        if !current.is_empty() {
            raw.push((current.join(" "), joiner.take()));
        }

        let mut segments: Vec<String> = Vec::new();
        for (piece, joined_by) in raw {
            let glue = match segments.last() {
                Some(previous) => {
                    !self.is_actionable(&piece)
                        || self.is_subject_fragment(previous, &piece)
                        || self.continues_topic(previous, &piece)
                }
                None => false,
            };

            match segments.last_mut() {
                Some(previous) if glue => {
                    let connector = joined_by.unwrap_or_else(|| "and".to_string());
                    if connector == "," || connector == ";" {
                        previous.push_str(&format!("{} {}", connector, piece));
                    } else {
                        previous.push_str(&format!(" {} {}", connector, piece));
                    }
                }
                _ => segments.push(piece),
            }
        }

        segments
    }

    /// Can this piece be a clause of its own?
    fn is_actionable(&self, piece: &str) -> bool {
        let tokens = fuzzy::tokens(piece);
        let lexicon = &self.lexicon;

        lexicon.create_verb(&tokens).is_some()
            || lexicon
                .delete_verb(&tokens)
                .map(|m| m.kind != MatchKind::Fuzzy)
                .unwrap_or(false)
            || lexicon.update_verb(&tokens).is_some()
            || lexicon.search_verb(&tokens).is_some()
            || lexicon.list_verb(&tokens).is_some()
            || lexicon.navigate_verb(&tokens).is_some()
            || lexicon.analyze_verb(&tokens).is_some()
            || !lexicon.target_mentions(&tokens).is_empty()
            || lexicon.matches_everything(&tokens)
            || tokens.iter().any(|t| parse_number(t).is_some())
    }

    /// "make 12 ai" followed by "15 react flashcards" is one multi-subject clause
    fn is_subject_fragment(&self, previous: &str, piece: &str) -> bool {
        let prev_tokens = fuzzy::tokens(previous);
        let tokens = fuzzy::tokens(piece);

        let prev_has_count = prev_tokens
            .iter()
            .rev()
            .take(3)
            .any(|t| parse_number(t).is_some());
        let prev_has_target = !self.lexicon.target_mentions(&prev_tokens).is_empty();
        let starts_with_count = tokens.first().and_then(|t| parse_number(t)).is_some();
        let has_target = !self.lexicon.target_mentions(&tokens).is_empty();
        let has_verb = self.lexicon.create_verb(&tokens).is_some()
            || self.lexicon.delete_verb(&tokens).is_some();

        prev_has_count && !prev_has_target && starts_with_count && has_target && !has_verb
    }

    /// "about chapter 3" followed by a bare "4": the number is part of the topic
    fn continues_topic(&self, previous: &str, piece: &str) -> bool {
        let tokens = fuzzy::tokens(piece);
        let prev_tokens = fuzzy::tokens(previous);

        let number_only = !tokens.is_empty() && tokens.iter().all(|t| parse_number(t).is_some());
        let ends_with_number = prev_tokens
            .last()
            .map_or(false, |t| parse_number(t).is_some());
        let in_topic = prev_tokens
            .iter()
            .rev()
            .skip(1)
            .take_while(|t| self.lexicon.literal_target(t).is_none())
            .any(|t| TOPIC_PREPOSITIONS.contains(&t.as_str()));

        number_only && ends_with_number && in_topic
    }

    /// "delete all flashcards make one note about x" -> two segments
    fn split_mixed_verbs(&self, piece: &str) -> Vec<String> {
        let words = words(piece);
        let tokens: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let delete = self.lexicon.delete_verb(&tokens);
        let create = self
            .lexicon
            .create_verb(&tokens)
            // "delete new notes" is one clause
            .filter(|m| tokens[m.position] != "new");

        let (Some(delete), Some(create)) = (delete, create) else {
            return vec![piece.to_string()];
        };
        if delete.position == create.position {
            return vec![piece.to_string()];
        }

        let cut = delete.position.max(create.position);
        let (head, tail) = tokens.split_at(cut);

        // The second clause must carry something of its own
        if head.is_empty() || !self.has_target_or_count(tail) {
            return vec![piece.to_string()];
        }

        debug!("✂️ mixed verbs in '{}' split at '{}'", piece, words[cut]);
        vec![words[..cut].join(" "), words[cut..].join(" ")]
    }

    fn has_target_or_count(&self, tokens: &[String]) -> bool {
        !self.lexicon.target_mentions(tokens).is_empty()
            || tokens.iter().any(|t| parse_number(t).is_some())
    }
}

/// Whitespace words with separating punctuation broken out as its own word
fn words(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let mut rest = word;
        while let Some(idx) = rest.find([',', ';']) {
            let (before, after) = rest.split_at(idx);
            if !before.is_empty() {
                out.push(before);
            }
            out.push(&after[..1]);
            rest = &after[1..];
        }
        if !rest.is_empty() {
            out.push(rest);
        }
    }
    out
}

/// Width of the connector starting at `i`, if any
fn connector_at(words: &[&str], i: usize) -> Option<usize> {
    let word = words[i].to_lowercase();
    let next = words.get(i + 1).map(|w| w.to_lowercase());

    if let Some(next) = next.as_deref() {
        if CONNECTOR_PAIRS
            .iter()
            .any(|(a, b)| *a == word && *b == next)
        {
            return Some(2);
        }
    }

    if !CONNECTORS.contains(&word.as_str()) {
        return None;
    }

    // "next friday" is a date
    if word == "next" {
        match next.as_deref() {
            Some(n) if NEXT_DATE_WORDS.contains(&n) => return None,
            None => return None,
            _ => {}
        }
    }

    Some(1)
}

/// Remembers the last concrete topic of a compound request
#[derive(Debug, Clone, Default)]
pub struct TopicTracker {
    last: Option<String>,
}

impl TopicTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder topics that must not be stored or used
    pub fn is_generic(topic: &str) -> bool {
        let tokens = fuzzy::tokens(topic);
        tokens.is_empty()
            || tokens
                .iter()
                .all(|t| GENERIC_TOPICS.contains(&t.as_str()) || t.chars().all(|c| c.is_ascii_digit()))
    }

    /// Does the segment point back at an earlier topic?
    pub fn has_backreference(segment: &str) -> bool {
        // "this friday" is a date, not a reference
        fuzzy::tokens(&strip_temporal(&segment.to_lowercase()))
            .iter()
            .any(|t| BACKREFERENCES.contains(&t.as_str()))
    }

    /// Resolve a segment's topic against the last concrete one.
    ///
    /// `may_inherit` is false for segments that explicitly asked for
    /// everything ("delete all flashcards").
    pub fn resolve(&mut self, segment: &str, topic: Option<String>, may_inherit: bool) -> Option<String> {
        let concrete = topic.filter(|t| !Self::is_generic(t));

        match concrete {
            // A concrete topic wins even next to a backreference ("related to react")
            Some(topic) => {
                self.last = Some(topic.clone());
                Some(topic)
            }
            None if may_inherit || Self::has_backreference(segment) => {
                if let Some(last) = &self.last {
                    debug!("🔗 '{}' inherits topic '{}'", segment, last);
                }
                self.last.clone()
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FuzzyPolicy;

    fn splitter() -> CompoundSplitter {
        CompoundSplitter::new(Lexicon::new(FuzzyPolicy::default()))
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(
            splitter().split("make 5 flashcards about react"),
            vec!["make 5 flashcards about react"]
        );
        assert!(splitter().split("   ").is_empty());
    }

    #[test]
    fn test_split_on_connectors() {
        assert_eq!(
            splitter().split("delete all flashcards and create 5 flashcards about biology"),
            vec!["delete all flashcards", "create 5 flashcards about biology"]
        );
        assert_eq!(
            splitter().split("delete all flashcards, create 5 flashcards about biology"),
            vec!["delete all flashcards", "create 5 flashcards about biology"]
        );
        assert_eq!(
            splitter().split("delete react flashcards, also delete physics notes"),
            vec!["delete react flashcards", "delete physics notes"]
        );
        assert_eq!(
            splitter().split("make notes on loops then after that make 3 flashcards"),
            vec!["make notes on loops", "make 3 flashcards"]
        );
    }

    #[test]
    fn test_topic_conjunction_stays_whole() {
        assert_eq!(
            splitter().split("make notes about salt and pepper"),
            vec!["make notes about salt and pepper"]
        );
    }

    #[test]
    fn test_numbered_topic_stays_whole() {
        assert_eq!(
            splitter().split("make flashcards about chapter 3 and 4"),
            vec!["make flashcards about chapter 3 and 4"]
        );
        assert_eq!(
            splitter().split("make notes about world war 1 and 2"),
            vec!["make notes about world war 1 and 2"]
        );
    }

    #[test]
    fn test_next_as_date() {
        assert_eq!(
            splitter().split("add exam next friday"),
            vec!["add exam next friday"]
        );
    }

    #[test]
    fn test_mixed_verb_split() {
        assert_eq!(
            splitter().split("delete all flashcards make one note about rust"),
            vec!["delete all flashcards", "make one note about rust"]
        );
        // Second verb without its own target or count stays fused
        assert_eq!(
            splitter().split("make notes about delta"),
            vec!["make notes about delta"]
        );
    }

    #[test]
    fn test_multi_subject_fragments_merge() {
        assert_eq!(
            splitter().split("make 12 ai and 15 react flashcards"),
            vec!["make 12 ai and 15 react flashcards"]
        );
        assert_eq!(
            splitter().split("make 12 ai, 15 react flashcards"),
            vec!["make 12 ai, 15 react flashcards"]
        );
    }

    #[test]
    fn test_bare_target_segment() {
        assert_eq!(
            splitter().split("delete physics notes and flashcards"),
            vec!["delete physics notes", "flashcards"]
        );
    }

    #[test]
    fn test_topic_tracker() {
        let mut tracker = TopicTracker::new();
        assert_eq!(
            tracker.resolve("create a note about javascript", Some("javascript".into()), true),
            Some("javascript".to_string())
        );
        assert_eq!(
            tracker.resolve("make 5 flashcards about it", None, true),
            Some("javascript".to_string())
        );
        assert_eq!(
            tracker.resolve("make 5 flashcards about it", Some("it".into()), true),
            Some("javascript".to_string())
        );
        assert_eq!(tracker.resolve("delete all notes", None, false), None);
    }

    #[test]
    fn test_generic_topics() {
        assert!(TopicTracker::is_generic("it"));
        assert!(TopicTracker::is_generic("50"));
        assert!(TopicTracker::is_generic("some more"));
        assert!(!TopicTracker::is_generic("machine learning"));
        assert!(!TopicTracker::has_backreference("add exam this friday"));
        assert!(TopicTracker::has_backreference("quiz me on that"));
    }
}
