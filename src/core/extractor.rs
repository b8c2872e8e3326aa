//! Parameter extraction
//!
//! Pulls topic, count, difficulty, date/time and conversion direction out of
//! a classified segment.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::classifier::{convert_direction, Lexicon};
use super::dates::{strip_temporal, DateParser};
use super::splitter::TopicTracker;
use super::text_normalizer::parse_number;
use crate::model::{ActionKind, Difficulty, Params, Subject, TargetKind};
use crate::utils::fuzzy::{self, within};
use tracing::debug;

/// Prepositions that introduce a topic after the target noun
pub(crate) const TOPIC_PREPOSITIONS: &[&str] = &[
    "about", "on", "for", "of", "regarding", "from", "covering", "concerning", "re",
];

/// Never part of a topic
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "mine", "your", "our", "us", "we", "you", "the", "a", "an", "some", "any",
    "all", "every", "each", "of", "to", "for", "on", "about", "from", "with", "in", "at", "by",
    "into", "onto", "and", "or", "please", "want", "need", "would", "like", "can", "could", "is",
    "are", "be", "do", "does", "did", "have", "has", "had", "there", "here", "now", "just",
    "more", "few", "many", "couple", "dozen", "new", "also", "then", "what", "which", "it",
    "that", "this", "them", "those", "these", "related", "regarding", "up", "out", "get", "let",
    "let's", "lets", "quickly", "thanks", "thank", "asap", "again", "other", "only", "so",
    "really", "very", "same", "everything", "anything", "stuff", "things", "set", "put", "one",
    "ones", "quiz", "study", "covering", "concerning", "re", "how", "many", "much", "where",
];

/// Leading words skipped before a topic phrase
const DETERMINERS: &[&str] = &["the", "my", "a", "an", "some", "our", "your", "all", "every", "any"];

/// Words that end a topic phrase
const PHRASE_BREAKS: &[&str] = &["please", "now", "thanks", "quickly", "asap", "again", "for", "and"];

const EASY_WORDS: &[&str] = &["easy", "simple", "basic", "beginner", "introductory"];
const MEDIUM_WORDS: &[&str] = &["medium", "intermediate", "moderate"];
const HARD_WORDS: &[&str] = &["hard", "difficult", "advanced", "challenging", "tough", "expert"];

/// Quantity words with a fixed meaning
const QUANTITY_WORDS: &[(&str, u32)] = &[("couple", 2), ("few", 3), ("several", 3), ("dozen", 12)];

/// Turns a classified segment into typed parameters
pub struct ParameterExtractor {
    lexicon: Lexicon,
    dates: Arc<dyn DateParser>,
    default_flashcard_count: u32,
    max_create_count: u32,
}

impl ParameterExtractor {
    pub fn new(
        lexicon: Lexicon,
        dates: Arc<dyn DateParser>,
        default_flashcard_count: u32,
        max_create_count: u32,
    ) -> Self {
        Self {
            lexicon,
            dates,
            default_flashcard_count,
            max_create_count: max_create_count.max(1),
        }
    }

    /// Extract every parameter the action kind cares about
    pub fn extract(&self, segment: &str, kind: ActionKind, target: TargetKind) -> Params {
        let lowered = segment.to_lowercase();
        // Dates only mean something to schedule entries ("flashcards about may 4th")
        let tokens = if target == TargetKind::Schedule {
            fuzzy::tokens(&strip_temporal(&lowered))
        } else {
            fuzzy::tokens(&lowered)
        };

        let mut params = Params {
            difficulty: difficulty(&tokens),
            ..Params::default()
        };

        if kind == ActionKind::Create {
            params.subjects = self.extract_subjects(&tokens);
        }

        if params.subjects.is_empty() {
            params.topic = self.extract_topic(&tokens, kind, target);
            params.count = self.extract_count(&tokens, kind, target);
        } else {
            let total: u32 = params.subjects.iter().map(|s| s.count).sum();
            params.count = Some(total);
        }

        if let Some(at) = self.dates.parse_date(segment) {
            params.date = Some(at.date());
            params.time = Some(at.time());
        }

        if kind == ActionKind::Convert {
            let (from, to) = convert_direction(&self.lexicon, &tokens)
                .unwrap_or_else(|| (opposite(target), target));
            params.from = Some(from);
            params.to = Some(to);
        }

        params.wipe = params.topic.is_none()
            && (tokens.iter().any(|t| t == "all" || t == "every")
                || self.lexicon.matches_everything(&tokens));

        debug!("🧩 '{}' -> {:?}", segment, params);
        params
    }

    /// Topic in priority order: "related to X", "<noun> about X", "<noun> X",
    /// then the last run of content words.
    ///
    /// A self-referential phrase ("about it") yields `None` so the caller can
    /// inherit an earlier topic.
    pub fn extract_topic(&self, tokens: &[String], kind: ActionKind, target: TargetKind) -> Option<String> {
        let targets = self.target_positions(tokens, target);
        let skipped = self.non_topic_positions(tokens, kind);
        // Entry nouns stay inside schedule titles ("schedule a chemistry exam")
        let anchors: BTreeSet<usize> = if target == TargetKind::Schedule {
            targets
                .iter()
                .copied()
                .filter(|&i| !self.lexicon.is_schedule_entry_word(&tokens[i]))
                .collect()
        } else {
            targets.clone()
        };
        // Phrases end at a target noun or at a word that is never a topic
        let bounds: BTreeSet<usize> = anchors.union(&skipped).copied().collect();

        // (a) related [to] X
        if let Some(i) = tokens.iter().position(|t| t == "related") {
            let start = if tokens.get(i + 1).map(String::as_str) == Some("to") {
                i + 2
            } else {
                i + 1
            };
            return self.phrase_from(tokens, start, &bounds);
        }

        // (b) {about|on|for|of|from} X after the target noun
        let first_target = anchors.iter().next().copied();
        let search_from = first_target.map(|p| p + 1).unwrap_or(0);
        for i in search_from..tokens.len() {
            if !TOPIC_PREPOSITIONS.contains(&tokens[i].as_str()) {
                continue;
            }
            let phrase = self.raw_phrase(tokens, i + 1, &bounds);
            if phrase.is_empty() {
                continue;
            }
            return finish(phrase);
        }

        // (c) target noun followed by a bare phrase ("flashcards react")
        if let Some(p) = first_target {
            let phrase = self.raw_phrase(tokens, p + 1, &bounds);
            if !phrase.is_empty() && !self.lexicon.is_action_word(&phrase[0]) {
                if let Some(topic) = finish(phrase) {
                    return Some(topic);
                }
            }
        }

        // (d) contiguous content words ending at the last one
        let excluded: BTreeSet<usize> = targets.union(&skipped).copied().collect();
        self.content_run(tokens, &excluded, target)
    }

    /// A delete verb caught only by edit distance ("dleete") and typos of
    /// "everything" are never part of a topic
    fn non_topic_positions(&self, tokens: &[String], kind: ActionKind) -> BTreeSet<usize> {
        let mut positions: BTreeSet<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| self.lexicon.is_everything_word(t))
            .map(|(i, _)| i)
            .collect();
        if kind == ActionKind::Delete {
            positions.extend(self.lexicon.delete_verb(tokens).map(|m| m.position));
        }
        positions
    }

    /// Count near the target noun, then anywhere before the topic, then
    /// quantity words, then defaults.
    ///
    /// Numbers inside the topic ("about chapter 3") are never counts.
    pub fn extract_count(&self, tokens: &[String], kind: ActionKind, target: TargetKind) -> Option<u32> {
        let targets = self.target_positions(tokens, target);
        let head = &tokens[..topic_start(tokens, &targets)];

        let adjacent = targets.iter().filter(|&&p| p <= head.len()).find_map(|&p| {
            (p.saturating_sub(3)..p)
                .rev()
                .find_map(|i| parse_number(&tokens[i]))
        });

        let explicit = adjacent
            .or_else(|| head.iter().find_map(|t| parse_number(t)))
            .or_else(|| {
                head.iter().find_map(|t| {
                    QUANTITY_WORDS
                        .iter()
                        .find(|(word, _)| *word == t.as_str())
                        .map(|(_, n)| *n)
                })
            })
            .or_else(|| {
                // "a note", "an easy flashcard"
                targets.iter().find_map(|&p| {
                    (p.saturating_sub(2)..p)
                        .any(|i| tokens[i] == "a" || tokens[i] == "an")
                        .then_some(1)
                })
            });

        match kind {
            ActionKind::Create => {
                let count = explicit.unwrap_or(match target {
                    TargetKind::Flashcards => self.default_flashcard_count,
                    _ => 1,
                });
                Some(count.clamp(1, self.max_create_count))
            }
            // Unset means "all matching"
            _ => explicit,
        }
    }

    /// "12 ai and 15 react flashcards" -> [(ai, 12), (react, 15)]
    pub fn extract_subjects(&self, tokens: &[String]) -> Vec<Subject> {
        let mut subjects = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let Some(count) = parse_number(&tokens[i]) else {
                i += 1;
                continue;
            };

            let mut words = Vec::new();
            let mut j = i + 1;
            while j < tokens.len() {
                let t = tokens[j].as_str();
                if parse_number(t).is_some()
                    || t == "and"
                    || t == "&"
                    || self.lexicon.literal_target(t).is_some()
                    || self.is_card_word(t)
                {
                    break;
                }
                if !STOP_WORDS.contains(&t) && difficulty_of(t).is_none() {
                    words.push(t.to_string());
                }
                j += 1;
            }

            if !words.is_empty() {
                subjects.push(Subject {
                    topic: words.join(" "),
                    count: count.clamp(1, self.max_create_count),
                });
            }
            i = j.max(i + 1);
        }

        if subjects.len() >= 2 {
            subjects
        } else {
            Vec::new()
        }
    }

    /// Token positions that name the target (weak schedule nouns count only for schedule)
    fn target_positions(&self, tokens: &[String], target: TargetKind) -> BTreeSet<usize> {
        let mut positions: BTreeSet<usize> = self
            .lexicon
            .target_mentions(tokens)
            .into_iter()
            .filter(|m| !m.weak || target == TargetKind::Schedule)
            .map(|m| m.position)
            .collect();
        for (i, t) in tokens.iter().enumerate() {
            if self.is_card_word(t) {
                positions.insert(i);
            }
        }
        positions
    }

    fn is_card_word(&self, token: &str) -> bool {
        let d = self.lexicon.policy().flash_pair_distance;
        let min_len = self.lexicon.policy().min_fuzzy_len;
        within(token, "card", d, min_len) || within(token, "cards", d, min_len)
    }

    /// Words after `start` up to the next break, determiners skipped
    fn raw_phrase(&self, tokens: &[String], start: usize, targets: &BTreeSet<usize>) -> Vec<String> {
        let mut phrase = Vec::new();
        for (i, token) in tokens.iter().enumerate().skip(start) {
            let t = token.as_str();
            if phrase.is_empty() && DETERMINERS.contains(&t) {
                continue;
            }
            // "chapter 3 and 4" is one topic
            let joins_numbers = t == "and"
                && phrase.last().map_or(false, |w: &String| parse_number(w).is_some())
                && tokens.get(i + 1).map_or(false, |w| parse_number(w).is_some());
            if targets.contains(&i)
                || PHRASE_BREAKS.contains(&t) && !joins_numbers
                || TOPIC_PREPOSITIONS.contains(&t) && phrase.is_empty()
                || difficulty_of(t).is_some()
            {
                break;
            }
            phrase.push(token.clone());
        }
        phrase
    }

    fn phrase_from(&self, tokens: &[String], start: usize, targets: &BTreeSet<usize>) -> Option<String> {
        finish(self.raw_phrase(tokens, start, targets))
    }

    fn content_run(
        &self,
        tokens: &[String],
        targets: &BTreeSet<usize>,
        target: TargetKind,
    ) -> Option<String> {
        let is_content = |i: usize| {
            let t = tokens[i].as_str();
            !targets.contains(&i)
                && !STOP_WORDS.contains(&t)
                && !self.lexicon.is_action_word(t)
                && parse_number(t).is_none()
                && difficulty_of(t).is_none()
                && !self.is_card_word(t)
                && !(target == TargetKind::Schedule && self.lexicon.is_schedule_entry_word(t))
        };

        let last = (0..tokens.len()).rev().find(|&i| is_content(i))?;
        let mut first = last;
        while first > 0 && is_content(first - 1) {
            first -= 1;
        }

        // Keep the entry noun in schedule titles ("chemistry exam")
        let mut end = last + 1;
        if target == TargetKind::Schedule {
            while end < tokens.len() && self.lexicon.is_schedule_entry_word(&tokens[end]) {
                end += 1;
            }
        }

        Some(tokens[first..end].join(" "))
    }
}

/// Index of the preposition that opens the topic ("about", "on", "related"),
/// or the end of the segment
fn topic_start(tokens: &[String], targets: &BTreeSet<usize>) -> usize {
    let after = targets.iter().next().map(|p| p + 1).unwrap_or(0);
    (after..tokens.len())
        .find(|&i| TOPIC_PREPOSITIONS.contains(&tokens[i].as_str()) || tokens[i] == "related")
        .unwrap_or(tokens.len())
}

/// Drop trailing stop words; a phrase that is only placeholders means "no topic"
fn finish(mut phrase: Vec<String>) -> Option<String> {
    while phrase
        .last()
        .map(|t| STOP_WORDS.contains(&t.as_str()))
        .unwrap_or(false)
    {
        phrase.pop();
    }
    let topic = phrase.join(" ");
    if TopicTracker::is_generic(&topic) {
        None
    } else {
        Some(topic)
    }
}

fn difficulty_of(token: &str) -> Option<Difficulty> {
    if EASY_WORDS.contains(&token) {
        Some(Difficulty::Easy)
    } else if MEDIUM_WORDS.contains(&token) {
        Some(Difficulty::Medium)
    } else if HARD_WORDS.contains(&token) {
        Some(Difficulty::Hard)
    } else {
        None
    }
}

fn difficulty(tokens: &[String]) -> Option<Difficulty> {
    tokens.iter().find_map(|t| difficulty_of(t))
}

fn opposite(target: TargetKind) -> TargetKind {
    match target {
        TargetKind::Flashcards => TargetKind::Notes,
        _ => TargetKind::Flashcards,
    }
}
