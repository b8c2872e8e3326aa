//! Text Normalization
//!
//! Fixes typos, grammar slips and shorthand before an utterance is split and
//! classified. Pure: the only output is the returned [`Normalized`] value.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::debug;

/// Built-in misspellings, matched as whole words
const TYPOS: &[(&str, &str)] = &[
    ("mke", "make"),
    ("mak", "make"),
    ("maek", "make"),
    ("mkae", "make"),
    ("creat", "create"),
    ("craete", "create"),
    ("cretae", "create"),
    ("crete", "create"),
    ("genrate", "generate"),
    ("generat", "generate"),
    ("gnerate", "generate"),
    ("delte", "delete"),
    ("delet", "delete"),
    ("dlete", "delete"),
    ("deleet", "delete"),
    ("delate", "delete"),
    ("remvoe", "remove"),
    ("remov", "remove"),
    ("rmeove", "remove"),
    ("claer", "clear"),
    ("clera", "clear"),
    ("flshcards", "flashcards"),
    ("flascards", "flashcards"),
    ("flashcrds", "flashcards"),
    ("flahscards", "flashcards"),
    ("flashcadrs", "flashcards"),
    ("flashcars", "flashcards"),
    ("falshcards", "flashcards"),
    ("flashards", "flashcards"),
    ("flshcard", "flashcard"),
    ("flascard", "flashcard"),
    ("flashcrd", "flashcard"),
    ("flahscard", "flashcard"),
    ("falshcard", "flashcard"),
    ("notse", "notes"),
    ("ntoes", "notes"),
    ("noets", "notes"),
    ("nots", "notes"),
    ("ntoe", "note"),
    ("noet", "note"),
    ("abot", "about"),
    ("abut", "about"),
    ("aboout", "about"),
    ("baout", "about"),
    ("evrything", "everything"),
    ("everyting", "everything"),
    ("everthing", "everything"),
    ("evreything", "everything"),
    ("shedule", "schedule"),
    ("schedual", "schedule"),
    ("scedule", "schedule"),
    ("schedul", "schedule"),
    ("calender", "calendar"),
    ("seach", "search"),
    ("serach", "search"),
    ("realted", "related"),
    ("relaetd", "related"),
];

/// Shorthand expansions, matched as whole words
const SHORTHAND: &[(&str, &str)] = &[
    ("gimme", "give me"),
    ("hw", "homework"),
    ("pls", "please"),
    ("plz", "please"),
    ("abt", "about"),
    ("tmrw", "tomorrow"),
    ("tmr", "tomorrow"),
    ("tmrow", "tomorrow"),
    ("ur", "your"),
    ("fc", "flashcard"),
    ("fcs", "flashcards"),
    ("info", "information"),
    ("asap", "as soon as possible"),
];

/// Number words understood everywhere a count is expected
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
];

/// Conversational lead-ins dropped before anything else runs
const FILLER_PREFIXES: &[&str] = &[
    "um ",
    "uh ",
    "hey ",
    "ok ",
    "okay ",
    "so ",
    "please ",
    "can you ",
    "could you ",
    "would you ",
    "i want you to ",
    "i want to ",
    "i need to ",
    "i'd like to ",
    "let's ",
];

/// Suffixes that legitimately follow a digit ("3pm", "2nd")
const DIGIT_SUFFIXES: &[&str] = &[
    "am", "pm", "st", "nd", "rd", "th", "hr", "hrs", "min", "mins", "s",
];

lazy_static! {
    static ref GLUED_DIGITS: Regex =
        Regex::new(r"\b(\d+)([a-z]{2,})\b").expect("valid glued digit regex");
    static ref SINGULAR_AFTER_COUNT: Regex = Regex::new(
        r"\b(create|make|generate|add|build|write|gimme|give me)\s+(\d+|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|several|some|few|many|more)\s+((?:[a-z]+\s+)?)(flashcard|note|card)\b"
    )
    .expect("valid pluralization regex");
    static ref CONCATENATED: Regex = Regex::new(
        r"\b(create|make|generate|add|build|write|delete|remove|clear)(\d+)\s*([a-z]*)\b"
    )
    .expect("valid concatenation regex");
    static ref TRAILING_PUNCT: Regex =
        Regex::new(r"[\s.!?;:]+$").expect("valid trailing punctuation regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

/// What kind of rewrite produced a correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionKind {
    Typo,
    Grammar,
    Shorthand,
    Split,
}

/// One rewrite applied to the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub from: String,
    pub to: String,
    pub kind: CorrectionKind,
}

/// Normalizer output
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub text: String,
    pub corrections: Vec<Correction>,
    pub confidence: f32,
}

/// Cleans typed or transcribed requests before they are split and classified
pub struct TextNormalizer {
    /// Built-in typos merged with user corrections from config
    typos: HashMap<String, String>,
    typo_pattern: Regex,
    shorthand: HashMap<String, String>,
    shorthand_pattern: Regex,
}

impl TextNormalizer {
    /// Create a new text normalizer with extra user corrections
    pub fn new(corrections: HashMap<String, String>) -> Self {
        let mut typos: HashMap<String, String> = TYPOS
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        for (from, to) in corrections {
            typos.insert(from.to_lowercase(), to.to_lowercase());
        }

        let shorthand: HashMap<String, String> = SHORTHAND
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            typo_pattern: word_pattern(typos.keys()),
            typos,
            shorthand_pattern: word_pattern(shorthand.keys()),
            shorthand,
        }
    }

    /// Normalize text with corrections and common fixes
    pub fn normalize(&self, raw: &str) -> Normalized {
        let mut corrections = Vec::new();
        let mut text = collapse_whitespace(&raw.to_lowercase());

        text = strip_fillers(&text);

        text = replace_words(
            &self.typo_pattern,
            &self.typos,
            &text,
            CorrectionKind::Typo,
            &mut corrections,
        );

        text = self.fix_grammar(&text, &mut corrections);

        text = replace_words(
            &self.shorthand_pattern,
            &self.shorthand,
            &text,
            CorrectionKind::Shorthand,
            &mut corrections,
        );

        text = self.split_concatenated(&text, &mut corrections);

        let text = TRAILING_PUNCT
            .replace(&collapse_whitespace(&text), "")
            .trim()
            .to_string();

        let confidence = (1.0 - 0.1 * corrections.len() as f32).max(0.5);
        if !corrections.is_empty() {
            debug!(
                "✏️ Normalized '{}' -> '{}' ({} corrections)",
                raw,
                text,
                corrections.len()
            );
        }

        Normalized {
            text,
            corrections,
            confidence,
        }
    }

    /// Ordered grammar rules: detach glued digits, then pluralize counted nouns
    fn fix_grammar(&self, text: &str, corrections: &mut Vec<Correction>) -> String {
        let detached = GLUED_DIGITS.replace_all(text, |caps: &Captures| {
            let whole = caps[0].to_string();
            if DIGIT_SUFFIXES.contains(&&caps[2]) {
                return whole;
            }
            let fixed = format!("{} {}", &caps[1], &caps[2]);
            corrections.push(Correction {
                from: whole,
                to: fixed.clone(),
                kind: CorrectionKind::Grammar,
            });
            fixed
        });

        SINGULAR_AFTER_COUNT
            .replace_all(&detached, |caps: &Captures| {
                let whole = caps[0].to_string();
                if &caps[2] == "1" {
                    return whole;
                }
                let fixed = format!("{} {} {}{}s", &caps[1], &caps[2], &caps[3], &caps[4]);
                corrections.push(Correction {
                    from: whole,
                    to: fixed.clone(),
                    kind: CorrectionKind::Grammar,
                });
                fixed
            })
            .to_string()
    }

    /// "create50flashcard" -> "create 50 flashcards"
    ///
    /// Runs last so the noun has already been through the typo table.
    fn split_concatenated(&self, text: &str, corrections: &mut Vec<Correction>) -> String {
        CONCATENATED
            .replace_all(text, |caps: &Captures| {
                let whole = caps[0].to_string();
                let count = &caps[2];
                let raw_noun = caps[3].to_string();
                let mut noun = self.typos.get(&raw_noun).cloned().unwrap_or(raw_noun);
                if count != "1" && matches!(noun.as_str(), "flashcard" | "note" | "card") {
                    noun.push('s');
                }
                let fixed = if noun.is_empty() {
                    format!("{} {}", &caps[1], count)
                } else {
                    format!("{} {} {}", &caps[1], count, noun)
                };
                corrections.push(Correction {
                    from: whole,
                    to: fixed.clone(),
                    kind: CorrectionKind::Split,
                });
                fixed
            })
            .to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

/// Parse a count written as digits or a number word
pub fn parse_number(text: &str) -> Option<u32> {
    let text_lower = text.trim().to_lowercase();

    // Try direct number
    if let Ok(num) = text_lower.parse::<u32>() {
        return Some(num);
    }

    // Try word
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == text_lower)
        .map(|(_, num)| *num)
}

fn word_pattern<'a>(words: impl Iterator<Item = &'a String>) -> Regex {
    let mut words: Vec<&String> = words.collect();
    // Longest first so alternation prefers the most specific entry
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("escaped word list is a valid regex")
}

fn replace_words(
    pattern: &Regex,
    table: &HashMap<String, String>,
    text: &str,
    kind: CorrectionKind,
    corrections: &mut Vec<Correction>,
) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            let from = caps[0].to_string();
            match table.get(&from) {
                Some(to) => {
                    corrections.push(Correction {
                        from: from.clone(),
                        to: to.clone(),
                        kind,
                    });
                    to.clone()
                }
                None => from,
            }
        })
        .to_string()
}

fn strip_fillers(text: &str) -> String {
    let mut final_text = text.trim().to_string();

    loop {
        let mut changed = false;
        for prefix in FILLER_PREFIXES {
            if final_text.starts_with(prefix) {
                final_text = final_text[prefix.len()..].trim().to_string();
                changed = true;
                break;
            }
        }
        if !changed {
            break;
        }
    }

    final_text
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_string()
}
