//! Intent Classification
//!
//! Decides, per segment, which action is requested and which collection it
//! targets. Verb detection and target detection are independent; both
//! tolerate typos through literal tables, alias tables and bounded edit
//! distance. The decision itself is an ordered table of rules so that
//! precedence lives in one place.

use crate::config::FuzzyPolicy;
use crate::error::AssistResult;
use crate::model::{ActionKind, TargetKind, TaskRequest};
use crate::utils::fuzzy::{self, find_best_match, within};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::dates::strip_temporal;
use super::text_normalizer::parse_number;

/// Canonical delete verbs (also the fuzzy-match anchors)
pub const DELETE_VERBS: &[&str] = &["delete", "remove", "clear", "drop", "erase", "trash", "wipe"];

/// Short forms, accepted only as whole tokens
const DELETE_ALIASES: &[&str] = &["rm", "clr", "rmv", "del"];

/// Misspellings seen often enough to list outright
const DELETE_TYPOS: &[&str] = &[
    "delet", "delte", "dlete", "deleet", "delate", "remov", "remvoe", "rmeove", "clera", "claer",
    "eras", "wpie",
];

pub const CREATE_VERBS: &[&str] = &[
    "create", "make", "generate", "add", "new", "build", "write", "give",
];

const CREATE_TYPOS: &[&str] = &["creat", "craete", "cretae", "mak", "mke", "genrate", "generat"];

const UPDATE_VERBS: &[&str] = &[
    "update", "edit", "change", "rename", "modify", "reschedule", "move", "postpone",
];
const SEARCH_VERBS: &[&str] = &["search", "find", "lookup", "look", "seek", "locate"];
const LIST_VERBS: &[&str] = &["list", "show", "display", "view", "see"];
const NAVIGATE_VERBS: &[&str] = &["open", "go", "goto", "navigate", "switch", "take"];
const ANALYZE_VERBS: &[&str] = &[
    "analyze", "analyse", "stats", "statistics", "summarize", "summarise", "overview", "progress",
    "count",
];
const CONVERT_VERBS: &[&str] = &["convert", "turn", "transform"];

const NOTE_WORDS: &[&str] = &["note", "notes", "notebook", "notebooks"];
const NOTE_TYPOS: &[&str] = &["nots", "notse", "ntoes", "noets", "ntoe", "noet", "notez", "nottes"];
/// Real words one edit away from "notes"
const NOTE_LOOKALIKES: &[&str] = &["nodes", "votes", "noted", "totes", "motes", "rotes", "noses"];

const FLASHCARD_WORDS: &[&str] = &[
    "flashcard", "flashcards", "card", "cards", "flash", "fc", "fcs", "deck", "decks",
];

/// Strong schedule nouns name the collection itself
const SCHEDULE_WORDS: &[&str] = &[
    "schedule", "schedules", "calendar", "calendars", "timetable", "timetables", "agenda",
];
/// Weak schedule nouns name a kind of entry; any strong target wins over them
const SCHEDULE_ENTRY_WORDS: &[&str] = &[
    "reminder", "reminders", "event", "events", "appointment", "appointments", "meeting",
    "meetings", "exam", "exams", "session", "sessions", "deadline", "deadlines", "class",
    "lecture",
];
const SCHEDULE_FUZZY_ANCHORS: &[&str] = &["schedule", "calendar", "timetable", "reminder"];

const EVERYTHING_WORDS: &[&str] = &["everything", "anything"];

lazy_static! {
    static ref COLLAPSED_FLASHCARD: Regex =
        Regex::new(r"fla\w*card\w*").expect("valid collapsed flashcard regex");
}

/// How a verb was recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Literal,
    Alias,
    Typo,
    Fuzzy,
}

impl MatchKind {
    fn confidence(&self) -> f32 {
        match self {
            MatchKind::Literal => 0.95,
            MatchKind::Alias => 0.9,
            MatchKind::Typo => 0.85,
            MatchKind::Fuzzy => 0.7,
        }
    }
}

/// A verb found in a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbMatch {
    pub kind: MatchKind,
    /// Token index of the verb
    pub position: usize,
}

/// A target noun found in a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMention {
    pub target: TargetKind,
    pub position: usize,
    pub fuzzy: bool,
    /// Names an entry kind ("exam") rather than the collection
    pub weak: bool,
}

/// Word tables plus the fuzzy policy that governs them
#[derive(Debug, Clone)]
pub struct Lexicon {
    policy: FuzzyPolicy,
}

impl Lexicon {
    pub fn new(policy: FuzzyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FuzzyPolicy {
        &self.policy
    }

    /// First delete verb in the token list, literal matches preferred
    pub fn delete_verb(&self, tokens: &[String]) -> Option<VerbMatch> {
        let explicit = tokens.iter().enumerate().find_map(|(position, t)| {
            let kind = if DELETE_VERBS.contains(&t.as_str()) {
                MatchKind::Literal
            } else if DELETE_ALIASES.contains(&t.as_str()) {
                MatchKind::Alias
            } else if DELETE_TYPOS.contains(&t.as_str()) {
                MatchKind::Typo
            } else {
                return None;
            };
            Some(VerbMatch { kind, position })
        });
        if explicit.is_some() {
            return explicit;
        }

        tokens.iter().enumerate().find_map(|(position, t)| {
            if self.is_known_word(t) || self.policy.verb_lookalikes.iter().any(|w| w == t) {
                return None;
            }
            DELETE_VERBS
                .iter()
                .any(|verb| self.near_delete_verb(t, verb))
                .then_some(VerbMatch {
                    kind: MatchKind::Fuzzy,
                    position,
                })
        })
    }

    /// Typo check of one token against one canonical delete verb
    fn near_delete_verb(&self, token: &str, verb: &str) -> bool {
        let policy = &self.policy;
        if policy.verb_same_initial && token.chars().next() != verb.chars().next() {
            return false;
        }
        let max = if verb.len() <= policy.short_verb_len {
            policy.short_verb_distance
        } else {
            policy.verb_distance
        };
        fuzzy::within_typo(token, verb, max, policy.min_fuzzy_len)
    }

    /// First explicit create verb
    pub fn create_verb(&self, tokens: &[String]) -> Option<VerbMatch> {
        tokens.iter().enumerate().find_map(|(position, t)| {
            let kind = if CREATE_VERBS.contains(&t.as_str()) {
                MatchKind::Literal
            } else if position == 0 && t == "schedule" {
                // "schedule a study session" leads with the noun as a verb
                MatchKind::Literal
            } else if CREATE_TYPOS.contains(&t.as_str()) {
                MatchKind::Typo
            } else {
                return None;
            };
            // "give" only counts as "give me ..."
            if t == "give" && tokens.get(position + 1).map(String::as_str) != Some("me") {
                return None;
            }
            Some(VerbMatch { kind, position })
        })
    }

    /// Create intent without a verb: "5 flashcards on x", "five notes", "a note about x"
    pub fn implicit_create(&self, tokens: &[String]) -> bool {
        tokens.iter().enumerate().any(|(i, t)| {
            let is_count = parse_number(t).is_some();
            let is_article = t == "a" || t == "an";
            if !is_count && !is_article {
                return false;
            }
            // Allow one adjective between the count and the noun
            tokens
                .iter()
                .skip(i + 1)
                .take(2)
                .any(|next| self.is_card_or_note_token(next))
        })
    }

    fn is_card_or_note_token(&self, token: &str) -> bool {
        if NOTE_WORDS.contains(&token) || FLASHCARD_WORDS.contains(&token) {
            return true;
        }
        // Tolerate stretched or garbled "flash"/"card" ("flaaash", "carrds")
        let squeezed = squeeze_repeats(token);
        squeezed.starts_with("fla")
            || squeezed == "card"
            || squeezed == "cards"
            || NOTE_TYPOS.contains(&token)
    }

    fn word_position(tokens: &[String], words: &[&str]) -> Option<usize> {
        tokens.iter().position(|t| words.contains(&t.as_str()))
    }

    pub fn update_verb(&self, tokens: &[String]) -> Option<usize> {
        Self::word_position(tokens, UPDATE_VERBS)
    }

    pub fn search_verb(&self, tokens: &[String]) -> Option<usize> {
        Self::word_position(tokens, SEARCH_VERBS)
    }

    pub fn list_verb(&self, tokens: &[String]) -> Option<usize> {
        Self::word_position(tokens, LIST_VERBS)
    }

    pub fn navigate_verb(&self, tokens: &[String]) -> Option<usize> {
        Self::word_position(tokens, NAVIGATE_VERBS)
    }

    pub fn analyze_verb(&self, tokens: &[String]) -> Option<usize> {
        Self::word_position(tokens, ANALYZE_VERBS).or_else(|| {
            tokens
                .windows(2)
                .position(|w| w[0] == "how" && w[1] == "many")
        })
    }

    /// Does the text mention notes?
    pub fn matches_notes(&self, text: &str) -> bool {
        fuzzy::tokens(text).iter().any(|t| self.note_token(t).is_some())
    }

    /// Does the text mention flashcards?
    pub fn matches_flashcards(&self, text: &str) -> bool {
        let tokens = fuzzy::tokens(text);
        if tokens.iter().any(|t| self.flashcard_token(t).is_some()) {
            return true;
        }
        let collapsed: String = text.to_lowercase().split_whitespace().collect();
        COLLAPSED_FLASHCARD.is_match(&collapsed) || self.flash_card_pair(&tokens).is_some()
    }

    /// Does the text mention the schedule or a schedule entry?
    pub fn matches_schedule(&self, text: &str) -> bool {
        fuzzy::tokens(text)
            .iter()
            .any(|t| self.schedule_token(t).is_some())
    }

    /// Does the text ask for everything?
    pub fn matches_everything(&self, tokens: &[String]) -> bool {
        tokens.iter().any(|t| self.is_everything_word(t))
    }

    /// "everything", "anything", or a typo of "everything"
    pub fn is_everything_word(&self, token: &str) -> bool {
        EVERYTHING_WORDS.contains(&token)
            || within(
                token,
                "everything",
                self.policy.everything_distance,
                self.policy.min_fuzzy_len,
            )
    }

    /// Literal target word, no fuzzing
    pub fn literal_target(&self, token: &str) -> Option<TargetKind> {
        if NOTE_WORDS.contains(&token) {
            Some(TargetKind::Notes)
        } else if FLASHCARD_WORDS.contains(&token) {
            Some(TargetKind::Flashcards)
        } else if SCHEDULE_WORDS.contains(&token) || SCHEDULE_ENTRY_WORDS.contains(&token) {
            Some(TargetKind::Schedule)
        } else {
            None
        }
    }

    /// Every target mention in token order
    pub fn target_mentions(&self, tokens: &[String]) -> Vec<TargetMention> {
        let mut mentions = Vec::new();

        for (position, token) in tokens.iter().enumerate() {
            if let Some(fuzzy) = self.note_token(token) {
                mentions.push(TargetMention {
                    target: TargetKind::Notes,
                    position,
                    fuzzy,
                    weak: false,
                });
            } else if let Some(fuzzy) = self.flashcard_token(token) {
                mentions.push(TargetMention {
                    target: TargetKind::Flashcards,
                    position,
                    fuzzy,
                    weak: false,
                });
            } else if let Some((fuzzy, weak)) = self.schedule_token(token) {
                mentions.push(TargetMention {
                    target: TargetKind::Schedule,
                    position,
                    fuzzy,
                    weak,
                });
            }
        }

        if !mentions.iter().any(|m| m.target == TargetKind::Flashcards) {
            if let Some(position) = self.flash_card_pair(tokens) {
                mentions.push(TargetMention {
                    target: TargetKind::Flashcards,
                    position,
                    fuzzy: true,
                    weak: false,
                });
            } else {
                let collapsed: String = tokens.concat();
                if COLLAPSED_FLASHCARD.is_match(&collapsed) {
                    let position = tokens.iter().position(|t| t.starts_with("fla")).unwrap_or(0);
                    mentions.push(TargetMention {
                        target: TargetKind::Flashcards,
                        position,
                        fuzzy: true,
                        weak: false,
                    });
                }
            }
            mentions.sort_by_key(|m| m.position);
        }

        mentions
    }

    /// Some(is_fuzzy) if the token means notes
    fn note_token(&self, token: &str) -> Option<bool> {
        if NOTE_WORDS.contains(&token) {
            return Some(false);
        }
        if NOTE_TYPOS.contains(&token) {
            return Some(true);
        }
        if NOTE_LOOKALIKES.contains(&token) || self.is_known_word(token) {
            return None;
        }
        find_best_match(
            token,
            &["notes", "note"],
            self.policy.notes_distance,
            self.policy.min_fuzzy_len,
        )
        .map(|_| true)
    }

    /// Some(is_fuzzy) if the token means flashcards
    fn flashcard_token(&self, token: &str) -> Option<bool> {
        if FLASHCARD_WORDS.contains(&token) {
            return Some(false);
        }
        // Only long tokens are fuzzed against the long word
        if token.chars().count() < 7 {
            return None;
        }
        find_best_match(
            token,
            &["flashcards", "flashcard"],
            self.policy.flashcards_distance,
            self.policy.min_fuzzy_len,
        )
        .map(|_| true)
    }

    /// Some((is_fuzzy, is_weak)) if the token means the schedule
    fn schedule_token(&self, token: &str) -> Option<(bool, bool)> {
        if SCHEDULE_WORDS.contains(&token) {
            return Some((false, false));
        }
        if SCHEDULE_ENTRY_WORDS.contains(&token) {
            return Some((false, true));
        }
        if token.chars().count() < 6 || self.is_known_word(token) {
            return None;
        }
        find_best_match(
            token,
            SCHEDULE_FUZZY_ANCHORS,
            self.policy.schedule_distance,
            self.policy.min_fuzzy_len,
        )
        .map(|_| (true, false))
    }

    /// "flsh crads": one token close to "flash" followed by one close to "card"
    fn flash_card_pair(&self, tokens: &[String]) -> Option<usize> {
        let d = self.policy.flash_pair_distance;
        let min_len = self.policy.min_fuzzy_len;
        tokens.windows(2).position(|w| {
            within(&w[0], "flash", d, min_len)
                && (within(&w[1], "card", d, min_len) || within(&w[1], "cards", d, min_len))
        })
    }

    /// Any verb from the action tables, including aliases and listed typos
    pub fn is_action_word(&self, token: &str) -> bool {
        DELETE_VERBS.contains(&token)
            || DELETE_ALIASES.contains(&token)
            || DELETE_TYPOS.contains(&token)
            || CREATE_VERBS.contains(&token)
            || CREATE_TYPOS.contains(&token)
            || UPDATE_VERBS.contains(&token)
            || SEARCH_VERBS.contains(&token)
            || LIST_VERBS.contains(&token)
            || NAVIGATE_VERBS.contains(&token)
            || ANALYZE_VERBS.contains(&token)
            || CONVERT_VERBS.contains(&token)
    }

    /// Weak schedule noun ("exam", "meeting")
    pub fn is_schedule_entry_word(&self, token: &str) -> bool {
        SCHEDULE_ENTRY_WORDS.contains(&token)
    }

    /// Words with their own meaning that must never be fuzzed into something else
    fn is_known_word(&self, token: &str) -> bool {
        CREATE_VERBS.contains(&token)
            || UPDATE_VERBS.contains(&token)
            || SEARCH_VERBS.contains(&token)
            || LIST_VERBS.contains(&token)
            || NAVIGATE_VERBS.contains(&token)
            || ANALYZE_VERBS.contains(&token)
            || CONVERT_VERBS.contains(&token)
            || NOTE_WORDS.contains(&token)
            || FLASHCARD_WORDS.contains(&token)
            || SCHEDULE_WORDS.contains(&token)
            || SCHEDULE_ENTRY_WORDS.contains(&token)
            || EVERYTHING_WORDS.contains(&token)
            || matches!(
                token,
                "about" | "related" | "please" | "these" | "those" | "their" | "there" | "where"
                    | "notes" | "react" | "reader" | "relate"
            )
    }
}

/// Source and destination of a conversion, if the segment asks for one
///
/// "convert my notes into flashcards", "turn flashcards to notes",
/// "make flashcards from my notes".
pub fn convert_direction(lexicon: &Lexicon, tokens: &[String]) -> Option<(TargetKind, TargetKind)> {
    let mentions: Vec<TargetMention> = lexicon
        .target_mentions(tokens)
        .into_iter()
        .filter(|m| matches!(m.target, TargetKind::Notes | TargetKind::Flashcards))
        .collect();
    let first = mentions.first()?;
    let other = mentions.iter().find(|m| m.target != first.target)?;

    let has_convert_verb = tokens.iter().any(|t| CONVERT_VERBS.contains(&t.as_str()));
    let from_index = tokens.iter().position(|t| t == "from");

    match from_index {
        // "<dest> from <source>"
        Some(i) if first.position < i && other.position > i => Some((other.target, first.target)),
        // "convert <source> into <dest>"
        _ if has_convert_verb => {
            let pivot = tokens
                .iter()
                .position(|t| t == "into" || t == "to")
                .unwrap_or(usize::MAX);
            if first.position < pivot {
                Some((first.target, other.target))
            } else {
                Some((other.target, first.target))
            }
        }
        _ => None,
    }
}

/// Everything the rule table looks at, computed once per segment
#[derive(Debug, Clone)]
pub struct Signals {
    pub tokens: Vec<String>,
    pub delete: Option<VerbMatch>,
    pub create: Option<VerbMatch>,
    pub implicit_create: bool,
    pub convert: Option<(TargetKind, TargetKind)>,
    pub update: Option<usize>,
    pub search: Option<usize>,
    pub list: Option<usize>,
    pub navigate: Option<usize>,
    pub analyze: Option<usize>,
    pub targets: Vec<TargetMention>,
    pub everything: bool,
    pub has_all: bool,
    pub temporal: bool,
    fuzzy_verb_window: usize,
}

impl Signals {
    pub fn collect(lexicon: &Lexicon, segment: &str) -> Self {
        let tokens = fuzzy::tokens(segment);
        let collapsed = segment
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let temporal = strip_temporal(&collapsed) != collapsed;
        Self {
            delete: lexicon.delete_verb(&tokens),
            create: lexicon.create_verb(&tokens),
            implicit_create: lexicon.implicit_create(&tokens),
            convert: convert_direction(lexicon, &tokens),
            update: lexicon.update_verb(&tokens),
            search: lexicon.search_verb(&tokens),
            list: lexicon.list_verb(&tokens),
            navigate: lexicon.navigate_verb(&tokens),
            analyze: lexicon.analyze_verb(&tokens),
            targets: lexicon.target_mentions(&tokens),
            everything: lexicon.matches_everything(&tokens),
            has_all: tokens.iter().any(|t| t == "all" || t == "every"),
            temporal,
            fuzzy_verb_window: lexicon.policy().fuzzy_verb_window,
            tokens,
        }
    }

    fn explicit_delete(&self) -> Option<VerbMatch> {
        self.delete.filter(|m| m.kind != MatchKind::Fuzzy)
    }

    fn other_verb(&self) -> bool {
        self.update.is_some()
            || self.search.is_some()
            || self.list.is_some()
            || self.navigate.is_some()
            || self.analyze.is_some()
    }
}

type Rule = fn(&Signals) -> Option<(ActionKind, f32)>;

/// Ordered rule table; the first rule that fires decides the action
const RULES: &[(&str, Rule)] = &[
    ("convert", rule_convert),
    ("delete-or-create", rule_delete_or_create),
    ("update", rule_update),
    ("analyze", rule_analyze),
    ("search", rule_search),
    ("navigate", rule_navigate),
    ("list", rule_list),
    ("implicit-create", rule_implicit_create),
    ("fuzzy-delete", rule_fuzzy_delete),
];

fn rule_convert(s: &Signals) -> Option<(ActionKind, f32)> {
    s.convert.map(|_| (ActionKind::Convert, 0.9))
}

/// Delete vs create, including the tie-break when both verbs are present
fn rule_delete_or_create(s: &Signals) -> Option<(ActionKind, f32)> {
    match (s.explicit_delete(), s.create) {
        (Some(delete), Some(create)) => {
            if create.position == 0 && delete.position != 0 {
                Some((ActionKind::Create, create.kind.confidence() - 0.1))
            } else {
                // Starts with the delete verb, or ambiguous with a literal delete verb present
                Some((ActionKind::Delete, delete.kind.confidence() - 0.1))
            }
        }
        (Some(delete), None) => Some((ActionKind::Delete, delete.kind.confidence())),
        (None, Some(create)) => Some((ActionKind::Create, create.kind.confidence())),
        (None, None) => None,
    }
}

fn rule_update(s: &Signals) -> Option<(ActionKind, f32)> {
    s.update.map(|_| (ActionKind::Update, 0.85))
}

fn rule_analyze(s: &Signals) -> Option<(ActionKind, f32)> {
    s.analyze.map(|_| (ActionKind::Analyze, 0.85))
}

fn rule_search(s: &Signals) -> Option<(ActionKind, f32)> {
    s.search.map(|_| (ActionKind::Search, 0.9))
}

fn rule_navigate(s: &Signals) -> Option<(ActionKind, f32)> {
    s.navigate.map(|_| (ActionKind::Navigate, 0.85))
}

fn rule_list(s: &Signals) -> Option<(ActionKind, f32)> {
    s.list.map(|_| (ActionKind::List, 0.85))
}

fn rule_implicit_create(s: &Signals) -> Option<(ActionKind, f32)> {
    s.implicit_create.then_some((ActionKind::Create, 0.75))
}

/// A typo'd delete verb near the start, with nothing else competing
fn rule_fuzzy_delete(s: &Signals) -> Option<(ActionKind, f32)> {
    let verb = s.delete.filter(|m| m.kind == MatchKind::Fuzzy)?;
    if s.create.is_some() || s.implicit_create || s.other_verb() {
        return None;
    }
    // The verb has to lead: "notes about delta" is not a delete
    if s.targets.first().map(|m| m.position < verb.position).unwrap_or(false) {
        return None;
    }
    (verb.position < s.fuzzy_verb_window).then_some((ActionKind::Delete, MatchKind::Fuzzy.confidence()))
}

/// Per-segment classifier output
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: ActionKind,
    /// `None` when the segment names no target ("delete it")
    pub target: Option<TargetKind>,
    pub confidence: f32,
    /// Target-only segment; the action kind is a guess
    pub inferred: bool,
}

/// Rule-based per-segment intent classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    lexicon: Lexicon,
}

impl IntentClassifier {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Classify one segment, or `None` when nothing actionable is present
    pub fn classify(&self, segment: &str) -> Option<Classification> {
        let signals = Signals::collect(&self.lexicon, segment);

        let fired = RULES
            .iter()
            .find_map(|(name, rule)| rule(&signals).map(|hit| (*name, hit)));

        let Some((rule, (kind, mut confidence))) = fired else {
            // Strong target-only signal: "flashcards about react"
            let mention = Self::pick_target(&signals.targets)?;
            debug!("🎯 '{}' -> target-only {:?}", segment, mention.target);
            return Some(Classification {
                kind: ActionKind::Search,
                target: Some(mention.target),
                confidence: 0.5,
                inferred: true,
            });
        };

        let target = self.resolve_target(kind, &signals);
        if signals
            .targets
            .iter()
            .any(|m| Some(m.target) == target && m.fuzzy)
        {
            confidence -= 0.1;
        }

        debug!(
            "🎯 '{}' -> {:?} {:?} via {} ({:.2})",
            segment, kind, target, rule, confidence
        );

        Some(Classification {
            kind,
            target,
            confidence,
            inferred: false,
        })
    }

    fn pick_target(mentions: &[TargetMention]) -> Option<TargetMention> {
        mentions
            .iter()
            .find(|m| !m.weak)
            .or_else(|| mentions.first())
            .copied()
    }

    fn resolve_target(&self, kind: ActionKind, s: &Signals) -> Option<TargetKind> {
        if kind == ActionKind::Convert {
            return s.convert.map(|(_, to)| to);
        }

        if let Some(mention) = Self::pick_target(&s.targets) {
            return Some(mention.target);
        }

        if s.everything || (s.has_all && kind != ActionKind::Create) {
            return Some(TargetKind::All);
        }

        match kind {
            ActionKind::Create if s.temporal => Some(TargetKind::Schedule),
            ActionKind::Update if s.temporal => Some(TargetKind::Schedule),
            ActionKind::Navigate => Some(TargetKind::Page),
            ActionKind::Analyze | ActionKind::Search | ActionKind::List => Some(TargetKind::All),
            _ => None,
        }
    }
}

/// A whole-utterance classification strategy.
///
/// The rule-based pipeline and the AI-backed classifier both implement this so
/// the pipeline can pick one by policy and fall back to the other.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Turn a normalized utterance into an ordered action list
    async fn classify_request(&self, text: &str) -> AssistResult<Option<TaskRequest>>;

    /// Strategy name for logs
    fn name(&self) -> &str;
}

/// Collapse runs of the same letter ("flaaash" -> "flash")
fn squeeze_repeats(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut last = None;
    for c in token.chars() {
        if Some(c) != last {
            out.push(c);
        }
        last = Some(c);
    }
    out
}
