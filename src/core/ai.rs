//! AI-assisted classification and content generation
//!
//! Both components sit on top of a [`Reasoner`]. Anything the model says
//! that is not usable JSON is discarded; callers then take the rule-based
//! path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::classifier::Classifier;
use super::ollama::{extract_json, ChatMessage, Reasoner};
use crate::error::AssistResult;
use crate::model::{
    ActionKind, Difficulty, Params, PlannedTask, Subject, TargetKind, TaskAction, TaskRequest,
};
use crate::utils::fuzzy;

const CLASSIFY_PROMPT: &str = r#"You turn study-assistant requests into JSON actions.
Respond with ONLY one JSON object:
{"message": "short restatement", "confidence": 0.0-1.0,
 "actions": [{"id": "t1", "type": "create|delete|update|search|list|navigate|analyze|convert",
              "target": "notes|flashcards|schedule|all|page",
              "data": {"topic": "...", "count": 5, "difficulty": "easy|medium|hard",
                       "date": "YYYY-MM-DD", "time": "HH:MM", "from": "notes", "to": "flashcards"},
              "depends_on": []}]}
Rules:
- One action per requested operation, in the order they must run.
- Omit data fields that were not asked for.
- "delete everything" is type delete, target all, no topic.
- Use depends_on only when a task needs the output of another task.
- If the request is not about notes, flashcards or the schedule, return {"actions": []}."#;

/// Lenient wire shape of the model's reply
#[derive(Debug, Deserialize)]
struct WireRequest {
    #[serde(default)]
    actions: Vec<WireAction>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WireAction {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    target: String,
    #[serde(default)]
    data: WireData,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireData {
    topic: Option<String>,
    count: Option<u32>,
    difficulty: Option<String>,
    date: Option<String>,
    time: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde(default)]
    subjects: Vec<Subject>,
}

/// Classifier that asks the language model for the whole action list
pub struct AiClassifier {
    reasoner: Arc<dyn Reasoner>,
    max_create_count: u32,
}

impl AiClassifier {
    pub fn new(reasoner: Arc<dyn Reasoner>, max_create_count: u32) -> Self {
        Self {
            reasoner,
            max_create_count: max_create_count.max(1),
        }
    }

    /// Convert a model reply into a request; `None` for anything unusable
    pub fn parse_reply(&self, reply: &str) -> Option<TaskRequest> {
        let Some(json) = extract_json(reply) else {
            debug!("No JSON found in model reply: {}", reply);
            return None;
        };

        let wire: WireRequest = match serde_json::from_str(json) {
            Ok(wire) => wire,
            Err(e) => {
                warn!("❌ Failed to parse model reply: {} - Raw: {}", e, json);
                return None;
            }
        };

        let is_plan = wire
            .actions
            .iter()
            .any(|a| !a.depends_on.is_empty());
        let confidence = wire.confidence.unwrap_or(0.8);

        let mut plan = Vec::new();
        for (index, wire_action) in wire.actions.into_iter().enumerate() {
            let id = wire_action
                .id
                .clone()
                .unwrap_or_else(|| format!("t{}", index + 1));
            let depends_on = wire_action.depends_on.clone();
            match self.to_action(wire_action) {
                Some(action) => plan.push(PlannedTask {
                    id,
                    action,
                    depends_on,
                }),
                None => warn!("⚠️ Dropping unusable action {} from model reply", id),
            }
        }

        if plan.is_empty() {
            return None;
        }

        let message = if wire.message.is_empty() {
            "AI classification".to_string()
        } else {
            wire.message
        };

        Some(if is_plan {
            TaskRequest::from_plan(plan, message, confidence)
        } else {
            let actions = plan.into_iter().map(|t| t.action).collect();
            TaskRequest::new(actions, message, confidence)
        })
    }

    fn to_action(&self, wire: WireAction) -> Option<TaskAction> {
        let kind = ActionKind::parse(&wire.kind)?;
        let target = TargetKind::parse(&wire.target).or(match kind {
            ActionKind::Navigate => Some(TargetKind::Page),
            ActionKind::Search | ActionKind::List | ActionKind::Analyze => Some(TargetKind::All),
            _ => None,
        })?;

        let data = wire.data;
        let mut params = Params {
            topic: data.topic.filter(|t| !t.trim().is_empty()),
            count: data.count.map(|c| c.clamp(1, self.max_create_count)),
            difficulty: data.difficulty.as_deref().and_then(parse_difficulty),
            date: data
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            time: data
                .time
                .as_deref()
                .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok()),
            from: data.from.as_deref().and_then(TargetKind::parse),
            to: data.to.as_deref().and_then(TargetKind::parse),
            subjects: data.subjects,
            wipe: false,
        };
        params.wipe = kind == ActionKind::Delete && params.topic.is_none();

        if kind == ActionKind::Convert {
            let to = params.to.unwrap_or(target);
            params.to = Some(to);
            params.from = params.from.or(Some(if to == TargetKind::Notes {
                TargetKind::Flashcards
            } else {
                TargetKind::Notes
            }));
        }

        TaskAction::simple(kind, target, params).ok()
    }
}

#[async_trait]
impl Classifier for AiClassifier {
    async fn classify_request(&self, text: &str) -> AssistResult<Option<TaskRequest>> {
        let messages = [ChatMessage::system(CLASSIFY_PROMPT), ChatMessage::user(text)];

        let reply = match self.reasoner.reason(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("⚠️ AI classification unavailable: {}", e);
                return Ok(None);
            }
        };

        let request = self.parse_reply(&reply);
        if let Some(request) = &request {
            info!(
                "🤖 AI classified '{}' into {} action(s)",
                text,
                request.actions.len()
            );
        }
        Ok(request)
    }

    fn name(&self) -> &str {
        "ai"
    }
}

fn parse_difficulty(value: &str) -> Option<Difficulty> {
    match value.trim().to_lowercase().as_str() {
        "easy" | "beginner" | "simple" => Some(Difficulty::Easy),
        "medium" | "intermediate" => Some(Difficulty::Medium),
        "hard" | "advanced" | "difficult" => Some(Difficulty::Hard),
        _ => None,
    }
}

/// How involved an utterance looks; long multi-clause requests go to the AI first
pub fn complexity(text: &str) -> f32 {
    let tokens = fuzzy::tokens(text);
    let connectors = tokens
        .iter()
        .filter(|t| matches!(t.as_str(), "and" | "then" | "also" | "plus" | "after" | "next"))
        .count() as f32;
    let commas = text.matches(',').count() as f32;
    let numbers = tokens
        .iter()
        .filter(|t| t.chars().all(|c| c.is_ascii_digit()))
        .count() as f32;
    let length = if tokens.len() > 15 { 1.0 } else { 0.0 };

    connectors + commas + 0.5 * numbers + length
}

/// A generated question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardContent {
    pub question: String,
    pub answer: String,
}

/// A generated note body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteContent {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct WireCards {
    #[serde(default)]
    cards: Vec<CardContent>,
}

const CARD_TEMPLATES: &[(&str, &str)] = &[
    ("What is {topic}?", "A short definition of {topic} in your own words."),
    ("Why does {topic} matter?", "The main problem {topic} solves and where it is used."),
    ("Name a key concept of {topic}.", "One core idea of {topic} and how it works."),
    ("Give an example of {topic} in practice.", "A concrete, worked example of {topic}."),
    ("What is a common mistake with {topic}?", "A typical pitfall in {topic} and how to avoid it."),
    ("How does {topic} compare to related ideas?", "How {topic} differs from similar concepts."),
];

/// Builds record content, through the model when one is available
pub struct ContentGenerator {
    reasoner: Option<Arc<dyn Reasoner>>,
}

impl ContentGenerator {
    pub fn new(reasoner: Option<Arc<dyn Reasoner>>) -> Self {
        Self { reasoner }
    }

    /// Template-only generator
    pub fn offline() -> Self {
        Self { reasoner: None }
    }

    /// `count` question/answer pairs about `topic`
    pub async fn flashcards(
        &self,
        topic: &str,
        count: u32,
        difficulty: Option<Difficulty>,
    ) -> Vec<CardContent> {
        let count = count as usize;
        let mut cards = match &self.reasoner {
            Some(reasoner) => self.ai_cards(reasoner.as_ref(), topic, count, difficulty).await,
            None => Vec::new(),
        };
        cards.truncate(count);

        let start = cards.len();
        cards.extend((start..count).map(|i| template_card(topic, i, difficulty)));
        cards
    }

    async fn ai_cards(
        &self,
        reasoner: &dyn Reasoner,
        topic: &str,
        count: usize,
        difficulty: Option<Difficulty>,
    ) -> Vec<CardContent> {
        let level = difficulty.map(|d| d.as_str()).unwrap_or("medium");
        let messages = [
            ChatMessage::system(
                "You write study flashcards. Respond with ONLY JSON: \
                 {\"cards\": [{\"question\": \"...\", \"answer\": \"...\"}]}",
            ),
            ChatMessage::user(format!(
                "Write {count} {level} flashcards about {topic}."
            )),
        ];

        let reply = match reasoner.reason(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("⚠️ Flashcard generation fell back to templates: {}", e);
                return Vec::new();
            }
        };

        extract_json(&reply)
            .and_then(|json| serde_json::from_str::<WireCards>(json).ok())
            .map(|wire| {
                wire.cards
                    .into_iter()
                    .filter(|c| !c.question.trim().is_empty() && !c.answer.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Title and body for the `index`-th of `count` notes about `topic`
    pub async fn note(&self, topic: &str, index: usize, count: usize) -> NoteContent {
        if let Some(reasoner) = &self.reasoner {
            let messages = [
                ChatMessage::system(
                    "You write concise study notes. Respond with ONLY JSON: \
                     {\"title\": \"...\", \"content\": \"...\"}",
                ),
                ChatMessage::user(format!("Write a study note about {topic}.")),
            ];
            match reasoner.reason(&messages).await {
                Ok(reply) => {
                    if let Some(note) = extract_json(&reply)
                        .and_then(|json| serde_json::from_str::<NoteContent>(json).ok())
                        .filter(|n| !n.content.trim().is_empty())
                    {
                        return note;
                    }
                    debug!("Unusable note reply, using template");
                }
                Err(e) => warn!("⚠️ Note generation fell back to templates: {}", e),
            }
        }
        template_note(topic, index, count)
    }
}

fn template_card(topic: &str, index: usize, difficulty: Option<Difficulty>) -> CardContent {
    let (question, answer) = CARD_TEMPLATES[index % CARD_TEMPLATES.len()];
    let round = index / CARD_TEMPLATES.len();
    let mut question = question.replace("{topic}", topic);
    if round > 0 {
        question = format!("{} ({})", question, round + 1);
    }
    let mut answer = answer.replace("{topic}", topic);
    if let Some(level) = difficulty {
        answer = format!("{} [{}]", answer, level.as_str());
    }
    CardContent { question, answer }
}

fn template_note(topic: &str, index: usize, count: usize) -> NoteContent {
    let title = if count > 1 {
        format!("{} notes ({}/{})", capitalize(topic), index + 1, count)
    } else {
        format!("{} notes", capitalize(topic))
    };
    NoteContent {
        title,
        content: format!(
            "Study notes on {topic}.\nKey terms:\nMain ideas:\nQuestions to review:"
        ),
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct Canned(&'static str);

    #[async_trait]
    impl Reasoner for Canned {
        async fn reason(&self, _messages: &[ChatMessage]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn classifier(reply: &'static str) -> AiClassifier {
        AiClassifier::new(Arc::new(Canned(reply)), 100)
    }

    #[tokio::test]
    async fn test_parses_embedded_json() {
        let reply = r#"Here you go:
{"message": "wipe then create", "confidence": 0.9, "actions": [
  {"type": "delete", "target": "flashcards"},
  {"type": "create", "target": "flashcards", "data": {"topic": "biology", "count": 5}}
]}"#;
        let request = classifier(reply)
            .classify_request("delete all flashcards and create 5 about biology")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.actions.len(), 2);
        assert!(request.actions[0].params().wipe);
        assert_eq!(request.actions[1].topic(), Some("biology"));
        assert!(request.plan.is_none());
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades() {
        for reply in ["I can't help with that", "{not json}", "{\"actions\": []}"] {
            let result = classifier(reply).classify_request("anything").await.unwrap();
            assert!(result.is_none(), "reply {:?} should be discarded", reply);
        }
    }

    #[test]
    fn test_plan_with_dependencies() {
        let reply = r#"{"actions": [
  {"id": "a", "type": "convert", "target": "flashcards", "data": {"topic": "react"}, "depends_on": ["b"]},
  {"id": "b", "type": "create", "target": "notes", "data": {"topic": "react"}}
]}"#;
        let request = classifier(reply).parse_reply(reply).unwrap();
        let plan = request.plan.unwrap();
        assert_eq!(plan[0].depends_on, vec!["b".to_string()]);
        assert_eq!(plan[0].action.params().from, Some(TargetKind::Notes));
    }

    #[test]
    fn test_unknown_kinds_are_dropped() {
        let reply = r#"{"actions": [{"type": "dance", "target": "notes"}, {"type": "list", "target": "notes"}]}"#;
        let request = classifier(reply).parse_reply(reply).unwrap();
        assert_eq!(request.actions.len(), 1);
    }

    #[test]
    fn test_template_cards_carry_topic() {
        let cards = tokio_test::block_on(ContentGenerator::offline().flashcards("rust", 8, None));
        assert_eq!(cards.len(), 8);
        assert!(cards.iter().all(|c| c.question.contains("rust")));
        // Repeated templates stay distinct
        assert_ne!(cards[0].question, cards[6].question);
    }

    #[tokio::test]
    async fn test_ai_cards_are_padded() {
        let generator = ContentGenerator::new(Some(Arc::new(Canned(
            r#"{"cards": [{"question": "What is ownership?", "answer": "Rust's memory model"}]}"#,
        ))));
        let cards = generator.flashcards("rust", 3, None).await;
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].question, "What is ownership?");
    }

    #[test]
    fn test_complexity() {
        assert!(complexity("make 5 flashcards") < 3.0);
        assert!(
            complexity("delete all notes, then make 12 ai and 15 react flashcards and quiz me")
                >= 3.0
        );
    }
}
