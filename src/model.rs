//! Core data model
//!
//! Actions flowing out of the classifier, results flowing out of the executor,
//! and the record shapes owned by the storage collaborator.

use crate::error::{AssistError, AssistResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// What an action does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Delete,
    Update,
    Search,
    List,
    Navigate,
    Analyze,
    Convert,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Delete => "delete",
            ActionKind::Update => "update",
            ActionKind::Search => "search",
            ActionKind::List => "list",
            ActionKind::Navigate => "navigate",
            ActionKind::Analyze => "analyze",
            ActionKind::Convert => "convert",
        }
    }

    /// Lenient parse used for LLM output
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "create" | "make" | "generate" | "add" => Some(ActionKind::Create),
            "delete" | "remove" | "clear" => Some(ActionKind::Delete),
            "update" | "edit" | "modify" => Some(ActionKind::Update),
            "search" | "find" => Some(ActionKind::Search),
            "list" | "show" => Some(ActionKind::List),
            "navigate" | "open" => Some(ActionKind::Navigate),
            "analyze" | "analyse" => Some(ActionKind::Analyze),
            "convert" => Some(ActionKind::Convert),
            _ => None,
        }
    }
}

/// Which collection (or surface) an action operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Notes,
    Flashcards,
    Schedule,
    All,
    Page,
    Content,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Notes => "notes",
            TargetKind::Flashcards => "flashcards",
            TargetKind::Schedule => "schedule",
            TargetKind::All => "all",
            TargetKind::Page => "page",
            TargetKind::Content => "content",
        }
    }

    /// Lenient parse used for LLM output
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "notes" | "note" => Some(TargetKind::Notes),
            "flashcards" | "flashcard" | "cards" | "card" => Some(TargetKind::Flashcards),
            "schedule" | "calendar" | "events" | "event" | "reminders" => {
                Some(TargetKind::Schedule)
            }
            "all" | "everything" => Some(TargetKind::All),
            "page" => Some(TargetKind::Page),
            "content" => Some(TargetKind::Content),
            _ => None,
        }
    }

    /// Backing collection, if this target maps to exactly one
    pub fn collection(&self) -> Option<Collection> {
        match self {
            TargetKind::Notes => Some(Collection::Notes),
            TargetKind::Flashcards => Some(Collection::Flashcards),
            TargetKind::Schedule => Some(Collection::Schedule),
            _ => None,
        }
    }

    /// Collections touched by this target (`All` expands to every collection)
    pub fn collections(&self) -> Vec<Collection> {
        match self {
            TargetKind::All => Collection::ALL.to_vec(),
            other => other.collection().into_iter().collect(),
        }
    }

    /// Human noun for summaries, singular when `count == 1`
    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count == 1) {
            (TargetKind::Notes, true) => "note",
            (TargetKind::Notes, false) => "notes",
            (TargetKind::Flashcards, true) => "flashcard",
            (TargetKind::Flashcards, false) => "flashcards",
            (TargetKind::Schedule, true) => "schedule item",
            (TargetKind::Schedule, false) => "schedule items",
            (TargetKind::All, true) => "record",
            (TargetKind::All, false) => "records",
            (TargetKind::Page, _) => "page",
            (TargetKind::Content, _) => "content",
        }
    }
}

/// A concrete record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Notes,
    Flashcards,
    Schedule,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Notes, Collection::Flashcards, Collection::Schedule];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Notes => "notes",
            Collection::Flashcards => "flashcards",
            Collection::Schedule => "schedule",
        }
    }

    pub fn target(&self) -> TargetKind {
        match self {
            Collection::Notes => TargetKind::Notes,
            Collection::Flashcards => TargetKind::Flashcards,
            Collection::Schedule => TargetKind::Schedule,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// One topic/count pair of a multi-subject request ("12 ai and 15 react flashcards")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub topic: String,
    pub count: u32,
}

/// Parameters pulled out of a segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<TargetKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<TargetKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
    /// An explicit "all"/"everything" quantifier with no topic
    #[serde(default)]
    pub wipe: bool,
}

impl Params {
    /// Topic, treating blank strings as absent
    pub fn topic(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A single classified, parameterized operation against one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAction {
    #[serde(rename = "type")]
    kind: ActionKind,
    target: TargetKind,
    #[serde(rename = "data")]
    params: Params,
    priority: Priority,
}

impl TaskAction {
    /// Build an action, enforcing the per-kind invariants
    pub fn new(
        kind: ActionKind,
        target: TargetKind,
        params: Params,
        priority: Priority,
    ) -> AssistResult<Self> {
        if kind == ActionKind::Convert && (params.from.is_none() || params.to.is_none()) {
            return Err(AssistError::InvalidAction(
                "convert requires both a source and a destination".to_string(),
            ));
        }
        Ok(Self {
            kind,
            target,
            params,
            priority,
        })
    }

    /// Shorthand for an action at its kind's default priority
    pub fn simple(kind: ActionKind, target: TargetKind, params: Params) -> AssistResult<Self> {
        let priority = if kind == ActionKind::Delete {
            Priority::High
        } else {
            Priority::Normal
        };
        Self::new(kind, target, params, priority)
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn target(&self) -> TargetKind {
        self.target
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn topic(&self) -> Option<&str> {
        self.params.topic()
    }
}

/// A node of a decomposed plan; executed after every task it depends on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTask {
    pub id: String,
    pub action: TaskAction,
    pub depends_on: Vec<String>,
}

/// Classifier output; `actions` are in execution order unless `plan` is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRequest {
    pub actions: Vec<TaskAction>,
    pub message: String,
    pub confidence: f32,
    /// Dependency graph for decomposed requests (same actions, declaration order)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Vec<PlannedTask>>,
}

impl TaskRequest {
    pub fn new(actions: Vec<TaskAction>, message: impl Into<String>, confidence: f32) -> Self {
        Self {
            actions,
            message: message.into(),
            confidence: confidence.clamp(0.0, 1.0),
            plan: None,
        }
    }

    pub fn from_plan(plan: Vec<PlannedTask>, message: impl Into<String>, confidence: f32) -> Self {
        let actions = plan.iter().map(|t| t.action.clone()).collect();
        Self {
            plan: Some(plan),
            ..Self::new(actions, message, confidence)
        }
    }

    pub fn has_delete(&self) -> bool {
        self.actions.iter().any(|a| a.kind() == ActionKind::Delete)
    }
}

/// Outcome of executing one action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl TaskResult {
    pub fn ok(message: impl Into<String>, count: usize) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            count: Some(count),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            count: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// A record before storage has assigned its id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDraft {
    Note {
        title: String,
        content: String,
        category: String,
        tags: Vec<String>,
    },
    Flashcard {
        question: String,
        answer: String,
        category: String,
    },
    Schedule {
        title: String,
        date: NaiveDate,
        time: NaiveTime,
        kind: String,
    },
}

impl RecordDraft {
    pub fn collection(&self) -> Collection {
        match self {
            RecordDraft::Note { .. } => Collection::Notes,
            RecordDraft::Flashcard { .. } => Collection::Flashcards,
            RecordDraft::Schedule { .. } => Collection::Schedule,
        }
    }

    /// Materialize with a storage-assigned id and timestamp
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> Record {
        match self {
            RecordDraft::Note {
                title,
                content,
                category,
                tags,
            } => Record::Note(Note {
                id,
                title,
                content,
                category,
                tags,
                created_at,
            }),
            RecordDraft::Flashcard {
                question,
                answer,
                category,
            } => Record::Flashcard(Flashcard {
                id,
                question,
                answer,
                category,
                created_at,
            }),
            RecordDraft::Schedule {
                title,
                date,
                time,
                kind,
            } => Record::Schedule(ScheduleItem {
                id,
                title,
                date,
                time,
                kind,
                created_at,
            }),
        }
    }
}

/// Any stored record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Note(Note),
    Flashcard(Flashcard),
    Schedule(ScheduleItem),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Record::Note(n) => &n.id,
            Record::Flashcard(f) => &f.id,
            Record::Schedule(s) => &s.id,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Record::Note(_) => Collection::Notes,
            Record::Flashcard(_) => Collection::Flashcards,
            Record::Schedule(_) => Collection::Schedule,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            Record::Note(n) => &n.category,
            Record::Flashcard(f) => &f.category,
            Record::Schedule(s) => &s.kind,
        }
    }

    /// Lowercased composite of every user-visible text field
    pub fn searchable_text(&self) -> String {
        let text = match self {
            Record::Note(n) => format!(
                "{} {} {} {}",
                n.title,
                n.content,
                n.category,
                n.tags.join(" ")
            ),
            Record::Flashcard(f) => format!("{} {} {}", f.question, f.answer, f.category),
            Record::Schedule(s) => format!("{} {} {} {}", s.title, s.kind, s.date, s.time),
        };
        text.to_lowercase()
    }

    /// Serialize the inner record as stored
    pub fn to_json(&self) -> AssistResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored body; the collection decides the shape
    pub fn from_json(collection: Collection, body: &str) -> AssistResult<Self> {
        Ok(match collection {
            Collection::Notes => Record::Note(serde_json::from_str(body)?),
            Collection::Flashcards => Record::Flashcard(serde_json::from_str(body)?),
            Collection::Schedule => Record::Schedule(serde_json::from_str(body)?),
        })
    }
}

/// What `handle` hands back to the voice or chat layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub message: String,
    pub success: bool,
    pub requires_confirmation: bool,
}

impl Response {
    pub fn new(message: impl Into<String>, success: bool) -> Self {
        Self {
            message: message.into(),
            success,
            requires_confirmation: false,
        }
    }

    pub fn confirmation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            requires_confirmation: true,
        }
    }
}
