//! Action execution
//!
//! Runs classified actions against the record store, one at a time. Each
//! action yields exactly one [`TaskResult`]; a failing action never stops
//! the ones after it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Local, NaiveTime};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::config::{Config, FuzzyPolicy};
use crate::core::ai::{capitalize, ContentGenerator};
use crate::core::classifier::Lexicon;
use crate::core::dates::DEFAULT_TIME;
use crate::error::AssistResult;
use crate::model::{
    ActionKind, Collection, PlannedTask, Record, RecordDraft, TargetKind, TaskAction, TaskRequest,
    TaskResult,
};
use crate::storage::RecordStore;
use crate::utils::fuzzy::{self, all_tokens_close};

/// Topic used when a create names none
const FALLBACK_TOPIC: &str = "general";

/// Executes actions against the store
pub struct Executor {
    store: Arc<dyn RecordStore>,
    content: ContentGenerator,
    audit: AuditLog,
    lexicon: Lexicon,
    default_flashcard_count: u32,
    convert_pairs_per_note: usize,
}

impl Executor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        content: ContentGenerator,
        audit: AuditLog,
        config: &Config,
    ) -> Self {
        Self {
            store,
            content,
            audit,
            lexicon: Lexicon::new(config.fuzzy.clone()),
            default_flashcard_count: config.default_flashcard_count,
            convert_pairs_per_note: config.convert_pairs_per_note.max(1),
        }
    }

    fn policy(&self) -> &FuzzyPolicy {
        self.lexicon.policy()
    }

    /// Run a request: in plan order when it carries a plan, else in list order
    pub async fn execute_request(&self, request: &TaskRequest) -> Vec<TaskResult> {
        match &request.plan {
            Some(plan) => self.execute_plan(plan).await,
            None => self.execute(&request.actions).await,
        }
    }

    /// Run actions strictly in list order
    pub async fn execute(&self, actions: &[TaskAction]) -> Vec<TaskResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.execute_action(action).await);
        }
        results
    }

    /// Run a dependency graph; results line up with the plan's declaration order
    pub async fn execute_plan(&self, plan: &[PlannedTask]) -> Vec<TaskResult> {
        let order = execution_order(plan);
        let mut results: Vec<Option<TaskResult>> = vec![None; plan.len()];

        for index in order {
            results[index] = Some(self.execute_action(&plan[index].action).await);
        }

        results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| TaskResult::failure("Task was not executed")))
            .collect()
    }

    /// Run one action, converting errors into a failed result
    pub async fn execute_action(&self, action: &TaskAction) -> TaskResult {
        debug!(
            "▶️ {} {} {:?}",
            action.kind().as_str(),
            action.target().as_str(),
            action.params()
        );
        match self.dispatch(action).await {
            Ok(result) => result,
            Err(e) => {
                warn!("❌ {} {} failed: {}", action.kind().as_str(), action.target().as_str(), e);
                TaskResult::failure(format!(
                    "Could not {} {}: {}",
                    action.kind().as_str(),
                    action.target().as_str(),
                    e
                ))
            }
        }
    }

    async fn dispatch(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        use ActionKind::*;
        use TargetKind::*;

        match (action.kind(), action.target()) {
            (Delete, Notes | Flashcards | Schedule | All) => self.delete(action),
            (Create, Notes) => self.create_notes(action).await,
            (Create, Flashcards) => self.create_flashcards(action).await,
            (Create, Schedule) => self.create_schedule(action),
            (Search, Notes | Flashcards | Schedule | All) => self.search(action),
            (List, Notes | Flashcards | Schedule | All) => self.list(action),
            (Navigate, _) => Ok(self.navigate(action)),
            (Analyze, Notes | Flashcards | Schedule | All) => self.analyze(action),
            (Update, Schedule) => self.reschedule(action),
            (Convert, _) => self.convert(action),
            (kind, target) => Ok(TaskResult::failure(format!(
                "Can't {} {} yet",
                kind.as_str(),
                target.as_str()
            ))),
        }
    }

    /// Records whose text contains the topic, with a per-token fuzzy fallback
    fn matching<'a>(&self, records: &'a [Record], topic: &str) -> Vec<&'a Record> {
        let needle = topic.to_lowercase();
        let hits: Vec<&Record> = records
            .iter()
            .filter(|r| r.searchable_text().contains(&needle))
            .collect();
        if !hits.is_empty() {
            return hits;
        }

        records
            .iter()
            .filter(|r| {
                all_tokens_close(
                    &needle,
                    &r.searchable_text(),
                    self.policy().record_token_distance,
                    self.policy().min_fuzzy_len,
                )
            })
            .collect()
    }

    fn select<'a>(&self, records: &'a [Record], topic: Option<&str>) -> Vec<&'a Record> {
        match topic {
            Some(topic) => self.matching(records, topic),
            None => records.iter().collect(),
        }
    }

    fn delete(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let topic = action.topic();
        let params = action.params();
        let mut removed_ids = Vec::new();

        for collection in action.target().collections() {
            let records = self.store.load(collection)?;

            let removed = match topic {
                Some(topic) => {
                    let doomed: Vec<String> = self
                        .matching(&records, topic)
                        .into_iter()
                        .map(|r| r.id().to_string())
                        .collect();
                    let doomed = limit_latest(doomed, params.count, params.wipe);
                    for id in &doomed {
                        self.store.remove(collection, id)?;
                    }
                    doomed
                }
                None => {
                    let ids: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
                    match params.count.filter(|_| !params.wipe) {
                        Some(n) if (n as usize) < ids.len() => {
                            let doomed = limit_latest(ids, Some(n), false);
                            for id in &doomed {
                                self.store.remove(collection, id)?;
                            }
                            doomed
                        }
                        _ => {
                            self.store.save(collection, &[])?;
                            ids
                        }
                    }
                }
            };

            self.audit
                .log_delete(collection.as_str(), topic, removed.len());
            removed_ids.extend(removed);
        }

        let count = removed_ids.len();
        let noun = action.target().noun(count);
        info!("🗑️ Deleted {} {} (topic: {:?})", count, noun, topic);

        let message = match topic {
            Some(topic) => format!("Deleted {} {} about \"{}\"", count, noun, topic),
            None => format!("Deleted {} {}", count, noun),
        };
        Ok(TaskResult::ok(message, count).with_data(json!({ "removed": removed_ids })))
    }

    async fn create_flashcards(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let params = action.params();
        let batches: Vec<(String, u32)> = if params.subjects.is_empty() {
            vec![(
                action.topic().unwrap_or(FALLBACK_TOPIC).to_string(),
                params.count.unwrap_or(self.default_flashcard_count),
            )]
        } else {
            params
                .subjects
                .iter()
                .map(|s| (s.topic.clone(), s.count))
                .collect()
        };

        let mut drafts = Vec::new();
        for (topic, count) in &batches {
            let cards = self.content.flashcards(topic, *count, params.difficulty).await;
            drafts.extend(cards.into_iter().map(|card| RecordDraft::Flashcard {
                question: card.question,
                answer: card.answer,
                category: topic.clone(),
            }));
        }

        let created = self.store.add_batch(drafts)?;
        let topics: Vec<&str> = batches.iter().map(|(t, _)| t.as_str()).collect();
        info!("📇 Created {} flashcards about {:?}", created.len(), topics);

        Ok(created_result(TargetKind::Flashcards, &topics, &created))
    }

    async fn create_notes(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let params = action.params();
        let batches: Vec<(String, u32)> = if params.subjects.is_empty() {
            vec![(
                action.topic().unwrap_or(FALLBACK_TOPIC).to_string(),
                params.count.unwrap_or(1),
            )]
        } else {
            params
                .subjects
                .iter()
                .map(|s| (s.topic.clone(), s.count))
                .collect()
        };

        let mut drafts = Vec::new();
        for (topic, count) in &batches {
            let count = *count as usize;
            for index in 0..count {
                let note = self.content.note(topic, index, count).await;
                drafts.push(RecordDraft::Note {
                    title: note.title,
                    content: note.content,
                    category: topic.clone(),
                    tags: vec![topic.clone()],
                });
            }
        }

        let created = self.store.add_batch(drafts)?;
        let topics: Vec<&str> = batches.iter().map(|(t, _)| t.as_str()).collect();
        info!("📝 Created {} notes about {:?}", created.len(), topics);

        Ok(created_result(TargetKind::Notes, &topics, &created))
    }

    fn create_schedule(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let params = action.params();
        let title = action.topic().unwrap_or("study session").to_string();
        let date = params.date.unwrap_or_else(|| Local::now().date_naive());
        let time = params
            .time
            .or_else(|| NaiveTime::from_hms_opt(DEFAULT_TIME.0, DEFAULT_TIME.1, 0))
            .unwrap_or_default();
        let kind = fuzzy::tokens(&title)
            .into_iter()
            .rev()
            .find(|t| self.lexicon.is_schedule_entry_word(t))
            .map(|t| {
                if t.ends_with('s') && !t.ends_with("ss") {
                    t[..t.len() - 1].to_string()
                } else {
                    t
                }
            })
            .unwrap_or_else(|| "study".to_string());

        let count = params.count.unwrap_or(1).max(1);
        let drafts = (0..count)
            .map(|_| RecordDraft::Schedule {
                title: capitalize(&title),
                date,
                time,
                kind: kind.clone(),
            })
            .collect();

        let created = self.store.add_batch(drafts)?;
        info!("📅 Scheduled '{}' on {} at {}", title, date, time.format("%H:%M"));

        let mut result = created_result(TargetKind::Schedule, &[title.as_str()], &created);
        result.message = format!(
            "Scheduled \"{}\" on {} at {}",
            title,
            date.format("%A, %B %-d"),
            time.format("%H:%M")
        );
        Ok(result)
    }

    fn search(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let topic = action.topic();
        let mut found = Vec::new();
        for collection in action.target().collections() {
            let records = self.store.load(collection)?;
            found.extend(self.select(&records, topic).into_iter().cloned());
        }

        let count = found.len();
        let noun = action.target().noun(count);
        let message = match topic {
            Some(topic) => format!("Found {} {} about \"{}\"", count, noun, topic),
            None => format!("Found {} {}", count, noun),
        };
        Ok(TaskResult::ok(message, count).with_data(json!(found)))
    }

    fn list(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let mut result = self.search(action)?;
        let count = result.count.unwrap_or(0);
        result.message = format!("You have {} {}", count, action.target().noun(count));
        if let Some(topic) = action.topic() {
            result.message.push_str(&format!(" about \"{}\"", topic));
        }
        Ok(result)
    }

    fn navigate(&self, action: &TaskAction) -> TaskResult {
        let page = match action.target() {
            TargetKind::Page | TargetKind::Content | TargetKind::All => action
                .topic()
                .unwrap_or("home")
                .to_string(),
            target => target.as_str().to_string(),
        };
        info!("🧭 Navigating to {}", page);
        TaskResult::ok(format!("Opened {}", page), 1).with_data(json!({ "page": page }))
    }

    fn analyze(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let mut summary = serde_json::Map::new();
        let mut parts = Vec::new();
        let mut total = 0;

        for collection in action.target().collections() {
            let records = self.store.load(collection)?;
            let selected = self.select(&records, action.topic());

            let mut categories: HashMap<&str, usize> = HashMap::new();
            for record in &selected {
                *categories.entry(record.category()).or_default() += 1;
            }
            let mut top: Vec<(&str, usize)> = categories.into_iter().collect();
            top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            top.truncate(3);

            let target = collection.target();
            parts.push(format!("{} {}", selected.len(), target.noun(selected.len())));
            summary.insert(
                collection.as_str().to_string(),
                json!({
                    "count": selected.len(),
                    "top_categories": top.iter().map(|(c, n)| json!({"category": c, "count": n})).collect::<Vec<_>>(),
                }),
            );
            total += selected.len();
        }

        Ok(TaskResult::ok(format!("You have {}", join_and(&parts)), total)
            .with_data(serde_json::Value::Object(summary)))
    }

    fn reschedule(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let params = action.params();
        if params.date.is_none() && params.time.is_none() {
            return Ok(TaskResult::failure("When should it move to?"));
        }

        let mut records = self.store.load(Collection::Schedule)?;
        let ids: Vec<String> = self
            .select(&records, action.topic())
            .into_iter()
            .map(|r| r.id().to_string())
            .collect();

        for record in records.iter_mut() {
            if let Record::Schedule(item) = record {
                if ids.contains(&item.id) {
                    if let Some(date) = params.date {
                        item.date = date;
                    }
                    if let Some(time) = params.time {
                        item.time = time;
                    }
                }
            }
        }
        self.store.save(Collection::Schedule, &records)?;

        let count = ids.len();
        Ok(TaskResult::ok(
            format!("Rescheduled {} {}", count, TargetKind::Schedule.noun(count)),
            count,
        ))
    }

    fn convert(&self, action: &TaskAction) -> AssistResult<TaskResult> {
        let params = action.params();
        match (params.from, params.to) {
            (Some(TargetKind::Notes), Some(TargetKind::Flashcards)) => {
                self.notes_to_flashcards(action.topic())
            }
            (Some(TargetKind::Flashcards), Some(TargetKind::Notes)) => {
                self.flashcards_to_notes(action.topic())
            }
            (from, to) => Ok(TaskResult::failure(format!(
                "I can't convert {} into {}",
                from.map(|t| t.as_str()).unwrap_or("that"),
                to.map(|t| t.as_str()).unwrap_or("that")
            ))),
        }
    }

    fn notes_to_flashcards(&self, topic: Option<&str>) -> AssistResult<TaskResult> {
        let notes = self.store.load(Collection::Notes)?;
        let selected = self.select(&notes, topic);
        if selected.is_empty() {
            return Ok(TaskResult::failure(missing_message("notes", topic)));
        }

        let mut drafts = Vec::new();
        for record in selected {
            if let Record::Note(note) = record {
                for (question, answer) in
                    derive_pairs(&note.title, &note.content, self.convert_pairs_per_note)
                {
                    drafts.push(RecordDraft::Flashcard {
                        question,
                        answer,
                        category: note.category.clone(),
                    });
                }
            }
        }

        let created = self.store.add_batch(drafts)?;
        info!("🔁 Converted notes into {} flashcards", created.len());
        let count = created.len();
        Ok(TaskResult::ok(
            format!("Made {} {} from your notes", count, TargetKind::Flashcards.noun(count)),
            count,
        )
        .with_data(json!(created)))
    }

    fn flashcards_to_notes(&self, topic: Option<&str>) -> AssistResult<TaskResult> {
        let cards = self.store.load(Collection::Flashcards)?;
        let selected = self.select(&cards, topic);
        if selected.is_empty() {
            return Ok(TaskResult::failure(missing_message("flashcards", topic)));
        }

        // One study note per category
        let mut by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in selected {
            if let Record::Flashcard(card) = record {
                by_category
                    .entry(card.category.clone())
                    .or_default()
                    .push(format!("Q: {}\nA: {}", card.question, card.answer));
            }
        }

        let drafts = by_category
            .into_iter()
            .map(|(category, pairs)| RecordDraft::Note {
                title: format!("{} flashcards", capitalize(&category)),
                content: pairs.join("\n\n"),
                tags: vec![category.clone()],
                category,
            })
            .collect();

        let created = self.store.add_batch(drafts)?;
        let count = created.len();
        Ok(TaskResult::ok(
            format!("Made {} {} from your flashcards", count, TargetKind::Notes.noun(count)),
            count,
        )
        .with_data(json!(created)))
    }
}

/// Keep only the `n` most recent ids (ids arrive in insertion order)
fn limit_latest(ids: Vec<String>, count: Option<u32>, wipe: bool) -> Vec<String> {
    match count.filter(|_| !wipe) {
        Some(n) if (n as usize) < ids.len() => {
            let skip = ids.len() - n as usize;
            ids.into_iter().skip(skip).collect()
        }
        _ => ids,
    }
}

fn created_result(target: TargetKind, topics: &[&str], created: &[Record]) -> TaskResult {
    let count = created.len();
    let about = topics
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>();
    TaskResult::ok(
        format!("Created {} {} about {}", count, target.noun(count), join_and(&about)),
        count,
    )
    .with_data(json!(created))
}

fn missing_message(noun: &str, topic: Option<&str>) -> String {
    match topic {
        Some(topic) => format!("No {} about \"{}\" to convert", noun, topic),
        None => format!("No {} to convert", noun),
    }
}

/// Question/answer pairs from note lines: "term: definition", "x is y",
/// else a recall card for the note itself
fn derive_pairs(title: &str, content: &str, max: usize) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if pairs.len() >= max {
            break;
        }
        let line = line.trim_start_matches(['-', '*', '•']).trim();

        if let Some((term, definition)) = line.split_once(':').or_else(|| line.split_once(" - ")) {
            let (term, definition) = (term.trim(), definition.trim());
            if !term.is_empty() && !definition.is_empty() {
                pairs.push((format!("What is {}?", term), definition.to_string()));
                continue;
            }
        }

        if let Some((subject, rest)) = line.split_once(" is ") {
            let rest = rest.trim().trim_end_matches('.');
            if !subject.trim().is_empty() && !rest.is_empty() {
                pairs.push((format!("What is {}?", subject.trim()), rest.to_string()));
            }
        }
    }

    if pairs.is_empty() {
        let first = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or(title);
        pairs.push((
            format!("What are the key points of \"{}\"?", title),
            first.to_string(),
        ));
    }

    pairs
}

/// "a", "a and b", "a, b and c"
fn join_and(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Depth-first topological order over a plan.
///
/// Unknown dependency ids are ignored; a cycle is logged and the closing
/// edge dropped.
pub fn execution_order(plan: &[PlannedTask]) -> Vec<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }

    fn visit(
        index: usize,
        plan: &[PlannedTask],
        ids: &HashMap<&str, usize>,
        marks: &mut [Mark],
        order: &mut Vec<usize>,
    ) {
        match marks[index] {
            Mark::Done => return,
            Mark::Visiting => {
                warn!("🔄 Dependency cycle through task '{}', breaking it", plan[index].id);
                return;
            }
            Mark::Unvisited => {}
        }

        marks[index] = Mark::Visiting;
        for dep in &plan[index].depends_on {
            match ids.get(dep.as_str()) {
                Some(&dep_index) => visit(dep_index, plan, ids, marks, order),
                None => debug!("Task '{}' depends on unknown '{}'", plan[index].id, dep),
            }
        }
        marks[index] = Mark::Done;
        order.push(index);
    }

    let ids: HashMap<&str, usize> = plan
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();
    let mut marks = vec![Mark::Unvisited; plan.len()];
    let mut order = Vec::with_capacity(plan.len());

    for index in 0..plan.len() {
        visit(index, plan, &ids, &mut marks, &mut order);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Params;
    use crate::storage::MemoryStore;

    fn executor() -> (Executor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let executor = Executor::new(
            store.clone(),
            ContentGenerator::offline(),
            AuditLog::disabled(),
            &Config::default(),
        );
        (executor, store)
    }

    fn action(kind: ActionKind, target: TargetKind, topic: Option<&str>, count: Option<u32>) -> TaskAction {
        TaskAction::simple(
            kind,
            target,
            Params {
                topic: topic.map(String::from),
                count,
                ..Params::default()
            },
        )
        .unwrap()
    }

    fn planned(id: &str, deps: &[&str]) -> PlannedTask {
        PlannedTask {
            id: id.to_string(),
            action: action(ActionKind::List, TargetKind::Notes, None, None),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let (executor, store) = executor();
        let result = executor
            .execute_action(&action(ActionKind::Create, TargetKind::Flashcards, Some("javascript"), Some(50)))
            .await;
        assert!(result.success);
        assert_eq!(result.count, Some(50));

        let cards = store.load(Collection::Flashcards).unwrap();
        assert_eq!(cards.len(), 50);
        assert!(cards.iter().all(|c| c.searchable_text().contains("javascript")));
    }

    #[tokio::test]
    async fn test_delete_by_topic_with_fuzzy_fallback() {
        let (executor, store) = executor();
        executor
            .execute_action(&action(ActionKind::Create, TargetKind::Notes, Some("physics"), Some(2)))
            .await;
        executor
            .execute_action(&action(ActionKind::Create, TargetKind::Notes, Some("biology"), Some(1)))
            .await;

        let result = executor
            .execute_action(&action(ActionKind::Delete, TargetKind::Notes, Some("phisics"), None))
            .await;
        assert_eq!(result.count, Some(2));
        assert_eq!(store.len(Collection::Notes), 1);
    }

    #[tokio::test]
    async fn test_delete_all_is_idempotent() {
        let (executor, _store) = executor();
        let wipe = action(ActionKind::Delete, TargetKind::All, None, None);
        for _ in 0..2 {
            let result = executor.execute_action(&wipe).await;
            assert!(result.success);
            assert_eq!(result.count, Some(0));
        }
    }

    #[tokio::test]
    async fn test_unknown_pairing_fails_softly() {
        let (executor, _store) = executor();
        let results = executor
            .execute(&[
                action(ActionKind::Update, TargetKind::Notes, Some("x"), None),
                action(ActionKind::Create, TargetKind::Notes, Some("x"), None),
            ])
            .await;
        assert!(!results[0].success);
        assert!(results[1].success);
    }

    #[tokio::test]
    async fn test_convert_notes_to_flashcards() {
        let (executor, store) = executor();
        store
            .add_batch(vec![RecordDraft::Note {
                title: "React".into(),
                content: "JSX: a syntax extension\nA hook is a function that uses state.\nProps: inputs".into(),
                category: "react".into(),
                tags: vec!["react".into()],
            }])
            .unwrap();

        let mut params = Params {
            topic: Some("react".into()),
            ..Params::default()
        };
        params.from = Some(TargetKind::Notes);
        params.to = Some(TargetKind::Flashcards);
        let convert = TaskAction::simple(ActionKind::Convert, TargetKind::Flashcards, params).unwrap();

        let result = executor.execute_action(&convert).await;
        assert_eq!(result.count, Some(3));
        let cards = store.load(Collection::Flashcards).unwrap();
        assert!(cards.iter().all(|c| c.category() == "react"));
    }

    #[test]
    fn test_derive_pairs() {
        let pairs = derive_pairs("Rust", "Ownership: one owner per value\nBorrowing is lending a reference.", 3);
        assert_eq!(pairs[0], ("What is Ownership?".to_string(), "one owner per value".to_string()));
        assert_eq!(pairs[1], ("What is Borrowing?".to_string(), "lending a reference".to_string()));

        let fallback = derive_pairs("Loose", "just some words", 3);
        assert_eq!(fallback.len(), 1);
    }

    #[test]
    fn test_execution_order_respects_dependencies() {
        let plan = vec![planned("c", &["b"]), planned("b", &["a"]), planned("a", &[])];
        assert_eq!(execution_order(&plan), vec![2, 1, 0]);
    }

    #[test]
    fn test_execution_order_breaks_cycles_and_ignores_unknown() {
        let plan = vec![planned("a", &["b"]), planned("b", &["a", "zzz"])];
        let order = execution_order(&plan);
        assert_eq!(order.len(), 2);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_join_and() {
        assert_eq!(join_and(&["a".into()]), "a");
        assert_eq!(join_and(&["a".into(), "b".into(), "c".into()]), "a, b and c");
    }
}
