//! Command pipeline
//!
//! Owns every stage of request handling and routes an utterance through
//! them: normalize, classify (rules and/or AI), confirm risky deletes,
//! execute, summarize.
//!
//! **Routing Strategy:**
//! 1. Complex utterances with AI enabled → AI classifier first, rules as fallback
//! 2. Everything else → rules first, AI only when the rules find nothing
//! 3. Nothing classifies → guess a search from "about X", else ask for clarification

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::config::Config;
use crate::core::ai::{complexity, AiClassifier, ContentGenerator};
use crate::core::classifier::Classifier;
use crate::core::dates::{ChronoDateParser, DateParser};
use crate::core::ollama::{OllamaReasoner, Reasoner};
use crate::core::rules::RuleClassifier;
use crate::core::text_normalizer::TextNormalizer;
use crate::error::AssistResult;
use crate::executor::Executor;
use crate::model::{ActionKind, Params, Response, TargetKind, TaskAction, TaskRequest};
use crate::storage::{open_store, RecordStore};
use crate::summary::summarize;
use crate::utils::fuzzy;

const YES_WORDS: &[&str] = &["yes", "yeah", "yep", "yup", "confirm", "sure", "ok", "okay", "proceed"];
const NO_WORDS: &[&str] = &["no", "nope", "cancel", "stop", "abort", "nevermind", "don't", "dont"];

/// Confidence of a search guessed from a bare "about X"
const GUESS_CONFIDENCE: f32 = 0.3;

const CLARIFICATION: &str = "Sorry, I didn't understand that. Try something like \
\"make 5 flashcards about react\", \"delete my physics notes\" or \
\"schedule a chemistry exam tomorrow at 3pm\".";

lazy_static! {
    static ref ABOUT_PHRASE: Regex =
        Regex::new(r"\b(?:about|on|for|regarding|related to)\s+(.+)$").expect("valid about regex");
}

/// End-to-end request handler
pub struct CommandPipeline {
    normalizer: TextNormalizer,
    rules: RuleClassifier,
    ai: Option<AiClassifier>,
    executor: Executor,
    confirm_threshold: f32,
    ai_complexity_threshold: f32,
    /// Delete request waiting for a yes/no
    pending: Option<TaskRequest>,
}

impl CommandPipeline {
    /// Build a pipeline around explicit collaborators
    pub fn new(
        config: &Config,
        store: Arc<dyn RecordStore>,
        reasoner: Option<Arc<dyn Reasoner>>,
        dates: Arc<dyn DateParser>,
    ) -> Self {
        let ai = reasoner
            .clone()
            .map(|r| AiClassifier::new(r, config.max_create_count));

        Self {
            normalizer: TextNormalizer::new(config.corrections.clone()),
            rules: RuleClassifier::new(config, dates),
            ai,
            executor: Executor::new(
                store,
                ContentGenerator::new(reasoner),
                AuditLog::from_config(config),
                config,
            ),
            confirm_threshold: config.confirm_threshold,
            ai_complexity_threshold: config.ai_complexity_threshold,
            pending: None,
        }
    }

    /// Build the default collaborators from configuration
    pub async fn from_config(config: &Config) -> AssistResult<Self> {
        let store = open_store(config)?;
        let ollama = OllamaReasoner::new(config);
        let reasoner: Option<Arc<dyn Reasoner>> = if ollama.is_enabled() {
            if ollama.health_check().await {
                info!("🧠 Ollama ready ({} at {})", config.ollama_model, config.ollama_url);
            } else {
                // AI calls fall back to the rules while it is down
                warn!("⚠️ Ollama not reachable at {}, using rules until it is", config.ollama_url);
            }
            Some(Arc::new(ollama))
        } else {
            None
        };
        Ok(Self::new(
            config,
            store,
            reasoner,
            Arc::new(ChronoDateParser::new()),
        ))
    }

    /// Is a delete waiting for confirmation?
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle one utterance; always answers with a sentence
    pub async fn handle(&mut self, utterance: &str) -> Response {
        let normalized = self.normalizer.normalize(utterance);
        let text = normalized.text.trim().to_string();
        debug!("Processing request: '{}'", text);

        if let Some(pending) = self.pending.take() {
            match confirmation_reply(&text) {
                Some(true) => {
                    info!("✅ Confirmed pending delete");
                    return self.run(&pending).await;
                }
                Some(false) => {
                    info!("🚫 Pending delete cancelled");
                    return Response::new("Okay, nothing was deleted.", true);
                }
                None => debug!("Pending delete dropped by a new request"),
            }
        }

        if text.is_empty() {
            return Response::new(CLARIFICATION, false);
        }

        let Some(mut request) = self.classify(&text).await else {
            warn!("❓ Could not classify '{}'", text);
            return Response::new(CLARIFICATION, false);
        };

        request.confidence = (request.confidence * normalized.confidence).clamp(0.0, 1.0);

        if request.has_delete() && request.confidence < self.confirm_threshold {
            info!(
                "⚠️ Delete at confidence {:.2} needs confirmation",
                request.confidence
            );
            let prompt = format!("Just to be sure: {}? Say yes or no.", describe_deletes(&request));
            self.pending = Some(request);
            return Response::confirmation(prompt);
        }

        self.run(&request).await
    }

    /// Classify without executing: strategies in routing order, then the guess
    pub async fn classify(&self, text: &str) -> Option<TaskRequest> {
        for strategy in self.strategies(text) {
            match strategy.classify_request(text).await {
                Ok(Some(request)) => {
                    debug!("🧭 '{}' classified by {}", text, strategy.name());
                    return Some(request);
                }
                Ok(None) => debug!("{} found nothing in '{}'", strategy.name(), text),
                Err(e) => warn!("⚠️ {} classifier failed: {}", strategy.name(), e),
            }
        }
        guess_search(text)
    }

    fn strategies(&self, text: &str) -> Vec<&dyn Classifier> {
        let mut order: Vec<&dyn Classifier> = Vec::with_capacity(2);
        order.push(&self.rules);
        if let Some(ai) = &self.ai {
            if complexity(text) >= self.ai_complexity_threshold {
                order.insert(0, ai);
            } else {
                order.push(ai);
            }
        }
        order
    }

    async fn run(&self, request: &TaskRequest) -> Response {
        let results = self.executor.execute_request(request).await;
        let actions: Vec<TaskAction> = match &request.plan {
            Some(plan) => plan.iter().map(|t| t.action.clone()).collect(),
            None => request.actions.clone(),
        };
        let message = summarize(&actions, &results);
        let success = !results.is_empty() && results.iter().all(|r| r.success);
        info!("💬 {}", message);
        Response::new(message, success)
    }
}

/// `Some(true)` for yes, `Some(false)` for no, `None` for anything else
fn confirmation_reply(text: &str) -> Option<bool> {
    let tokens = fuzzy::tokens(text);
    if tokens.is_empty() || tokens.len() > 4 {
        return None;
    }
    if text.contains("do it") || text.contains("go ahead") {
        return Some(true);
    }
    if tokens.iter().any(|t| NO_WORDS.contains(&t.as_str())) {
        return Some(false);
    }
    if tokens.iter().any(|t| YES_WORDS.contains(&t.as_str())) {
        return Some(true);
    }
    None
}

/// Last resort: "anything about photosynthesis" becomes a broad search
fn guess_search(text: &str) -> Option<TaskRequest> {
    let caps = ABOUT_PHRASE.captures(text)?;
    let topic: Vec<String> = fuzzy::tokens(&caps[1])
        .into_iter()
        .skip_while(|t| matches!(t.as_str(), "the" | "my" | "a" | "an" | "some"))
        .collect();
    if topic.is_empty() {
        return None;
    }

    let params = Params {
        topic: Some(topic.join(" ")),
        ..Params::default()
    };
    let action = TaskAction::simple(ActionKind::Search, TargetKind::All, params).ok()?;
    info!("🔮 Guessing a search for '{}'", topic.join(" "));
    Some(TaskRequest::new(vec![action], "guessed search", GUESS_CONFIDENCE))
}

fn describe_deletes(request: &TaskRequest) -> String {
    let parts: Vec<String> = request
        .actions
        .iter()
        .filter(|a| a.kind() == ActionKind::Delete)
        .map(|a| {
            let what = match a.target() {
                TargetKind::All => "everything".to_string(),
                target => target.noun(2).to_string(),
            };
            match a.topic() {
                Some(topic) => format!("delete {} about \"{}\"", what, topic),
                None => format!("delete all {}", what),
            }
        })
        .collect();
    parts.join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_reply() {
        assert_eq!(confirmation_reply("yes"), Some(true));
        assert_eq!(confirmation_reply("yes please do it"), Some(true));
        assert_eq!(confirmation_reply("no"), Some(false));
        assert_eq!(confirmation_reply("cancel that"), Some(false));
        assert_eq!(confirmation_reply("make 5 flashcards about react"), None);
        assert_eq!(confirmation_reply(""), None);
    }

    #[test]
    fn test_guess_search() {
        let request = guess_search("anything about the krebs cycle").unwrap();
        let action = &request.actions[0];
        assert_eq!(action.kind(), ActionKind::Search);
        assert_eq!(action.target(), TargetKind::All);
        assert_eq!(action.topic(), Some("krebs cycle"));
        assert!(request.confidence < 0.5);

        assert!(guess_search("hmm what").is_none());
    }

    #[test]
    fn test_describe_deletes() {
        let action = TaskAction::simple(
            ActionKind::Delete,
            TargetKind::Flashcards,
            Params {
                topic: Some("react".into()),
                ..Params::default()
            },
        )
        .unwrap();
        let request = TaskRequest::new(vec![action], "", 0.5);
        assert_eq!(describe_deletes(&request), "delete flashcards about \"react\"");
    }
}
