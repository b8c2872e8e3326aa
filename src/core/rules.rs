//! Rule-based request classification
//!
//! Splits an utterance, classifies each segment, fills in what a segment
//! leaves implicit from its neighbours, and extracts parameters.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::classifier::{Classification, Classifier, IntentClassifier, Lexicon};
use super::dates::DateParser;
use super::extractor::ParameterExtractor;
use super::splitter::{CompoundSplitter, TopicTracker};
use super::text_normalizer::parse_number;
use crate::config::Config;
use crate::error::AssistResult;
use crate::model::{ActionKind, TargetKind, TaskAction, TaskRequest};
use crate::utils::fuzzy;

/// Deterministic classifier over the splitter, intent rules and extractor
pub struct RuleClassifier {
    splitter: CompoundSplitter,
    intents: IntentClassifier,
    extractor: ParameterExtractor,
}

impl RuleClassifier {
    pub fn new(config: &Config, dates: Arc<dyn DateParser>) -> Self {
        let lexicon = Lexicon::new(config.fuzzy.clone());
        Self {
            splitter: CompoundSplitter::new(lexicon.clone()),
            intents: IntentClassifier::new(lexicon.clone()),
            extractor: ParameterExtractor::new(
                lexicon,
                dates,
                config.default_flashcard_count,
                config.max_create_count,
            ),
        }
    }

    /// Classify a normalized utterance; `None` when nothing is actionable
    pub fn classify(&self, text: &str) -> Option<TaskRequest> {
        let segments = self.splitter.split(text);
        let classified: Vec<Option<Classification>> = segments
            .iter()
            .map(|s| self.intents.classify(s))
            .collect();

        let mut tracker = TopicTracker::new();
        let mut previous: Option<(ActionKind, TargetKind)> = None;
        let mut actions = Vec::new();
        let mut confidence = 0.0;

        for (index, segment) in segments.iter().enumerate() {
            let Some((kind, target, segment_confidence)) =
                self.resolve(segment, classified[index].as_ref(), previous, &classified[index + 1..])
            else {
                debug!("⏭️ Dropping segment '{}'", segment);
                continue;
            };

            let mut params = self.extractor.extract(segment, kind, target);
            let may_inherit = !params.wipe && params.subjects.is_empty() && kind != ActionKind::Navigate;
            params.topic = tracker.resolve(segment, params.topic.take(), may_inherit);

            match TaskAction::simple(kind, target, params) {
                Ok(action) => {
                    previous = Some((kind, target));
                    confidence += segment_confidence;
                    actions.push(action);
                }
                Err(e) => debug!("⏭️ Unusable action from '{}': {}", segment, e),
            }
        }

        if actions.is_empty() {
            return None;
        }

        let confidence = confidence / actions.len() as f32;
        info!(
            "🧭 Rules classified {} action(s) from {} segment(s) ({:.2})",
            actions.len(),
            segments.len(),
            confidence
        );
        let message = format!("{} action(s) from rules", actions.len());
        Some(TaskRequest::new(actions, message, confidence))
    }

    /// Kind, target and confidence for one segment, borrowing from neighbours
    /// where the segment is silent
    fn resolve(
        &self,
        segment: &str,
        classification: Option<&Classification>,
        previous: Option<(ActionKind, TargetKind)>,
        following: &[Option<Classification>],
    ) -> Option<(ActionKind, TargetKind, f32)> {
        let Some(classification) = classification else {
            // "... and 3 more" repeats the previous action
            let (kind, target) = previous?;
            let has_count = fuzzy::tokens(segment)
                .iter()
                .any(|t| parse_number(t).is_some());
            return has_count.then_some((kind, target, 0.6));
        };

        let mut kind = classification.kind;
        let mut confidence = classification.confidence;

        // A bare target after a delete or create continues it: "delete notes and flashcards"
        if classification.inferred {
            if let Some((prev_kind, _)) = previous {
                if matches!(prev_kind, ActionKind::Delete | ActionKind::Create) {
                    debug!("🔗 '{}' continues the previous {}", segment, prev_kind.as_str());
                    kind = prev_kind;
                    confidence = 0.7;
                }
            }
        }

        let target = classification
            .target
            .or_else(|| previous.map(|(_, t)| t))
            .or_else(|| following.iter().flatten().find_map(|c| c.target))?;

        Some((kind, target, confidence))
    }
}

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify_request(&self, text: &str) -> AssistResult<Option<TaskRequest>> {
        Ok(self.classify(text))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dates::ChronoDateParser;

    fn rules() -> RuleClassifier {
        RuleClassifier::new(&Config::default(), Arc::new(ChronoDateParser::new()))
    }

    fn summary(text: &str) -> Vec<(ActionKind, TargetKind, Option<String>)> {
        rules()
            .classify(text)
            .map(|r| {
                r.actions
                    .iter()
                    .map(|a| (a.kind(), a.target(), a.topic().map(String::from)))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_single_create() {
        let request = rules().classify("make 10 flashcards about react").unwrap();
        assert_eq!(request.actions.len(), 1);
        let action = &request.actions[0];
        assert_eq!(action.kind(), ActionKind::Create);
        assert_eq!(action.target(), TargetKind::Flashcards);
        assert_eq!(action.params().count, Some(10));
        assert_eq!(action.topic(), Some("react"));
    }

    #[test]
    fn test_compound_keeps_order() {
        let actions = summary("delete all flashcards and create 5 flashcards about biology");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].0, ActionKind::Delete);
        assert_eq!(actions[0].2, None);
        assert_eq!(actions[1].0, ActionKind::Create);
        assert_eq!(actions[1].2.as_deref(), Some("biology"));
    }

    #[test]
    fn test_topic_inherited_through_backreference() {
        let actions = summary("create notes about photosynthesis and make flashcards on it");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].1, TargetKind::Flashcards);
        assert_eq!(actions[1].2.as_deref(), Some("photosynthesis"));
    }

    #[test]
    fn test_bare_target_continues_delete() {
        let actions = summary("delete all notes and flashcards");
        let kinds: Vec<_> = actions.iter().map(|a| (a.0, a.1)).collect();
        assert!(kinds.contains(&(ActionKind::Delete, TargetKind::Notes)));
        assert!(kinds.contains(&(ActionKind::Delete, TargetKind::Flashcards)));
    }

    #[test]
    fn test_nothing_actionable() {
        assert!(rules().classify("hmm well whatever").is_none());
        assert!(rules().classify("").is_none());
    }

    #[tokio::test]
    async fn test_strategy_trait() {
        let classifier = rules();
        assert_eq!(classifier.name(), "rules");
        let request = classifier
            .classify_request("list my notes")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.actions[0].kind(), ActionKind::List);
    }
}
