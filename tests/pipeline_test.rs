//! End-to-end tests of the command pipeline on an in-memory store

mod common;

use common::{test_config, MockReasoner, TestContext};
use std::sync::Arc;
use studymate::model::{ActionKind, Collection, RecordDraft, TargetKind};
use studymate::storage::RecordStore;
use studymate::{CommandPipeline, Config};

fn flashcard(topic: &str) -> RecordDraft {
    RecordDraft::Flashcard {
        question: format!("What is {}?", topic),
        answer: "Something worth knowing".to_string(),
        category: topic.to_string(),
    }
}

#[tokio::test]
async fn test_delete_all_twice_is_idempotent() {
    let mut ctx = TestContext::new();

    for _ in 0..2 {
        let response = ctx.pipeline.handle("delete everything").await;
        assert!(response.success, "{}", response.message);
        assert!(!response.requires_confirmation);
    }
    for collection in Collection::ALL {
        assert_eq!(ctx.store.len(collection), 0);
    }
}

#[tokio::test]
async fn test_create_round_trip() {
    let mut ctx = TestContext::new();
    ctx.store
        .add_batch(vec![flashcard("history")])
        .unwrap();

    let response = ctx.pipeline.handle("make 12 flashcards about rust").await;
    assert!(response.success);
    assert_eq!(response.message, "Created 12 flashcards about \"rust\".");

    let cards = ctx.store.load(Collection::Flashcards).unwrap();
    assert_eq!(cards.len(), 13);
    assert_eq!(
        cards
            .iter()
            .filter(|c| c.searchable_text().contains("rust"))
            .count(),
        12
    );
}

#[tokio::test]
async fn test_compound_delete_then_create() {
    for utterance in [
        "delete all flashcards and create 5 flashcards about biology",
        "delete all flashcards, create 5 flashcards about biology",
    ] {
        let mut ctx = TestContext::new();
        ctx.store
            .add_batch(vec![flashcard("chemistry"), flashcard("algebra"), flashcard("art")])
            .unwrap();

        let response = ctx.pipeline.handle(utterance).await;
        assert!(response.success, "{}: {}", utterance, response.message);

        let cards = ctx.store.load(Collection::Flashcards).unwrap();
        assert_eq!(cards.len(), 5, "{}", utterance);
        assert!(cards.iter().all(|c| c.searchable_text().contains("biology")));
    }
}

#[tokio::test]
async fn test_topic_inheritance() {
    let ctx = TestContext::new();
    let request = ctx
        .pipeline
        .classify("create a note about javascript and make 5 flashcards about it")
        .await
        .unwrap();

    let card_action = request
        .actions
        .iter()
        .find(|a| a.kind() == ActionKind::Create && a.target() == TargetKind::Flashcards)
        .expect("flashcard create action");
    assert_eq!(card_action.topic(), Some("javascript"));
    assert_eq!(card_action.params().count, Some(5));
}

#[tokio::test]
async fn test_fuzzy_tolerance() {
    let ctx = TestContext::new();
    for (utterance, target) in [
        ("delte all flascards", TargetKind::Flashcards),
        ("remove evrything", TargetKind::All),
        ("clear flashcadrs", TargetKind::Flashcards),
    ] {
        let request = ctx.pipeline.classify(utterance).await.unwrap();
        assert_eq!(request.actions.len(), 1, "{}", utterance);
        assert_eq!(request.actions[0].kind(), ActionKind::Delete, "{}", utterance);
        assert_eq!(request.actions[0].target(), target, "{}", utterance);
        assert_eq!(request.actions[0].topic(), None, "{}", utterance);
    }
}

#[tokio::test]
async fn test_typo_delete_verbs_clear_the_collection() {
    for utterance in ["dleete all notes", "wipee my notes", "celar my notes", "dorp my notes"] {
        let mut ctx = TestContext::new();
        ctx.pipeline.handle("create 3 notes about physics").await;
        assert_eq!(ctx.store.len(Collection::Notes), 3);

        let response = ctx.pipeline.handle(utterance).await;
        assert!(response.success, "{}: {}", utterance, response.message);
        assert_eq!(response.message, "Deleted all 3 notes.", "{}", utterance);
        assert_eq!(ctx.store.len(Collection::Notes), 0, "{}", utterance);
    }
}

#[tokio::test]
async fn test_typo_everything_wipes_all_collections() {
    let mut ctx = TestContext::new();
    ctx.pipeline.handle("create 3 notes about physics").await;
    ctx.pipeline.handle("make 2 flashcards about physics").await;

    let request = ctx.pipeline.classify("delete evrythng").await.unwrap();
    assert_eq!(request.actions[0].target(), TargetKind::All);
    assert_eq!(request.actions[0].topic(), None);
    assert!(request.actions[0].params().wipe);

    let response = ctx.pipeline.handle("delete evrythng").await;
    assert!(response.success, "{}", response.message);
    for collection in Collection::ALL {
        assert_eq!(ctx.store.len(collection), 0);
    }
}

#[tokio::test]
async fn test_numbers_in_topic_are_not_counts() {
    let mut ctx = TestContext::new();
    let response = ctx
        .pipeline
        .handle("make flashcards about chapter 3 and 4")
        .await;
    assert_eq!(response.message, "Created 5 flashcards about \"chapter 3 and 4\".");
    assert_eq!(ctx.store.len(Collection::Flashcards), 5);

    let request = ctx
        .pipeline
        .classify("make notes about world war 1 and 2")
        .await
        .unwrap();
    assert_eq!(request.actions.len(), 1);
    assert_eq!(request.actions[0].topic(), Some("world war 1 and 2"));
    assert_eq!(request.actions[0].params().count, Some(1));
}

#[tokio::test]
async fn test_typo_scenario_end_to_end() {
    let mut ctx = TestContext::new();
    let response = ctx.pipeline.handle("mke 50 flashcard abot javascript").await;

    assert_eq!(response.message, "Created 50 flashcards about \"javascript\".");
    let cards = ctx.store.load(Collection::Flashcards).unwrap();
    assert_eq!(cards.len(), 50);
    assert!(cards.iter().all(|c| c.category() == "javascript"));
}

#[tokio::test]
async fn test_two_deletes_summary() {
    let mut ctx = TestContext::new();
    ctx.pipeline.handle("make 3 flashcards about react").await;
    ctx.pipeline.handle("make 2 flashcards about vue").await;
    ctx.pipeline.handle("create 2 notes about physics").await;
    assert_eq!(ctx.store.len(Collection::Notes), 2);

    let response = ctx
        .pipeline
        .handle("delete react flashcards, also delete physics notes")
        .await;

    assert_eq!(
        response.message,
        "Deleted flashcards about \"react\", deleted notes about \"physics\"."
    );
    assert_eq!(ctx.store.len(Collection::Flashcards), 2);
    assert_eq!(ctx.store.len(Collection::Notes), 0);
}

#[tokio::test]
async fn test_schedule_and_search() {
    let mut ctx = TestContext::new();
    let response = ctx
        .pipeline
        .handle("schedule a chemistry exam tomorrow at 3pm")
        .await;
    assert!(response.success, "{}", response.message);
    assert_eq!(ctx.store.len(Collection::Schedule), 1);

    let response = ctx.pipeline.handle("find my chemistry exam").await;
    assert!(response.message.starts_with("Found 1"), "{}", response.message);
}

#[tokio::test]
async fn test_unrecognized_input_asks_for_clarification() {
    let mut ctx = TestContext::new();
    let response = ctx.pipeline.handle("hmm well whatever").await;
    assert!(!response.success);
    assert!(response.message.contains("Try something like"));

    let response = ctx.pipeline.handle("").await;
    assert!(!response.success);
}

#[tokio::test]
async fn test_low_confidence_delete_waits_for_confirmation() {
    let config = Config {
        confirm_threshold: 0.99,
        ..test_config()
    };
    let mut ctx = TestContext::build(config, None);
    ctx.store.add_batch(vec![flashcard("react")]).unwrap();

    let response = ctx.pipeline.handle("delete all flashcards").await;
    assert!(response.requires_confirmation);
    assert!(ctx.pipeline.has_pending());
    assert_eq!(ctx.store.len(Collection::Flashcards), 1);

    let response = ctx.pipeline.handle("no").await;
    assert!(response.success);
    assert!(!ctx.pipeline.has_pending());
    assert_eq!(ctx.store.len(Collection::Flashcards), 1);

    ctx.pipeline.handle("delete all flashcards").await;
    let response = ctx.pipeline.handle("yes").await;
    assert!(response.success, "{}", response.message);
    assert_eq!(ctx.store.len(Collection::Flashcards), 0);
}

#[tokio::test]
async fn test_new_request_drops_pending_delete() {
    let config = Config {
        confirm_threshold: 0.99,
        ..test_config()
    };
    let mut ctx = TestContext::build(config, None);
    ctx.store.add_batch(vec![flashcard("react")]).unwrap();

    ctx.pipeline.handle("delete all flashcards").await;
    let response = ctx.pipeline.handle("make 2 notes about rust").await;
    assert!(response.success);
    assert!(!ctx.pipeline.has_pending());
    assert_eq!(ctx.store.len(Collection::Flashcards), 1);
    assert_eq!(ctx.store.len(Collection::Notes), 2);
}

#[tokio::test]
async fn test_ai_first_for_complex_requests() {
    let reasoner = MockReasoner::new();
    reasoner.push_reply(
        r#"Here you go: {"message": "cards and notes", "confidence": 0.9, "actions": [
            {"type": "create", "target": "flashcards", "data": {"topic": "react", "count": 5}},
            {"type": "create", "target": "notes", "data": {"topic": "vue", "count": 3}}
        ]}"#,
    );
    let mut ctx = TestContext::with_reasoner(reasoner.clone());

    let response = ctx
        .pipeline
        .handle("make 5 flashcards about react and 3 notes on vue, then show me everything")
        .await;

    assert!(response.success, "{}", response.message);
    assert_eq!(ctx.store.len(Collection::Flashcards), 5);
    assert_eq!(ctx.store.len(Collection::Notes), 3);
    assert!(reasoner.prompts()[0].contains("react"));
}

#[tokio::test]
async fn test_malformed_ai_reply_falls_back_to_rules() {
    let reasoner = MockReasoner::new();
    reasoner.push_reply("I'm sorry, I can't help with that.");
    let mut ctx = TestContext::with_reasoner(reasoner.clone());

    let response = ctx
        .pipeline
        .handle("make 2 flashcards about rust and 3 notes about python, then list my flashcards")
        .await;

    assert!(response.success, "{}", response.message);
    assert!(reasoner.calls() >= 1);
    assert_eq!(ctx.store.len(Collection::Flashcards), 2);
    assert_eq!(ctx.store.len(Collection::Notes), 3);
}

#[tokio::test]
async fn test_offline_ai_never_breaks_simple_requests() {
    let mut ctx = TestContext::with_reasoner(MockReasoner::offline());
    let response = ctx.pipeline.handle("make 4 flashcards about sql").await;

    assert_eq!(response.message, "Created 4 flashcards about \"sql\".");
    assert_eq!(ctx.store.len(Collection::Flashcards), 4);
}

#[tokio::test]
async fn test_ai_plan_runs_in_dependency_order() {
    let reasoner = MockReasoner::new();
    reasoner.push_reply(
        r#"{"confidence": 0.9, "actions": [
            {"id": "t1", "type": "create", "target": "flashcards",
             "data": {"topic": "graphs", "count": 2}, "depends_on": ["t2"]},
            {"id": "t2", "type": "delete", "target": "flashcards", "data": {}}
        ]}"#,
    );
    let config = Config {
        ollama_enabled: true,
        confirm_threshold: 0.0,
        ..test_config()
    };
    let mut ctx = TestContext::build(config, Some(Arc::new(reasoner)));
    ctx.store
        .add_batch(vec![flashcard("old"), flashcard("older")])
        .unwrap();

    let response = ctx
        .pipeline
        .handle("wipe my flashcards and then make 2 flashcards about graphs, and keep them")
        .await;

    assert!(response.success, "{}", response.message);
    let cards = ctx.store.load(Collection::Flashcards).unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.category() == "graphs"));
}

#[tokio::test]
async fn test_pipeline_from_config() {
    let mut pipeline = CommandPipeline::from_config(&test_config()).await.unwrap();
    let response = pipeline.handle("make 2 notes about rust").await;
    assert_eq!(response.message, "Created 2 notes about \"rust\".");
}
