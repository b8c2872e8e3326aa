mod common;

use common::{MockReasoner, TestContext};
use studymate::model::Collection;
use tokio::time::Instant;

#[tokio::test]
async fn test_garbage_flood_fuzz() {
    let mut ctx = TestContext::new();

    // Simulate a flood of random garbage text
    let garbage = [
        "asdfghjkl",
        "!!! @@@ ###",
        "1234567890",
        "extremely long string that doesn't mean anything to the system at all but might cause buffer issues if we were in C but we are in Rust so it's just a long string",
        "",
        " ",
        ",,,, and and then ,",
        "ünïcödé ñøñsénsé 日本語",
    ];

    for text in garbage {
        let response = ctx.pipeline.handle(text).await;
        assert!(!response.message.is_empty(), "empty reply for {:?}", text);
        assert!(!response.requires_confirmation, "{:?}", text);
    }
    for collection in Collection::ALL {
        assert_eq!(ctx.store.len(collection), 0);
    }

    // High-frequency safe commands: the pipeline must stay stable
    let commands = [
        "make 2 flashcards about rust",
        "list my flashcards",
        "how many notes do i have",
        "find flashcards about rust",
    ];

    let start = Instant::now();
    for i in 0..100 {
        let cmd = commands[i % commands.len()];
        let _ = ctx.pipeline.handle(cmd).await;
    }
    let elapsed = start.elapsed();
    println!("Processed 100 requests in {:?}", elapsed);

    // 25 create rounds of 2 cards each
    assert_eq!(ctx.store.len(Collection::Flashcards), 50);

    let response = ctx.pipeline.handle("delete all flashcards").await;
    assert!(response.success, "Pipeline died after flood test: {}", response.message);
    assert_eq!(ctx.store.len(Collection::Flashcards), 0);
}

#[tokio::test]
async fn test_malformed_ai_replies_never_break_handling() {
    let reasoner = MockReasoner::new();
    let replies = [
        "",
        "{",
        "}{",
        "{\"actions\": \"not a list\"}",
        "{\"actions\": [{\"type\": \"explode\", \"target\": \"moon\"}]}",
        "{\"actions\": [{\"type\": \"convert\", \"target\": \"spaceships\"}]}",
        "{\"actions\": [{\"type\": \"create\", \"target\": \"flashcards\", \"data\": {\"count\": \"lots\"}}]}",
        "```json\nnull\n```",
    ];
    for reply in replies {
        reasoner.push_reply(reply);
    }
    reasoner.push_failure();

    let mut ctx = TestContext::with_reasoner(reasoner.clone());
    let utterance = "make 3 flashcards about rust and 2 notes about python, then list my notes, and show stats";

    for _ in 0..replies.len() + 1 {
        let response = ctx.pipeline.handle(utterance).await;
        assert!(!response.message.is_empty());
    }

    assert!(reasoner.calls() >= replies.len());
    assert!(ctx.store.len(Collection::Flashcards) > 0);
}
