pub mod mock_reasoner;

use std::sync::Arc;

use studymate::core::dates::{ChronoDateParser, DateParser};
use studymate::core::ollama::Reasoner;
use studymate::storage::MemoryStore;
use studymate::{CommandPipeline, Config};

pub use mock_reasoner::MockReasoner;

/// Config isolated from the user's machine: no audit file, no AI
pub fn test_config() -> Config {
    Config {
        storage_backend: "memory".to_string(),
        audit_enabled: false,
        ollama_enabled: false,
        ..Config::default()
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub pipeline: CommandPipeline,
}

impl TestContext {
    /// Rules-only pipeline over an in-memory store
    pub fn new() -> Self {
        Self::build(test_config(), None)
    }

    /// Pipeline with a scripted language model
    pub fn with_reasoner(reasoner: MockReasoner) -> Self {
        let config = Config {
            ollama_enabled: true,
            ..test_config()
        };
        Self::build(config, Some(Arc::new(reasoner)))
    }

    pub fn build(config: Config, reasoner: Option<Arc<dyn Reasoner>>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let dates: Arc<dyn DateParser> = Arc::new(ChronoDateParser::new());
        let pipeline = CommandPipeline::new(&config, store.clone(), reasoner, dates);
        Self { store, pipeline }
    }
}
