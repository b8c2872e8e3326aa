//! Record storage
//!
//! The executor only sees [`RecordStore`]; the backend is picked from config.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{AssistError, AssistResult};
use crate::model::{Collection, Record, RecordDraft};

/// Storage collaborator for the three record collections
pub trait RecordStore: Send + Sync {
    /// Every record of a collection, in insertion order
    fn load(&self, collection: Collection) -> AssistResult<Vec<Record>>;

    /// Replace a collection's contents
    fn save(&self, collection: Collection, records: &[Record]) -> AssistResult<()>;

    /// Store new records, assigning ids and timestamps
    fn add_batch(&self, drafts: Vec<RecordDraft>) -> AssistResult<Vec<Record>>;

    /// Remove one record by id; unknown ids are ignored
    fn remove(&self, collection: Collection, id: &str) -> AssistResult<()>;
}

/// Id prefix per collection
pub(crate) fn id_prefix(collection: Collection) -> &'static str {
    match collection {
        Collection::Notes => "note",
        Collection::Flashcards => "card",
        Collection::Schedule => "event",
    }
}

/// Open the backend named by `config.storage_backend`
pub fn open_store(config: &Config) -> AssistResult<Arc<dyn RecordStore>> {
    match config.storage_backend.as_str() {
        "memory" => {
            info!("💾 Using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        "sqlite" => {
            let path = PathBuf::from(&config.database_path);
            info!("💾 Using SQLite storage at {:?}", path);
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        other => Err(AssistError::Config(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}
