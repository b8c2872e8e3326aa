use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use super::{id_prefix, RecordStore};
use crate::error::AssistResult;
use crate::model::{Collection, Record, RecordDraft};

/// Process-local store, used for tests and `--memory` sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .map(|c| c.get(&collection).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|c| self.len(*c) == 0)
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, collection: Collection) -> AssistResult<Vec<Record>> {
        let collections = self.collections.read()?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn save(&self, collection: Collection, records: &[Record]) -> AssistResult<()> {
        let mut collections = self.collections.write()?;
        collections.insert(collection, records.to_vec());
        Ok(())
    }

    fn add_batch(&self, drafts: Vec<RecordDraft>) -> AssistResult<Vec<Record>> {
        let mut collections = self.collections.write()?;
        let now = Utc::now();

        let created: Vec<Record> = drafts
            .into_iter()
            .map(|draft| {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let id = format!("{}-{}", id_prefix(draft.collection()), n);
                draft.into_record(id, now)
            })
            .collect();

        for record in &created {
            collections
                .entry(record.collection())
                .or_default()
                .push(record.clone());
        }
        Ok(created)
    }

    fn remove(&self, collection: Collection, id: &str) -> AssistResult<()> {
        let mut collections = self.collections.write()?;
        if let Some(records) = collections.get_mut(&collection) {
            records.retain(|r| r.id() != id);
        }
        Ok(())
    }
}
