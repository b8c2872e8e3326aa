use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{id_prefix, RecordStore};
use crate::error::{AssistError, AssistResult};
use crate::model::{Collection, Record, RecordDraft};

/// SQLite-backed store: one table, JSON bodies, insertion order by `seq`
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn open(db_path: PathBuf) -> AssistResult<Self> {
        let store = Self { db_path };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> AssistResult<()> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = self.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id TEXT NOT NULL UNIQUE,
                body TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS records_collection ON records (collection, seq)",
            [],
        )?;
        Ok(())
    }

    fn connect(&self) -> AssistResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }
}

impl RecordStore for SqliteStore {
    fn load(&self, collection: Collection) -> AssistResult<Vec<Record>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT body FROM records WHERE collection = ? ORDER BY seq")?;
        let rows = stmt.query_map([collection.as_str()], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for body in rows {
            let record = Record::from_json(collection, &body?).map_err(|e| {
                AssistError::Storage(format!("corrupt {} record: {}", collection.as_str(), e))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn save(&self, collection: Collection, records: &[Record]) -> AssistResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM records WHERE collection = ?",
            [collection.as_str()],
        )?;
        for record in records {
            tx.execute(
                "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection.as_str(), record.id(), record.to_json()?],
            )?;
        }
        tx.commit()?;
        debug!("💾 Saved {} {} record(s)", records.len(), collection.as_str());
        Ok(())
    }

    fn add_batch(&self, drafts: Vec<RecordDraft>) -> AssistResult<Vec<Record>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        // sqlite_sequence never goes backwards, so ids of deleted rows are not reused
        let mut next: i64 = tx.query_row(
            "SELECT COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'records'), 0)",
            [],
            |row| row.get(0),
        )?;

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            next += 1;
            let collection = draft.collection();
            let record = draft.into_record(format!("{}-{}", id_prefix(collection), next), now);
            tx.execute(
                "INSERT INTO records (seq, collection, id, body) VALUES (?1, ?2, ?3, ?4)",
                params![next, collection.as_str(), record.id(), record.to_json()?],
            )?;
            created.push(record);
        }
        tx.commit()?;
        Ok(created)
    }

    fn remove(&self, collection: Collection, id: &str) -> AssistResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id],
        )?;
        Ok(())
    }
}
