use chrono::{NaiveDate, NaiveTime};
use studymate::model::{Collection, Record, RecordDraft};
use studymate::storage::{open_store, RecordStore, SqliteStore};
use studymate::Config;
use tempfile::tempdir;

fn note(topic: &str) -> RecordDraft {
    RecordDraft::Note {
        title: format!("{} notes", topic),
        content: format!("Study notes on {}.", topic),
        category: topic.to_string(),
        tags: vec![topic.to_string()],
    }
}

#[test]
fn test_sqlite_keeps_insertion_order_and_collections_apart() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("study.db")).unwrap();

    let created = store
        .add_batch(vec![
            note("physics"),
            RecordDraft::Flashcard {
                question: "What is inertia?".into(),
                answer: "Resistance to change in motion".into(),
                category: "physics".into(),
            },
            note("biology"),
        ])
        .unwrap();
    assert_eq!(created.len(), 3);
    assert!(created[0].id().starts_with("note-"));
    assert!(created[1].id().starts_with("card-"));

    let notes = store.load(Collection::Notes).unwrap();
    let categories: Vec<&str> = notes.iter().map(Record::category).collect();
    assert_eq!(categories, vec!["physics", "biology"]);
    assert_eq!(store.load(Collection::Flashcards).unwrap().len(), 1);
    assert!(store.load(Collection::Schedule).unwrap().is_empty());
}

#[test]
fn test_sqlite_remove_and_save() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("nested").join("study.db")).unwrap();

    let created = store
        .add_batch(vec![note("a"), note("b"), note("c")])
        .unwrap();
    store.remove(Collection::Notes, created[1].id()).unwrap();

    let remaining = store.load(Collection::Notes).unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|r| r.id() != created[1].id()));

    store.save(Collection::Notes, &[]).unwrap();
    assert!(store.load(Collection::Notes).unwrap().is_empty());

    // Ids are never reused after deletes
    let again = store.add_batch(vec![note("d")]).unwrap();
    assert!(created.iter().all(|r| r.id() != again[0].id()));
}

#[test]
fn test_sqlite_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("study.db");

    {
        let store = SqliteStore::open(path.clone()).unwrap();
        store
            .add_batch(vec![RecordDraft::Schedule {
                title: "Chemistry exam".into(),
                date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
                time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                kind: "exam".into(),
            }])
            .unwrap();
    }

    let store = SqliteStore::open(path).unwrap();
    let items = store.load(Collection::Schedule).unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].searchable_text().contains("chemistry exam"));
    assert_eq!(items[0].category(), "exam");
}

#[test]
fn test_open_store_from_config() {
    let dir = tempdir().unwrap();
    let config = Config {
        storage_backend: "sqlite".into(),
        database_path: dir.path().join("db.sqlite").to_string_lossy().to_string(),
        ..Config::default()
    };
    let store = open_store(&config).unwrap();
    store.add_batch(vec![note("rust")]).unwrap();
    assert_eq!(store.load(Collection::Notes).unwrap().len(), 1);

    let memory = open_store(&Config {
        storage_backend: "memory".into(),
        ..Config::default()
    })
    .unwrap();
    assert!(memory.load(Collection::Notes).unwrap().is_empty());

    let bogus = Config {
        storage_backend: "punch-cards".into(),
        ..Config::default()
    };
    assert!(open_store(&bogus).is_err());
}
