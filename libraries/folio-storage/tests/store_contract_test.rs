//! Contract tests shared by every persistent store
//!
//! Each store must behave like browser local storage: string keys, string
//! values, last write wins, keys fully isolated from each other.

use folio_core::KeyValueStore;
use folio_storage::{JsonFileStore, MemoryStore, ReaderShelf, UnavailableStore};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::tempdir;

fn check_contract(store: &dyn KeyValueStore) {
    // Absent keys are not errors
    assert_eq!(store.get("progress-missing").unwrap(), None);

    store.set("progress-1", "100").unwrap();
    store.set("progress-2", "200").unwrap();
    store.set("progress-1", "150").unwrap();

    assert_eq!(store.get("progress-1").unwrap(), Some("150".to_string()));
    assert_eq!(store.get("progress-2").unwrap(), Some("200".to_string()));

    // Repeating a write is idempotent
    store.set("progress-2", "200").unwrap();
    assert_eq!(store.get("progress-2").unwrap(), Some("200".to_string()));
}

#[test]
fn memory_store_contract() {
    check_contract(&MemoryStore::new());
}

#[test]
fn file_store_contract() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("folio.json")).unwrap();
    check_contract(&store);
}

#[test]
fn shelf_and_positions_share_a_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("folio.json");

    {
        let store = Arc::new(JsonFileStore::open(&path).unwrap());
        let shelf = ReaderShelf::new(store.clone());
        shelf.toggle_bookmark("42").unwrap();
        shelf.record_visit("Harbour Lights").unwrap();
        store.set("progress-42", "880").unwrap();
    }

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let shelf = ReaderShelf::new(store.clone());
    assert!(shelf.is_bookmarked("42"));
    assert_eq!(shelf.reading_history(), vec!["Harbour Lights"]);
    assert_eq!(store.get("progress-42").unwrap(), Some("880".to_string()));
}

#[test]
fn unavailable_store_surfaces_errors_to_shelf_writes() {
    let shelf = ReaderShelf::new(Arc::new(UnavailableStore::default()));
    assert!(shelf.toggle_like("1").is_err());
    // Reads degrade to empty
    assert!(!shelf.is_liked("1"));
    assert!(shelf.reading_history().is_empty());
}

proptest! {
    /// Property: after any sequence of writes, each key holds its last written value
    #[test]
    fn last_write_wins_per_key(
        writes in prop::collection::vec((0usize..4, "[0-9]{1,6}"), 1..40)
    ) {
        let store = MemoryStore::new();
        let mut expected = std::collections::HashMap::new();

        for (key, value) in &writes {
            let key = format!("progress-{}", key);
            store.set(&key, value).unwrap();
            expected.insert(key, value.clone());
        }

        for (key, value) in expected {
            prop_assert_eq!(store.get(&key).unwrap(), Some(value));
        }
        prop_assert_eq!(store.write_count(), writes.len());
    }
}
