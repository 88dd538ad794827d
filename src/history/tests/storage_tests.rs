use std::fs;
use tempfile::TempDir;

use super::scan_code;
use crate::history::{FileStorage, HistoryStore, SnapshotStorage, StorageError, HISTORY_KEY};

#[test]
fn test_file_storage_path_uses_fixed_key() {
    let storage = FileStorage::new("/tmp/wedge");

    assert_eq!(
        storage.path(),
        std::path::Path::new("/tmp/wedge").join(format!("{}.json", HISTORY_KEY))
    );
}

#[test]
fn test_load_missing_file_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path());

    assert!(storage.load().unwrap().is_none());
}

#[test]
fn test_save_creates_directory_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("history");
    let mut storage = FileStorage::new(&dir);

    storage.save("[]").unwrap();

    assert!(dir.is_dir(), "Storage directory should be created");
    assert_eq!(fs::read_to_string(storage.path()).unwrap(), "[]");
    assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_save_replaces_previous_blob() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path());

    storage.save("first").unwrap();
    storage.save("second").unwrap();

    assert_eq!(storage.load().unwrap().as_deref(), Some("second"));

    // Atomic writes leave no temporary files behind
    let entries = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_quarantine_moves_file_aside() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path());
    storage.save("corrupt{").unwrap();

    let moved = storage.quarantine().unwrap().unwrap();

    assert!(!storage.path().exists(), "original snapshot should be gone");
    assert_eq!(fs::read_to_string(&moved).unwrap(), "corrupt{");

    let name = moved.file_name().unwrap().to_str().unwrap();
    let timestamp = name
        .strip_prefix(&format!("{}.json.corrupt.", HISTORY_KEY))
        .unwrap();
    assert!(
        chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d_%H%M%S").is_ok(),
        "Timestamp should be valid chrono format: {}",
        timestamp
    );
}

#[test]
fn test_quarantine_twice_does_not_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path());

    storage.save("one").unwrap();
    let first = storage.quarantine().unwrap().unwrap();
    storage.save("two").unwrap();
    let second = storage.quarantine().unwrap().unwrap();

    assert_ne!(first, second);
    assert_eq!(fs::read_to_string(&first).unwrap(), "one");
    assert_eq!(fs::read_to_string(&second).unwrap(), "two");
}

#[test]
fn test_quarantine_without_file_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path());

    assert!(storage.quarantine().unwrap().is_none());
}

#[test]
fn test_store_survives_restart_on_disk() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut store = HistoryStore::open(FileStorage::new(temp_dir.path()));
        store.append(scan_code("persisted-code"), chrono::Local::now());
        store.persist().unwrap();
    }

    let store = HistoryStore::open(FileStorage::new(temp_dir.path()));
    assert_eq!(store.size(), 1);
    assert_eq!(store.latest().unwrap().code(), "persisted-code");
}

#[test]
fn test_corrupt_file_is_set_aside_on_open() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path());
    fs::write(storage.path(), "definitely not json").unwrap();

    let mut store = HistoryStore::open(storage);
    assert!(store.is_empty());

    // Persisting the fresh history must not destroy the unreadable file
    store.append(scan_code("fresh"), chrono::Local::now());
    store.persist().unwrap();

    let kept = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt."))
        .count();
    assert_eq!(kept, 1);
}

#[test]
fn test_ids_keep_increasing_after_clear_on_disk() {
    let temp_dir = TempDir::new().unwrap();

    let highest = {
        let mut store = HistoryStore::open(FileStorage::new(temp_dir.path()));
        for code in ["A", "B", "C"] {
            store.append(scan_code(code), chrono::Local::now());
        }
        let highest = store.latest().unwrap().sequence_id();
        store.clear();
        store.persist().unwrap();
        highest
    };

    let storage = FileStorage::new(temp_dir.path());
    assert_eq!(fs::read_to_string(storage.sequence_path()).unwrap(), "4");

    let mut store = HistoryStore::open(storage);
    let record = store.append(scan_code("D"), chrono::Local::now());
    assert!(record.sequence_id() > highest);
}

#[test]
fn test_unreadable_sequence_floor_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path());
    fs::write(storage.sequence_path(), "lots").unwrap();

    match storage.load_sequence_floor() {
        Err(StorageError::Unreadable(_)) => {}
        other => panic!("Expected Unreadable, got: {:?}", other),
    }

    // The store falls back to the ids found in the records
    let mut store = HistoryStore::open(storage);
    assert_eq!(store.append(scan_code("E"), chrono::Local::now()).sequence_id(), 1);
}

#[test]
fn test_non_utf8_snapshot_is_set_aside_on_open() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path());
    fs::write(storage.path(), [0x5b, 0xff, 0xfe, 0x5d]).unwrap();

    match storage.load() {
        Err(StorageError::Unreadable(_)) => {}
        other => panic!("Expected Unreadable, got: {:?}", other),
    }

    let mut store = HistoryStore::open(storage);
    assert!(store.is_empty());
    assert!(!store.storage().path().exists(), "unreadable file should be moved aside");

    store.append(scan_code("fresh"), chrono::Local::now());
    store.persist().unwrap();

    let kept: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt."))
        .map(|e| fs::read(e.path()).unwrap())
        .collect();
    assert_eq!(kept, vec![vec![0x5b, 0xff, 0xfe, 0x5d]]);
}
