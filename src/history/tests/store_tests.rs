use chrono::{Duration, Local, TimeZone};

use super::scan_code;
use crate::history::{HistoryStore, MemoryStorage, ScanCode, HISTORY_CAPACITY};

/// Helper: fresh store backed by memory
fn memory_store() -> HistoryStore<MemoryStorage> {
    HistoryStore::new(MemoryStorage::new())
}

#[test]
fn test_new_store_is_empty() {
    let store = memory_store();

    assert_eq!(store.size(), 0);
    assert!(store.is_empty());
    assert!(store.latest().is_none());
    assert_eq!(store.stats().total, 0);
    assert_eq!(store.stats().last_time, None);
}

#[test]
fn test_append_inserts_newest_first() {
    let mut store = memory_store();
    let now = Local::now();

    store.append(scan_code("first"), now);
    store.append(scan_code("second"), now + Duration::seconds(1));

    assert_eq!(store.size(), 2);
    assert_eq!(store.latest().unwrap().code(), "second");
    assert_eq!(store.get(1).unwrap().code(), "first");
}

#[test]
fn test_append_returns_stored_record() {
    let mut store = memory_store();
    let captured_at = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

    let record = store.append(scan_code("  0042  "), captured_at);

    assert_eq!(record.code(), "0042", "code is trimmed");
    assert_eq!(record.time(), "09:26:53");
    assert_eq!(record.full_time(), "14/03/2025, 09:26:53");
    assert_eq!(record.timestamp_millis(), captured_at.timestamp_millis());
    assert_eq!(record.captured_at(), Some(captured_at));
    assert_eq!(store.latest(), Some(&record));
}

#[test]
fn test_sequence_ids_increase() {
    let mut store = memory_store();
    let now = Local::now();

    let a = store.append(scan_code("a"), now);
    let b = store.append(scan_code("b"), now);
    let c = store.append(scan_code("c"), now);

    assert!(a.sequence_id() < b.sequence_id());
    assert!(b.sequence_id() < c.sequence_id());
    assert_eq!(store.next_sequence_id(), c.sequence_id() + 1);
}

#[test]
fn test_eviction_keeps_most_recent_hundred() {
    let mut store = memory_store();
    let now = Local::now();

    for i in 0..=HISTORY_CAPACITY {
        store.append(scan_code(&format!("code-{}", i)), now);
    }

    assert_eq!(store.size(), HISTORY_CAPACITY);

    // The very first record is gone
    assert!(store.iter().all(|r| r.code() != "code-0"));

    // The rest are the 100 most recent, newest first
    let codes: Vec<_> = store.iter().map(|r| r.code().to_string()).collect();
    let expected: Vec<_> = (1..=HISTORY_CAPACITY)
        .rev()
        .map(|i| format!("code-{}", i))
        .collect();
    assert_eq!(codes, expected);
}

#[test]
fn test_size_never_exceeds_capacity() {
    let mut store = memory_store();
    let now = Local::now();

    for i in 0..(HISTORY_CAPACITY * 3) {
        store.append(scan_code(&i.to_string()), now);
        assert!(store.size() <= HISTORY_CAPACITY);
    }
}

#[test]
fn test_clear_then_append() {
    let mut store = memory_store();
    let now = Local::now();

    let mut highest = 0;
    for i in 0..HISTORY_CAPACITY {
        highest = store.append(scan_code(&i.to_string()), now).sequence_id();
    }
    assert_eq!(store.size(), 100);

    store.clear();
    assert_eq!(store.size(), 0);
    assert!(store.latest().is_none());

    let record = store.append(scan_code("after-clear"), now);
    assert_eq!(store.size(), 1);
    assert!(
        record.sequence_id() > highest,
        "ids keep increasing across clear()"
    );
}

#[test]
fn test_stats_reflect_latest_record() {
    let mut store = memory_store();
    let captured_at = Local.with_ymd_and_hms(2025, 10, 1, 18, 5, 0).unwrap();

    store.append(scan_code("x"), captured_at - Duration::minutes(1));
    store.append(scan_code("y"), captured_at);

    let stats = store.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.last_time.as_deref(), Some("18:05:00"));
}

#[test]
fn test_record_display() {
    let mut store = memory_store();
    let record = store.append(scan_code("ABC"), Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap());

    let display = format!("{}", record);
    assert!(display.contains("#1"));
    assert!(display.contains("ABC"));
    assert!(display.contains("02/01/2025, 03:04:05"));
}

#[test]
fn test_scan_code_is_trimmed_and_never_blank() {
    assert_eq!(ScanCode::new("\t4006381333931\n").unwrap().as_str(), "4006381333931");

    for blank in ["", " ", "\t\n", "\u{a0}"] {
        assert!(ScanCode::new(blank).is_none(), "{:?} must not become a code", blank);
    }
}
