// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded scan history with persistence
//!
//! Keeps the most recent scans, newest first, and mirrors them to a
//! snapshot storage backend. Key properties:
//!
//! - **Bounded**: never more than `HISTORY_CAPACITY` records; the oldest is
//!   evicted when a new one is appended to a full history
//! - **Strict ordering**: index 0 is always the most recently appended record
//! - **Monotonic ids**: every appended record gets a sequence id greater
//!   than any issued before it, including across `clear()` and restarts
//!   (the counter floor is persisted next to the records)
//! - **Forgiving restore**: a missing or unreadable snapshot yields an empty
//!   history instead of an error at startup
//!
//! # Example
//!
//! ```
//! use chrono::Local;
//! use wedge_scan::history::{HistoryStore, MemoryStorage, ScanCode};
//!
//! let mut store = HistoryStore::open(MemoryStorage::new());
//! let code = ScanCode::new("4006381333931").ok_or("blank code")?;
//! store.append(code, Local::now());
//! store.persist()?;
//!
//! assert_eq!(store.size(), 1);
//! assert_eq!(store.latest().map(|r| r.code()), Some("4006381333931"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod record;
pub mod storage;

pub use error::{HistoryError, StorageError};
pub use record::{ScanCode, ScanRecord};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage, HISTORY_KEY};

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Maximum number of records kept
pub const HISTORY_CAPACITY: usize = 100;

/// Summary figures for a status line
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HistoryStats {
    /// Number of records currently held
    pub total: usize,
    /// Time of day of the newest record
    pub last_time: Option<String>,
}

/// Most-recent-first log of completed scans
pub struct HistoryStore<S = FileStorage> {
    records: VecDeque<ScanRecord>,
    next_seq: u64,
    storage: S,
}

impl<S: SnapshotStorage> HistoryStore<S> {
    /// Creates an empty store without reading the backend.
    pub fn new(storage: S) -> Self {
        Self {
            records: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
            next_seq: 1,
            storage,
        }
    }

    /// Creates a store and restores the last persisted snapshot.
    ///
    /// Never fails: an absent snapshot means a fresh history, and an
    /// unreadable one is set aside (where the backend supports it) and
    /// replaced by an empty history.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);

        match store.restore() {
            Ok(0) => tracing::info!("starting with an empty scan history"),
            Ok(count) => tracing::info!(count, "restored scan history"),
            Err(HistoryError::MalformedSnapshot(reason)) => {
                tracing::info!(%reason, "ignoring unreadable history snapshot");
                match store.storage.quarantine() {
                    Ok(Some(path)) => {
                        tracing::info!(path = %path.display(), "unreadable snapshot set aside")
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("could not set unreadable snapshot aside: {}", e),
                }
            }
            Err(e) => tracing::warn!("could not read scan history, starting empty: {}", e),
        }

        store
    }

    /// Records a completed scan and returns the stored record.
    ///
    /// Evicts the oldest record when the history is full. This only changes
    /// memory; call `persist` to save.
    pub fn append(&mut self, code: ScanCode, captured_at: DateTime<Local>) -> ScanRecord {
        let record = ScanRecord::new(code, captured_at, self.next_seq);
        self.next_seq = self.next_seq.saturating_add(1);

        self.records.push_front(record.clone());
        while self.records.len() > HISTORY_CAPACITY {
            if let Some(evicted) = self.records.pop_back() {
                tracing::trace!(seq = evicted.sequence_id(), "evicted oldest scan");
            }
        }

        record
    }

    /// Removes every record. Sequence ids keep counting up.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Most recently appended record
    pub fn latest(&self) -> Option<&ScanRecord> {
        self.records.front()
    }

    /// Number of records held
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records, newest first
    pub fn iter(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter()
    }

    /// Record at `index` (0 = newest)
    pub fn get(&self, index: usize) -> Option<&ScanRecord> {
        self.records.get(index)
    }

    /// Sequence id the next append will receive
    pub fn next_sequence_id(&self) -> u64 {
        self.next_seq
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total: self.records.len(),
            last_time: self.latest().map(|r| r.time().to_string()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Serialises the whole history, newest first.
    pub fn snapshot(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.records)?)
    }

    /// Writes the current history to the backend.
    ///
    /// The sequence floor is written before the records, so a failure
    /// between the two can only leave the floor ahead. A failure leaves the
    /// in-memory history untouched and is not retried.
    pub fn persist(&mut self) -> Result<(), HistoryError> {
        let blob = self.snapshot()?;
        self.storage.save_sequence_floor(self.next_seq)?;
        self.storage.save(&blob)?;
        tracing::trace!(bytes = blob.len(), records = self.records.len(), "history persisted");
        Ok(())
    }

    /// Replaces the in-memory history with the stored snapshot.
    ///
    /// Returns the number of records restored. On any error the history is
    /// left empty. The persisted sequence floor is honoured even then.
    pub fn restore(&mut self) -> Result<usize, HistoryError> {
        self.records.clear();

        match self.storage.load_sequence_floor() {
            Ok(Some(floor)) => self.next_seq = self.next_seq.max(floor),
            Ok(None) => {}
            Err(e) => tracing::warn!("ignoring stored sequence floor: {}", e),
        }

        let blob = match self.storage.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(0),
            Err(StorageError::Unreadable(reason)) => {
                return Err(HistoryError::MalformedSnapshot(reason))
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = parse_snapshot(&blob)?;

        if records.len() > HISTORY_CAPACITY {
            tracing::warn!(
                found = records.len(),
                kept = HISTORY_CAPACITY,
                "snapshot exceeds history capacity, keeping the newest records"
            );
            records.truncate(HISTORY_CAPACITY);
        }

        if !has_valid_sequence_ids(&records) {
            // Snapshot written without ids: number oldest = 1
            let count = records.len() as u64;
            for (i, record) in records.iter_mut().enumerate() {
                record.set_sequence_id(count - i as u64);
            }
        }

        let max_seq = records.iter().map(ScanRecord::sequence_id).max().unwrap_or(0);
        let Some(after_max) = max_seq.checked_add(1) else {
            return Err(HistoryError::MalformedSnapshot(format!(
                "sequence id {} leaves no room for new scans",
                max_seq
            )));
        };

        self.next_seq = self.next_seq.max(after_max);
        self.records = records.into();

        Ok(self.records.len())
    }
}

/// Parses and validates a snapshot blob.
fn parse_snapshot(blob: &str) -> Result<Vec<ScanRecord>, HistoryError> {
    let records: Vec<ScanRecord> = serde_json::from_str(blob)
        .map_err(|e| HistoryError::MalformedSnapshot(e.to_string()))?;

    if let Some(position) = records.iter().position(|r| r.code().trim().is_empty()) {
        return Err(HistoryError::MalformedSnapshot(format!(
            "entry {} has an empty code",
            position
        )));
    }

    Ok(records)
}

/// Ids must be non-zero and strictly decreasing from newest to oldest.
fn has_valid_sequence_ids(records: &[ScanRecord]) -> bool {
    records.iter().all(|r| r.sequence_id() > 0)
        && records
            .windows(2)
            .all(|pair| pair[0].sequence_id() > pair[1].sequence_id())
}

#[cfg(test)]
mod tests;
