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

//! Scan dispatch
//!
//! Wires the pipeline together:
//!
//! ```text
//! RawKeyEvent ─► KeyNormalizer ─► ScanSegmenter ─► HistoryStore::append
//!                                                        │
//!                                   persist ◄────────────┤
//!                                   observers ◄──────────┤
//!                                   confirmation tone ◄──┘
//! ```
//!
//! Everything runs on the caller's thread. One key event is processed
//! completely (including persistence and notifications) before the next.
//! Failures of the collaborators never reach the segmenter: a failed
//! persist becomes a `Notice`, a failed tone is dropped.

pub mod terminal;

#[cfg(test)]
mod tests;

pub use terminal::{TerminalBell, TerminalView};

use chrono::Local;
use std::time::Instant;
use thiserror::Error;

use crate::{
    config::DeviceProfile,
    core::{KeyNormalizer, RawKeyEvent, ScanCompleted, ScanSegmenter},
    history::{HistoryError, HistoryStats, HistoryStore, ScanCode, ScanRecord, SnapshotStorage},
};

/// Non-fatal conditions worth showing to the user
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    /// The history could not be saved; it is still held in memory
    PersistFailed(String),
    /// The history was emptied
    HistoryCleared,
}

/// Rendering collaborator
///
/// Receives every recorded scan. Implementations must not block for long:
/// they run between two key events.
pub trait ScanObserver {
    fn on_scan(&mut self, scan: &ScanCompleted, record: &ScanRecord, stats: &HistoryStats);

    fn on_notice(&mut self, _notice: &Notice) {}
}

/// Confirmation tone failure
#[derive(Debug, Error)]
pub enum ToneError {
    /// Output device unavailable
    #[error("Output device unavailable: {0}")]
    Unavailable(String),
}

/// Audible confirmation played after each recorded scan
pub trait ConfirmationTone {
    fn play(&mut self) -> Result<(), ToneError>;
}

/// Routes key events through segmentation into the history
pub struct ScanDispatcher<S: SnapshotStorage> {
    normalizer: KeyNormalizer,
    segmenter: ScanSegmenter,
    store: HistoryStore<S>,
    observers: Vec<Box<dyn ScanObserver>>,
    tone: Option<Box<dyn ConfirmationTone>>,
}

impl<S: SnapshotStorage> ScanDispatcher<S> {
    /// Creates a dispatcher for a device profile on top of an open store.
    pub fn new(profile: &DeviceProfile, store: HistoryStore<S>) -> Self {
        Self {
            normalizer: profile.normalizer(),
            segmenter: ScanSegmenter::new(profile.segmenter_config()),
            store,
            observers: Vec::new(),
            tone: None,
        }
    }

    /// Adds a rendering collaborator.
    pub fn with_observer(mut self, observer: Box<dyn ScanObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Sets the confirmation tone.
    pub fn with_tone(mut self, tone: Box<dyn ConfirmationTone>) -> Self {
        self.tone = Some(tone);
        self
    }

    /// Processes one key event.
    ///
    /// Returns the record appended to the history, if this event completed
    /// a scan (directly, or by revealing an overdue idle timer).
    pub fn handle_key(&mut self, event: &RawKeyEvent) -> Option<ScanRecord> {
        let token = self.normalizer.normalize(event)?;
        let scan = self.segmenter.feed(token)?;
        self.record(scan)
    }

    /// Lets time pass: fires the idle timer if it is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<ScanRecord> {
        let scan = self.segmenter.poll(now)?;
        self.record(scan)
    }

    /// Completes any partial burst, for when the input source closes.
    pub fn flush(&mut self, now: Instant) -> Option<ScanRecord> {
        let scan = self.segmenter.flush(now)?;
        self.record(scan)
    }

    /// When `tick` next needs to be called, if a burst is pending
    pub fn next_deadline(&self) -> Option<Instant> {
        self.segmenter.next_deadline()
    }

    /// Empties the history and saves the empty state.
    ///
    /// Whether to clear at all (confirmation prompts and the like) is the
    /// caller's decision. A failed save is reported to the observers and
    /// returned; the history stays cleared in memory.
    pub fn clear_history(&mut self) -> Result<(), HistoryError> {
        self.store.clear();
        self.notify(&Notice::HistoryCleared);
        tracing::info!("scan history cleared");

        if let Err(e) = self.store.persist() {
            tracing::warn!("cleared history not saved: {}", e);
            self.notify(&Notice::PersistFailed(e.to_string()));
            return Err(e);
        }
        Ok(())
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.store
    }

    pub fn segmenter(&self) -> &ScanSegmenter {
        &self.segmenter
    }

    /// Appends, persists, notifies and beeps, in that order.
    fn record(&mut self, scan: ScanCompleted) -> Option<ScanRecord> {
        // The segmenter never emits a blank code
        let code = ScanCode::new(&scan.code)?;
        let record = self.store.append(code, Local::now());
        tracing::info!(
            code = record.code(),
            seq = record.sequence_id(),
            trigger = %scan.trigger,
            "scan recorded"
        );

        if let Err(e) = self.store.persist() {
            tracing::warn!("history not saved, keeping it in memory: {}", e);
            self.notify(&Notice::PersistFailed(e.to_string()));
        }

        let stats = self.store.stats();
        for observer in &mut self.observers {
            observer.on_scan(&scan, &record, &stats);
        }

        if let Some(tone) = &mut self.tone {
            if let Err(e) = tone.play() {
                tracing::debug!("confirmation tone failed: {}", e);
            }
        }

        Some(record)
    }

    fn notify(&mut self, notice: &Notice) {
        for observer in &mut self.observers {
            observer.on_notice(notice);
        }
    }
}
