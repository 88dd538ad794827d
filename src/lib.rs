// Copyright 2025 bakri (tidynest@proton.me)
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

//! Keyboard-Wedge Scan Capture
//!
//! Turns the raw keystroke stream of a barcode scanner in keyboard-wedge
//! mode into discrete scan events, and keeps a bounded, persisted log of
//! past scans.
//!
//! # Features
//!
//! - **Burst Segmentation:** Idle-gap reset, explicit terminator, and idle timeout
//! - **No Double Scans:** Generation-tagged idle timers; stale timers never fire
//! - **Bounded History:** Newest-first log capped at 100 scans, with eviction
//! - **Crash-Safe Persistence:** Atomic snapshot writes, unreadable snapshots set aside
//! - **Device Profiles:** Per-scanner timing thresholds and terminator keys
//! - **Replay:** Reproduce field captures from recorded key scripts
//!
//! # Architecture
//!
//! - **`core`:** Normalisation and segmentation (pure, clock-free state machine)
//! - **`history`:** Bounded scan log and snapshot storage backends
//! - **`config`:** Device profiles and path handling
//! - **`dispatch`:** Pipeline wiring plus rendering and tone collaborators
//! - **`input`:** Terminal key capture and script replay
//!
//! # Examples
//!
//! ## Segmenting a token stream
//!
//! ```
//! use std::time::{Duration, Instant};
//! use wedge_scan::core::{ScanSegmenter, Token};
//!
//! let mut segmenter = ScanSegmenter::default();
//! let t0 = Instant::now();
//!
//! segmenter.feed(Token::char('4', t0));
//! segmenter.feed(Token::char('2', t0 + Duration::from_millis(8)));
//!
//! // No terminator: the idle timer completes the scan
//! let scan = segmenter.poll(t0 + Duration::from_millis(300)).unwrap();
//! assert_eq!(scan.code, "42");
//! ```
//!
//! ## Recording scans to disk
//!
//! ```no_run
//! use std::time::Instant;
//! use wedge_scan::config::DeviceProfile;
//! use wedge_scan::core::RawKeyEvent;
//! use wedge_scan::dispatch::ScanDispatcher;
//! use wedge_scan::history::{FileStorage, HistoryStore};
//!
//! let store = HistoryStore::open(FileStorage::new("/tmp/scans"));
//! let mut dispatcher = ScanDispatcher::new(&DeviceProfile::default(), store);
//!
//! dispatcher.handle_key(&RawKeyEvent::new("7", Instant::now()));
//! dispatcher.handle_key(&RawKeyEvent::with_code("Enter", 13, Instant::now()));
//! println!("{} scans on record", dispatcher.history().size());
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod core;
pub mod dispatch;
pub mod history;
pub mod input;

// Re-export commonly used types for convenience
pub use crate::core::{RawKeyEvent, ScanCompleted, ScanSegmenter, Token};
pub use crate::history::{HistoryStore, ScanCode, ScanRecord};
