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

//! Recorded key script replay
//!
//! A script is JSON lines, one key press per line, with its offset in
//! milliseconds from the start of the recording:
//!
//! ```text
//! # Two scans: the first without a terminator
//! {"key": "1", "at_ms": 0}
//! {"key": "2", "at_ms": 10}
//! {"key": "4", "at_ms": 270}
//! {"key": "Enter", "key_code": 13, "at_ms": 290}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Offsets must never
//! go backwards. Replay runs on synthetic timestamps, so it completes
//! instantly and produces exactly what the live capture would.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};
use thiserror::Error;

use crate::core::RawKeyEvent;
use crate::dispatch::ScanDispatcher;
use crate::history::{ScanRecord, SnapshotStorage};

/// Script errors with line number context
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Script error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Offset goes backwards on line {line}: {at_ms}ms after {previous_ms}ms")]
    OutOfOrder {
        line: usize,
        at_ms: u64,
        previous_ms: u64,
    },

    #[error("IO error reading script: {0}")]
    IoError(#[from] std::io::Error),
}

/// One key press in a recorded script
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordedKey {
    /// Key name or printable character
    pub key: String,

    /// Optional legacy numeric key code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_code: Option<u32>,

    /// Offset from the start of the recording
    pub at_ms: u64,
}

impl RecordedKey {
    /// The raw event this key represents, relative to `base`.
    pub fn to_event(&self, base: Instant) -> RawKeyEvent {
        RawKeyEvent {
            key: self.key.clone(),
            key_code: self.key_code,
            at: base + Duration::from_millis(self.at_ms),
        }
    }
}

/// Parses a script from text.
pub fn parse_script(content: &str) -> Result<Vec<RecordedKey>, ReplayError> {
    let mut keys: Vec<RecordedKey> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let key: RecordedKey =
            serde_json::from_str(trimmed).map_err(|e| ReplayError::InvalidSyntax {
                line: line_number,
                message: e.to_string(),
            })?;

        if let Some(previous) = keys.last() {
            if key.at_ms < previous.at_ms {
                return Err(ReplayError::OutOfOrder {
                    line: line_number,
                    at_ms: key.at_ms,
                    previous_ms: previous.at_ms,
                });
            }
        }

        keys.push(key);
    }

    Ok(keys)
}

/// Reads and parses a script file.
pub fn load_script(path: &Path) -> Result<Vec<RecordedKey>, ReplayError> {
    parse_script(&fs::read_to_string(path)?)
}

/// Feeds a script through the dispatcher as if typed starting at `base`.
///
/// After the last key the input is treated as silent forever, so a final
/// unterminated burst completes through the idle timer. Returns the
/// recorded scans in order.
pub fn replay<S: SnapshotStorage>(
    script: &[RecordedKey],
    dispatcher: &mut ScanDispatcher<S>,
    base: Instant,
) -> Vec<ScanRecord> {
    let mut records = Vec::new();

    for key in script {
        records.extend(dispatcher.handle_key(&key.to_event(base)));
    }

    if let Some(deadline) = dispatcher.next_deadline() {
        records.extend(dispatcher.tick(deadline));
    }

    records
}
