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

//! Scan record type and its persisted shape
//!
//! A record is created once by `HistoryStore::append` and never changes
//! afterwards. The serialised field names (`code`, `time`, `fullTime`,
//! `ts`) match the snapshot layout written by the scanner web page, so
//! histories captured there can be restored here.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display format for the time-of-day column
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Display format for the full timestamp
pub const FULL_TIME_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// A scanned code: trimmed and never empty
///
/// The only way into the history, so a blank code cannot be stored.
///
/// # Example
/// ```
/// use wedge_scan::history::ScanCode;
///
/// assert_eq!(ScanCode::new("  0042 ").map(|c| c.to_string()), Some("0042".to_string()));
/// assert!(ScanCode::new(" \t ").is_none());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ScanCode(String);

impl ScanCode {
    /// Trims `raw`; `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed scan in the history
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScanRecord {
    /// Scanned code, trimmed and non-empty
    code: String,

    /// Time of day the scan was captured (HH:MM:SS)
    time: String,

    /// Date and time the scan was captured, for display
    #[serde(rename = "fullTime")]
    full_time: String,

    /// Capture instant as milliseconds since the Unix epoch
    ts: i64,

    /// Store-assigned sequence id (0 = not yet assigned)
    #[serde(default)]
    seq: u64,
}

impl ScanRecord {
    pub(crate) fn new(code: ScanCode, captured_at: DateTime<Local>, seq: u64) -> Self {
        Self {
            code: code.0,
            time: captured_at.format(TIME_FORMAT).to_string(),
            full_time: captured_at.format(FULL_TIME_FORMAT).to_string(),
            ts: captured_at.timestamp_millis(),
            seq,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Time-of-day string as captured
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Full date-time string as captured
    pub fn full_time(&self) -> &str {
        &self.full_time
    }

    /// Capture instant in milliseconds since the Unix epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.ts
    }

    /// Capture instant in local time, if the stored timestamp is in range
    pub fn captured_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.ts).single()
    }

    pub fn sequence_id(&self) -> u64 {
        self.seq
    }

    pub(crate) fn set_sequence_id(&mut self, seq: u64) {
        self.seq = seq;
    }
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} [{}]", self.seq, self.code, self.full_time)
    }
}
