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

//! Terminal collaborators: scan rendering and the confirmation bell

use colored::*;
use std::io::{self, Write};

use crate::core::ScanCompleted;
use crate::dispatch::{ConfirmationTone, Notice, ScanObserver, ToneError};
use crate::history::{HistoryStats, ScanRecord};

/// ASCII BEL
const BELL: &[u8] = b"\x07";

/// Prints each recorded scan as one line on stdout
#[derive(Debug)]
pub struct TerminalView {
    line_end: &'static str,
}

impl TerminalView {
    /// View for a terminal in normal (cooked) mode.
    pub fn new() -> Self {
        Self { line_end: "\n" }
    }

    /// View for a terminal in raw mode, where `\n` does not return the
    /// cursor to column zero.
    pub fn raw() -> Self {
        Self { line_end: "\r\n" }
    }

    /// Formats one scan line: code, capture time, running total.
    pub fn format_scan(scan: &ScanCompleted, record: &ScanRecord, stats: &HistoryStats) -> String {
        format!(
            "{} {}  {}  {}",
            "📦".green(),
            record.code().bold(),
            record.full_time().dimmed(),
            format!("#{} · {} total · {}", record.sequence_id(), stats.total, scan.trigger)
                .dimmed(),
        )
    }

    pub fn format_notice(notice: &Notice) -> String {
        match notice {
            Notice::PersistFailed(reason) => {
                format!("{} History not saved: {}", "⚠".yellow(), reason)
            }
            Notice::HistoryCleared => format!("{} History cleared", "🗑".cyan()),
        }
    }

    fn emit(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{}{}", line, self.line_end);
        let _ = stdout.flush();
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for TerminalView {
    fn on_scan(&mut self, scan: &ScanCompleted, record: &ScanRecord, stats: &HistoryStats) {
        self.emit(&Self::format_scan(scan, record, stats));
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.emit(&Self::format_notice(notice));
    }
}

/// Rings the terminal bell
#[derive(Debug, Default)]
pub struct TerminalBell;

impl ConfirmationTone for TerminalBell {
    fn play(&mut self) -> Result<(), ToneError> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(BELL)
            .and_then(|_| stdout.flush())
            .map_err(|e| ToneError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CompletionTrigger;
    use crate::history::{HistoryStore, MemoryStorage, ScanCode};
    use chrono::Local;
    use std::time::Instant;

    #[test]
    fn test_format_scan_contains_code_and_total() {
        let mut store = HistoryStore::new(MemoryStorage::new());
        let record = store.append(ScanCode::new("4006381333931").unwrap(), Local::now());
        let scan = ScanCompleted {
            code: "4006381333931".to_string(),
            observed_at: Instant::now(),
            trigger: CompletionTrigger::Terminator,
        };

        let line = TerminalView::format_scan(&scan, &record, &store.stats());

        assert!(line.contains("4006381333931"));
        assert!(line.contains("1 total"));
        assert!(line.contains("terminator"));
    }

    #[test]
    fn test_format_notice() {
        let line = TerminalView::format_notice(&Notice::PersistFailed("disk full".to_string()));
        assert!(line.contains("disk full"));

        let line = TerminalView::format_notice(&Notice::HistoryCleared);
        assert!(line.contains("cleared"));
    }

    #[test]
    fn test_raw_view_uses_carriage_return() {
        assert_eq!(TerminalView::raw().line_end, "\r\n");
        assert_eq!(TerminalView::new().line_end, "\n");
    }
}
