//! History module tests
//!
//! Contains test suites for the scan history:
//! - Store tests (append, eviction, clear, sequence ids)
//! - Persistence tests (persist/restore, malformed snapshots, quota failures)
//! - File storage tests (atomic writes, quarantine of unreadable files)

use crate::history::ScanCode;

/// Helper: scan code from a literal known to be non-blank
#[cfg(test)]
fn scan_code(raw: &str) -> ScanCode {
    ScanCode::new(raw).unwrap()
}

#[cfg(test)]
mod storage_tests;
#[cfg(test)]
mod store_tests;
