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

//! Live keyboard capture from the terminal
//!
//! The terminal is switched to raw mode so every key press arrives
//! immediately and unechoed. The loop blocks on input; the only timed wait
//! is the segmenter's idle deadline, which is used as the poll timeout.

use crossterm::{
    event::{self, Event},
    terminal,
};
use std::{io, time::Instant};

use crate::core::RawKeyEvent;
use crate::dispatch::ScanDispatcher;
use crate::history::SnapshotStorage;
use crate::input::is_quit_key;

/// Raw-mode guard; restores the terminal when dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("failed to restore terminal mode: {}", e);
        }
    }
}

/// Terminal capture surface for a keyboard-wedge scanner
///
/// Holds the terminal in raw mode for as long as it lives.
///
/// # Example
///
/// ```no_run
/// use wedge_scan::config::DeviceProfile;
/// use wedge_scan::dispatch::ScanDispatcher;
/// use wedge_scan::history::{FileStorage, HistoryStore};
/// use wedge_scan::input::KeyboardCapture;
///
/// let store = HistoryStore::open(FileStorage::new("/tmp/scans"));
/// let mut dispatcher = ScanDispatcher::new(&DeviceProfile::default(), store);
///
/// let mut capture = KeyboardCapture::start()?;
/// let scans = capture.run(&mut dispatcher)?; // Blocks until Ctrl+C / Esc
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct KeyboardCapture {
    _raw_mode: RawModeGuard,
}

impl KeyboardCapture {
    /// Enters raw mode.
    ///
    /// # Errors
    ///
    /// Fails if stdin is not a terminal.
    pub fn start() -> io::Result<Self> {
        Ok(Self {
            _raw_mode: RawModeGuard::enable()?,
        })
    }

    /// Feeds key presses to the dispatcher until a quit key is pressed.
    ///
    /// Returns the number of scans recorded. A burst still pending when the
    /// session ends is completed before returning.
    pub fn run<S: SnapshotStorage>(
        &mut self,
        dispatcher: &mut ScanDispatcher<S>,
    ) -> io::Result<usize> {
        let mut recorded = 0;

        loop {
            let ready = match dispatcher.next_deadline() {
                Some(deadline) => event::poll(deadline.saturating_duration_since(Instant::now()))?,
                None => true,
            };

            if ready {
                if let Event::Key(key) = event::read()? {
                    let now = Instant::now();

                    if is_quit_key(&key) {
                        break;
                    }

                    if let Some(raw) = RawKeyEvent::from_crossterm(key, now) {
                        recorded += dispatcher.handle_key(&raw).into_iter().count();
                    }
                }
            }

            recorded += dispatcher.tick(Instant::now()).into_iter().count();
        }

        recorded += dispatcher.flush(Instant::now()).into_iter().count();
        tracing::debug!(recorded, "capture session ended");

        Ok(recorded)
    }
}
