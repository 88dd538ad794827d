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

//! src/core/types.rs
//!
//! Core type definitions for keystroke segmentation
//!
//! This module defines the values that flow through the scan pipeline:
//! - `RawKeyEvent`: A key press as the host environment reports it
//! - `Symbol`: A printable character or the terminator signal
//! - `Token`: A normalised symbol stamped with its arrival time
//! - `ScanCompleted`: The event emitted once a burst is judged to be one scan
//!
//! Timestamps are monotonic (`Instant`) so that segmentation never depends
//! on the wall clock being adjusted mid-scan.

use std::fmt;
use std::time::Instant;

/// A key press as reported by the host environment
///
/// Mirrors what a keyboard-wedge device produces: a key name (a single
/// character for printable keys, a name such as "Enter" or "Shift" for
/// everything else), an optional legacy numeric key code, and the moment
/// the event arrived.
///
/// # Example
/// ```ignore
/// let event = RawKeyEvent::new("7", Instant::now());
/// let enter = RawKeyEvent::with_code("Enter", 13, Instant::now());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawKeyEvent {
    /// Printable representation or key name (e.g., "a", "Enter", "F1")
    pub key: String,

    /// Legacy numeric key code, when the source provides one (13 = Enter)
    pub key_code: Option<u32>,

    /// Monotonic arrival time
    pub at: Instant,
}

impl RawKeyEvent {
    /// Creates an event without a numeric key code.
    pub fn new(key: impl Into<String>, at: Instant) -> Self {
        Self {
            key: key.into(),
            key_code: None,
            at,
        }
    }

    /// Creates an event carrying a numeric key code.
    pub fn with_code(key: impl Into<String>, key_code: u32, at: Instant) -> Self {
        Self {
            key: key.into(),
            key_code: Some(key_code),
            at,
        }
    }
}

/// A normalised key symbol
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Symbol {
    /// A single printable character
    Char(char),
    /// End-of-scan control signal ("confirm"/"enter")
    Terminator,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{}", c.escape_debug()),
            Symbol::Terminator => write!(f, "<TERMINATOR>"),
        }
    }
}

/// A symbol together with the time it occurred
///
/// Tokens are ephemeral: the segmenter consumes them and keeps nothing
/// but the character (if any) and the timestamp.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token {
    pub symbol: Symbol,
    pub occurred_at: Instant,
}

impl Token {
    /// Character token
    pub fn char(c: char, occurred_at: Instant) -> Self {
        Self {
            symbol: Symbol::Char(c),
            occurred_at,
        }
    }

    /// Terminator token
    pub fn terminator(occurred_at: Instant) -> Self {
        Self {
            symbol: Symbol::Terminator,
            occurred_at,
        }
    }
}

/// Which rule finalised a scan
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompletionTrigger {
    /// An explicit terminator key arrived
    Terminator,
    /// The idle-completion window elapsed with no further input
    IdleTimeout,
}

impl fmt::Display for CompletionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionTrigger::Terminator => write!(f, "terminator"),
            CompletionTrigger::IdleTimeout => write!(f, "idle-timeout"),
        }
    }
}

/// A burst of characters judged to be one scanned code
///
/// `code` is always non-empty and trimmed of surrounding whitespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanCompleted {
    /// The scanned code, trimmed
    pub code: String,

    /// Monotonic time at which the scan was finalised
    pub observed_at: Instant,

    /// Rule that finalised the scan
    pub trigger: CompletionTrigger,
}

impl fmt::Display for ScanCompleted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (via {})", self.code, self.trigger)
    }
}
