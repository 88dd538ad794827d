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

//! src/core/segmenter.rs
//!
//! Scan segmentation state machine
//!
//! Reconstructs scan boundaries from a token stream that carries no framing
//! other than timing and an optional terminator key. Two completion signals
//! are honoured:
//! - **Terminator**: finalises the buffer synchronously
//! - **Idle timeout**: finalises the buffer once no character has arrived
//!   for the idle-completion window
//!
//! A third rule, the **idle-gap reset**, discards a stale buffer when a new
//! character arrives after a pause longer than the inter-character gap.
//!
//! # Timer model
//! The segmenter never sleeps. It keeps at most one pending idle timer,
//! identified by a generation number. Arming a new timer replaces the old
//! one, and finalising or resetting the buffer drops it. A driver either
//! calls `poll(now)` whenever time passes, or schedules a real timer for
//! `pending_timer()` and hands the handle back through `fire_timer`. A stale
//! handle (one whose generation is no longer pending) is ignored, so a
//! burst can never complete twice.
//!
//! Tokens are processed strictly in order. If a token arrives after the
//! pending deadline has already passed, the overdue timer is fired first.

use std::time::{Duration, Instant};

use crate::core::types::{CompletionTrigger, ScanCompleted, Symbol, Token};

/// Default maximum pause between characters of the same burst
pub const DEFAULT_INTER_CHAR_GAP: Duration = Duration::from_millis(100);

/// Default idle window after which an unterminated burst is finalised
pub const DEFAULT_IDLE_COMPLETION: Duration = Duration::from_millis(200);

/// Timing thresholds for segmentation
///
/// The two thresholds are independent knobs: the gap decides whether a new
/// character belongs to the current burst, the idle window decides when an
/// unterminated burst is complete.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmenterConfig {
    /// Pause longer than this clears the buffer before the next character
    pub inter_char_gap: Duration,

    /// Silence of this length after the last character completes the scan
    pub idle_completion: Duration,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            inter_char_gap: DEFAULT_INTER_CHAR_GAP,
            idle_completion: DEFAULT_IDLE_COMPLETION,
        }
    }
}

/// Characters accumulated for the current burst
///
/// Only ever grows by appending or is cleared as a whole.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanBuffer {
    accumulated: String,
    last_token_at: Option<Instant>,
}

impl ScanBuffer {
    /// Current contents, untrimmed
    pub fn as_str(&self) -> &str {
        &self.accumulated
    }

    /// Arrival time of the most recent character
    pub fn last_token_at(&self) -> Option<Instant> {
        self.last_token_at
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    fn push(&mut self, c: char, at: Instant) {
        self.accumulated.push(c);
        self.last_token_at = Some(at);
    }

    /// Empties the buffer and returns what it held.
    fn take(&mut self) -> String {
        self.last_token_at = None;
        std::mem::take(&mut self.accumulated)
    }

    fn clear(&mut self) {
        self.accumulated.clear();
        self.last_token_at = None;
    }
}

/// Identifies one armed idle timer
///
/// Handles compare equal only if they refer to the same arming.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerHandle {
    generation: u64,
    deadline: Instant,
}

impl TimerHandle {
    /// Instant at which this timer should fire
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Keystroke burst segmenter
///
/// All transitions go through `feed`, `poll`, `fire_timer` and `reset`, so
/// the whole state machine can be exercised without an input device.
///
/// # Example
/// ```
/// use std::time::{Duration, Instant};
/// use wedge_scan::core::{ScanSegmenter, Token};
///
/// let mut segmenter = ScanSegmenter::default();
/// let t0 = Instant::now();
///
/// for (i, c) in "4006381333931".chars().enumerate() {
///     assert!(segmenter.feed(Token::char(c, t0 + Duration::from_millis(i as u64 * 5))).is_none());
/// }
///
/// let scan = segmenter
///     .feed(Token::terminator(t0 + Duration::from_millis(70)))
///     .unwrap();
/// assert_eq!(scan.code, "4006381333931");
/// assert!(segmenter.pending_timer().is_none());
/// ```
#[derive(Debug)]
pub struct ScanSegmenter {
    config: SegmenterConfig,
    buffer: ScanBuffer,
    pending: Option<TimerHandle>,
    next_generation: u64,
}

impl ScanSegmenter {
    /// Creates a segmenter with an empty buffer and no pending timer.
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            buffer: ScanBuffer::default(),
            pending: None,
            next_generation: 0,
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn buffer(&self) -> &ScanBuffer {
        &self.buffer
    }

    /// The currently armed idle timer, if any
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// When the driver next needs to call `poll`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|timer| timer.deadline)
    }

    /// Processes one token.
    ///
    /// Returns the completed scan, if this token (or an overdue idle timer
    /// that it reveals) finalised one. At most one scan can complete per
    /// token: an overdue timer empties the buffer, so a terminator that
    /// follows it finds nothing to emit.
    pub fn feed(&mut self, token: Token) -> Option<ScanCompleted> {
        let overdue = self.poll(token.occurred_at);

        let completed = match token.symbol {
            Symbol::Char(c) => {
                self.accept_char(c, token.occurred_at);
                None
            }
            Symbol::Terminator => self.finalize(token.occurred_at, CompletionTrigger::Terminator),
        };

        overdue.or(completed)
    }

    /// Fires the pending idle timer if its deadline is at or before `now`.
    pub fn poll(&mut self, now: Instant) -> Option<ScanCompleted> {
        match self.pending {
            Some(timer) if timer.deadline <= now => self.fire_timer(timer),
            _ => None,
        }
    }

    /// Fires a specific idle timer.
    ///
    /// Does nothing unless `handle` is the timer currently pending; a
    /// handle from an earlier arming is stale and must not finalise the
    /// newer buffer.
    pub fn fire_timer(&mut self, handle: TimerHandle) -> Option<ScanCompleted> {
        if self.pending != Some(handle) {
            tracing::trace!(generation = handle.generation, "ignoring stale idle timer");
            return None;
        }

        self.finalize(handle.deadline, CompletionTrigger::IdleTimeout)
    }

    /// Completes whatever is buffered right now, as if the idle window had
    /// elapsed. Used when the input source closes.
    pub fn flush(&mut self, now: Instant) -> Option<ScanCompleted> {
        if self.pending.is_none() && self.buffer.is_empty() {
            return None;
        }
        self.finalize(now, CompletionTrigger::IdleTimeout)
    }

    /// Discards the buffer and any pending timer without emitting.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending = None;
    }

    fn accept_char(&mut self, c: char, at: Instant) {
        if let Some(last) = self.buffer.last_token_at() {
            if at.saturating_duration_since(last) > self.config.inter_char_gap {
                tracing::trace!(
                    discarded = self.buffer.as_str(),
                    "idle gap exceeded, starting a new burst"
                );
                self.reset();
            }
        }

        self.buffer.push(c, at);
        self.arm(at);
    }

    /// Replaces any pending timer with a fresh one.
    fn arm(&mut self, from: Instant) {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        self.pending = Some(TimerHandle {
            generation,
            deadline: from + self.config.idle_completion,
        });
    }

    /// Clears the buffer and cancels the timer, emitting if anything
    /// non-whitespace was buffered.
    fn finalize(&mut self, at: Instant, trigger: CompletionTrigger) -> Option<ScanCompleted> {
        self.pending = None;
        let raw = self.buffer.take();
        let code = raw.trim();

        if code.is_empty() {
            if !raw.is_empty() {
                tracing::trace!(%trigger, "dropping whitespace-only burst");
            }
            return None;
        }

        tracing::debug!(code, %trigger, "scan completed");

        Some(ScanCompleted {
            code: code.to_string(),
            observed_at: at,
            trigger,
        })
    }
}

impl Default for ScanSegmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}
