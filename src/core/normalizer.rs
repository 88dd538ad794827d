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

//! Key event normalisation
//!
//! Turns raw key events into segmentation tokens. The rules are:
//! - A recognised terminator key (by name or numeric code) becomes `Symbol::Terminator`
//! - A key whose printable representation is exactly one character becomes `Symbol::Char`
//! - Everything else (modifiers, function keys, navigation keys) is ignored
//!
//! Ignored events never reach the segmenter, so they cannot disturb its
//! inter-character timing.

use crate::core::types::{RawKeyEvent, Token};

/// Key name sent by wedge scanners at the end of a code
pub const DEFAULT_TERMINATOR_KEY: &str = "Enter";

/// Legacy numeric code for the Enter key
pub const DEFAULT_TERMINATOR_KEY_CODE: u32 = 13;

/// Stateless mapper from raw key events to tokens
///
/// Holds only the terminator vocabulary. Calling `normalize` never changes
/// the normaliser, so one instance can be shared for the whole session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyNormalizer {
    terminator_keys: Vec<String>,
    terminator_key_codes: Vec<u32>,
}

impl KeyNormalizer {
    /// Creates a normaliser with a custom terminator vocabulary.
    ///
    /// Key names are compared case-insensitively ("enter" == "Enter").
    pub fn new(terminator_keys: Vec<String>, terminator_key_codes: Vec<u32>) -> Self {
        Self {
            terminator_keys,
            terminator_key_codes,
        }
    }

    /// Maps a raw key event to a token, or `None` if the event is ignored.
    ///
    /// # Example
    /// ```
    /// use std::time::Instant;
    /// use wedge_scan::core::{KeyNormalizer, RawKeyEvent, Symbol};
    ///
    /// let normalizer = KeyNormalizer::default();
    /// let now = Instant::now();
    ///
    /// let token = normalizer.normalize(&RawKeyEvent::new("7", now)).unwrap();
    /// assert_eq!(token.symbol, Symbol::Char('7'));
    ///
    /// assert!(normalizer.normalize(&RawKeyEvent::new("Shift", now)).is_none());
    /// ```
    pub fn normalize(&self, event: &RawKeyEvent) -> Option<Token> {
        if self.is_terminator(event) {
            return Some(Token::terminator(event.at));
        }

        let mut chars = event.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(Token::char(c, event.at)),
            _ => None,
        }
    }

    /// Returns true if the event is one of the configured terminator keys.
    pub fn is_terminator(&self, event: &RawKeyEvent) -> bool {
        if let Some(code) = event.key_code {
            if self.terminator_key_codes.contains(&code) {
                return true;
            }
        }

        self.terminator_keys
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&event.key))
    }
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(
            vec![DEFAULT_TERMINATOR_KEY.to_string()],
            vec![DEFAULT_TERMINATOR_KEY_CODE],
        )
    }
}
