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

//! Input surfaces
//!
//! Two ways for key events to reach the dispatcher:
//! - `capture`: live key presses from the terminal (the scanner types into it)
//! - `replay`: a recorded key script with millisecond offsets, for
//!   reproducing field captures without a device
//!
//! Key names follow the browser `KeyboardEvent.key` vocabulary ("Enter",
//! "Tab", "ArrowLeft", "Shift", ...), so device profiles read the same
//! whichever surface produced the events.

pub mod capture;
pub mod replay;

pub use capture::KeyboardCapture;
pub use replay::{load_script, replay, RecordedKey, ReplayError};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use std::time::Instant;

use crate::core::RawKeyEvent;

impl RawKeyEvent {
    /// Converts a crossterm key event observed at `at`.
    ///
    /// Returns `None` for key releases and repeats; only presses are
    /// keystrokes.
    pub fn from_crossterm(event: KeyEvent, at: Instant) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        let converted = match event.code {
            KeyCode::Char(c) => RawKeyEvent::new(c.to_string(), at),
            KeyCode::Enter => RawKeyEvent::with_code("Enter", 13, at),
            KeyCode::Tab => RawKeyEvent::with_code("Tab", 9, at),
            KeyCode::Backspace => RawKeyEvent::with_code("Backspace", 8, at),
            KeyCode::Esc => RawKeyEvent::with_code("Escape", 27, at),
            other => RawKeyEvent::new(key_name(other), at),
        };

        Some(converted)
    }
}

/// Browser-style name for a non-character key
fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Modifier(modifier) => modifier_name(modifier).to_string(),
        other => format!("{:?}", other),
    }
}

fn modifier_name(modifier: ModifierKeyCode) -> &'static str {
    match modifier {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "Shift",
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "Control",
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "Alt",
        ModifierKeyCode::LeftSuper | ModifierKeyCode::RightSuper => "Meta",
        _ => "Modifier",
    }
}

/// Ctrl+C or Esc ends an interactive session
pub fn is_quit_key(event: &KeyEvent) -> bool {
    match event.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('C') => event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{KeyNormalizer, Symbol};
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_character_keys_convert() {
        let now = Instant::now();
        let event = RawKeyEvent::from_crossterm(press(KeyCode::Char('7')), now).unwrap();

        assert_eq!(event.key, "7");
        assert_eq!(event.key_code, None);
        assert_eq!(event.at, now);
    }

    #[test]
    fn test_enter_carries_key_code() {
        let event = RawKeyEvent::from_crossterm(press(KeyCode::Enter), Instant::now()).unwrap();

        assert_eq!(event.key, "Enter");
        assert_eq!(event.key_code, Some(13));
    }

    #[test]
    fn test_releases_are_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };

        assert!(RawKeyEvent::from_crossterm(release, Instant::now()).is_none());
    }

    #[test]
    fn test_named_keys_are_ignored_by_normalizer() {
        let normalizer = KeyNormalizer::default();
        let now = Instant::now();

        for code in [
            KeyCode::Left,
            KeyCode::F(5),
            KeyCode::Tab,
            KeyCode::Backspace,
            KeyCode::Modifier(ModifierKeyCode::LeftShift),
        ] {
            let event = RawKeyEvent::from_crossterm(press(code), now).unwrap();
            assert!(
                normalizer.normalize(&event).is_none(),
                "{:?} should not produce a token",
                code
            );
        }

        let enter = RawKeyEvent::from_crossterm(press(KeyCode::Enter), now).unwrap();
        assert_eq!(normalizer.normalize(&enter).map(|t| t.symbol), Some(Symbol::Terminator));
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(KeyCode::F(12)), "F12");
        assert_eq!(key_name(KeyCode::Up), "ArrowUp");
        assert_eq!(key_name(KeyCode::Modifier(ModifierKeyCode::RightControl)), "Control");
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&press(KeyCode::Esc)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&press(KeyCode::Char('c'))));
        assert!(!is_quit_key(&press(KeyCode::Enter)));
    }
}
