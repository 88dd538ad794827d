use std::time::Instant;

use crate::core::{KeyNormalizer, RawKeyEvent, Symbol};

#[test]
fn test_printable_characters_become_tokens() {
    let normalizer = KeyNormalizer::default();
    let now = Instant::now();

    for key in ["0", "9", "A", "z", "-", " ", "é"] {
        let token = normalizer.normalize(&RawKeyEvent::new(key, now));
        let expected = key.chars().next().unwrap();

        assert_eq!(
            token.map(|t| t.symbol),
            Some(Symbol::Char(expected)),
            "'{}' should map to a character token",
            key
        );
    }
}

#[test]
fn test_enter_by_name_is_terminator() {
    let normalizer = KeyNormalizer::default();
    let now = Instant::now();

    let token = normalizer.normalize(&RawKeyEvent::new("Enter", now)).unwrap();
    assert_eq!(token.symbol, Symbol::Terminator);
    assert_eq!(token.occurred_at, now);
}

#[test]
fn test_terminator_name_is_case_insensitive() {
    let normalizer = KeyNormalizer::default();

    let token = normalizer.normalize(&RawKeyEvent::new("ENTER", Instant::now()));
    assert_eq!(token.map(|t| t.symbol), Some(Symbol::Terminator));
}

#[test]
fn test_enter_by_key_code_is_terminator() {
    let normalizer = KeyNormalizer::default();

    // Some devices report an odd key name but the legacy code 13
    let token = normalizer.normalize(&RawKeyEvent::with_code("Unidentified", 13, Instant::now()));
    assert_eq!(token.map(|t| t.symbol), Some(Symbol::Terminator));
}

#[test]
fn test_non_printable_keys_are_ignored() {
    let normalizer = KeyNormalizer::default();
    let now = Instant::now();

    for key in ["Shift", "Control", "Alt", "F1", "ArrowLeft", "Tab", "Backspace", "", "\u{7}"] {
        assert!(
            normalizer.normalize(&RawKeyEvent::new(key, now)).is_none(),
            "'{}' should be ignored",
            key.escape_debug()
        );
    }
}

#[test]
fn test_custom_terminator_vocabulary() {
    let normalizer = KeyNormalizer::new(vec!["Tab".to_string()], vec![9]);
    let now = Instant::now();

    assert_eq!(
        normalizer.normalize(&RawKeyEvent::new("Tab", now)).map(|t| t.symbol),
        Some(Symbol::Terminator)
    );
    assert_eq!(
        normalizer.normalize(&RawKeyEvent::with_code("x", 9, now)).map(|t| t.symbol),
        Some(Symbol::Terminator)
    );

    // Enter is no longer special, and as a named key it is ignored
    assert!(normalizer.normalize(&RawKeyEvent::new("Enter", now)).is_none());
}

#[test]
fn test_normalizer_is_stateless() {
    let normalizer = KeyNormalizer::default();
    let before = normalizer.clone();
    let now = Instant::now();

    let _ = normalizer.normalize(&RawKeyEvent::new("a", now));
    let _ = normalizer.normalize(&RawKeyEvent::new("Enter", now));

    assert_eq!(normalizer, before);
}
