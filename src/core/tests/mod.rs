//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Key normalisation tests
//! - Segmentation state machine tests (timing rules, timers, ordering)
//! - Type tests (Token, Symbol, ScanCompleted display)

#[cfg(test)]
mod normalizer_tests;
