//! Dispatch tests
//!
//! End-to-end flow from raw key events to history, observers and tone.
