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

//! src/core/mod.rs
//!
//! Core segmentation logic
//!
//! This module contains the data structures and algorithms that turn an
//! unframed keystroke stream into discrete scans:
//! - Type definitions for key events, tokens and completed scans
//! - Key normalisation (printable characters and terminator detection)
//! - The segmentation state machine (idle-gap reset, terminator, idle timeout)
//!
//! Nothing here touches a terminal, a clock or the filesystem, which keeps
//! every timing rule testable with synthetic timestamps.

pub mod normalizer;
pub mod segmenter;
pub mod types;

pub use normalizer::KeyNormalizer;
pub use segmenter::{ScanBuffer, ScanSegmenter, SegmenterConfig, TimerHandle};
pub use types::*;

#[cfg(test)]
mod tests;
