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

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a snapshot storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is full or refuses further writes.
    #[error("Storage quota exceeded")]
    QuotaExceeded,
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Stored content exists but cannot be read back.
    #[error("Stored content unreadable: {0}")]
    Unreadable(String),
    /// Storage directory cannot be created or written to.
    #[error("Storage directory not writable: {0}")]
    DirNotWritable(PathBuf),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while persisting or restoring scan history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Stored snapshot could not be parsed as a scan history.
    #[error("Malformed history snapshot: {0}")]
    MalformedSnapshot(String),
    /// History could not be serialised.
    #[error("Failed to serialise history: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
