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

//! Snapshot storage backends
//!
//! The history store saves one named blob plus the floor of its sequence
//! counter, so ids stay unique even after the records are cleared. This
//! module defines that contract and provides two backends:
//! - `FileStorage`: one JSON file per key, written atomically
//! - `MemoryStorage`: an in-process blob with an optional quota, for tests
//!   and for sessions that should not touch the disk

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::history::error::StorageError;

/// Fixed identifier of the history blob
pub const HISTORY_KEY: &str = "scannerHistory";

/// Timestamp suffix used when setting aside an unreadable snapshot
const QUARANTINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Blob storage for history snapshots
pub trait SnapshotStorage {
    /// Replaces the stored blob.
    fn save(&mut self, blob: &str) -> Result<(), StorageError>;

    /// Returns the stored blob, or `None` if nothing has been saved.
    ///
    /// Content that exists but cannot be read as text is reported as
    /// `StorageError::Unreadable`.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Records the lowest sequence id the next session may issue.
    fn save_sequence_floor(&mut self, next: u64) -> Result<(), StorageError>;

    /// Returns the recorded sequence floor, if any.
    fn load_sequence_floor(&self) -> Result<Option<u64>, StorageError>;

    /// Moves an unreadable blob out of the way so the next `save` does not
    /// overwrite it. Returns where it went, if the backend keeps it.
    fn quarantine(&mut self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for Box<S> {
    fn save(&mut self, blob: &str) -> Result<(), StorageError> {
        (**self).save(blob)
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save_sequence_floor(&mut self, next: u64) -> Result<(), StorageError> {
        (**self).save_sequence_floor(next)
    }

    fn load_sequence_floor(&self) -> Result<Option<u64>, StorageError> {
        (**self).load_sequence_floor()
    }

    fn quarantine(&mut self) -> Result<Option<PathBuf>, StorageError> {
        (**self).quarantine()
    }
}

/// Stores the snapshot as `<dir>/<key>.json` and the sequence floor as
/// `<dir>/<key>.seq`
///
/// Writes go through a temporary file and an atomic rename, so a crash
/// mid-write leaves the previous snapshot intact.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
    key: String,
}

impl FileStorage {
    /// Storage for the default history key inside `dir`.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_key(dir, HISTORY_KEY)
    }

    pub fn with_key(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            dir: dir.into(),
            key: key.to_string(),
        }
    }

    /// Full path of the snapshot file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    /// Full path of the sequence floor file
    pub fn sequence_path(&self) -> PathBuf {
        self.dir.join(format!("{}.seq", self.key))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|_| StorageError::DirNotWritable(self.dir.clone()))?;
        }
        Ok(())
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let mut file = AtomicWriteFile::options()
            .open(path)
            .map_err(|e| Self::write_error("Failed to open for atomic write", e))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Self::write_error("Failed to write snapshot", e))?;

        file.commit()
            .map_err(|e| Self::write_error("Failed to commit atomic write", e))?;

        Ok(())
    }

    fn write_error(context: &str, e: io::Error) -> StorageError {
        if e.kind() == io::ErrorKind::StorageFull {
            StorageError::QuotaExceeded
        } else {
            StorageError::WriteFailed(format!("{}: {}", context, e))
        }
    }
}

impl SnapshotStorage for FileStorage {
    fn save(&mut self, blob: &str) -> Result<(), StorageError> {
        self.write_atomic(&self.path(), blob)
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        read_optional(&self.path())
    }

    fn save_sequence_floor(&mut self, next: u64) -> Result<(), StorageError> {
        self.write_atomic(&self.sequence_path(), &next.to_string())
    }

    fn load_sequence_floor(&self) -> Result<Option<u64>, StorageError> {
        let Some(content) = read_optional(&self.sequence_path())? else {
            return Ok(None);
        };

        content
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| StorageError::Unreadable(format!("sequence floor {:?}: {}", content, e)))
    }

    fn quarantine(&mut self) -> Result<Option<PathBuf>, StorageError> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let timestamp = Local::now().format(QUARANTINE_TIMESTAMP_FORMAT);
        let base = format!("{}.json.corrupt.{}", self.key, timestamp);

        // Two quarantines within the same second must not collide
        let mut target = self.dir.join(&base);
        let mut n = 1;
        while target.exists() {
            target = self.dir.join(format!("{}-{}", base, n));
            n += 1;
        }

        fs::rename(&path, &target)?;
        Ok(Some(target))
    }
}

/// Reads a whole file; a missing file is `None`.
fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(StorageError::Unreadable(
            format!("{}: {}", path.display(), e),
        )),
        Err(e) => Err(StorageError::Io(e)),
    }
}

/// Keeps the blob in memory
///
/// An optional quota (in bytes) makes `save` fail the way a full browser
/// storage area or disk would.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    blob: Option<String>,
    sequence_floor: Option<u64>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with a blob, as if saved by an earlier session.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            ..Self::default()
        }
    }

    /// Rejects any blob larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Currently stored blob
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Currently stored sequence floor
    pub fn sequence_floor(&self) -> Option<u64> {
        self.sequence_floor
    }
}

impl SnapshotStorage for MemoryStorage {
    fn save(&mut self, blob: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if blob.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        self.blob = Some(blob.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.blob.clone())
    }

    fn save_sequence_floor(&mut self, next: u64) -> Result<(), StorageError> {
        self.sequence_floor = Some(next);
        Ok(())
    }

    fn load_sequence_floor(&self) -> Result<Option<u64>, StorageError> {
        Ok(self.sequence_floor)
    }

    fn quarantine(&mut self) -> Result<Option<PathBuf>, StorageError> {
        self.blob = None;
        Ok(None)
    }
}
