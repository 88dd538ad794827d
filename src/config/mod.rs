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

//! Device profiles and path handling
//!
//! Scanners differ in how fast they type and which key (if any) they send
//! at the end of a code. A device profile captures those differences:
//!
//! ```json
//! {
//!   "name": "Urovo DT50",
//!   "inter_char_gap_ms": 100,
//!   "idle_completion_ms": 200,
//!   "terminator_keys": ["Enter"],
//!   "terminator_key_codes": [13]
//! }
//! ```
//!
//! Every field is optional; `{}` gives the defaults above.
//!
//! # Example
//!
//! ```no_run
//! use wedge_scan::config::DeviceProfile;
//!
//! let profile = DeviceProfile::load("~/.config/wedge-scan/dt50.json")?;
//! let segmenter_config = profile.segmenter_config();
//! let normalizer = profile.normalizer();
//! # Ok::<(), wedge_scan::config::ConfigError>(())
//! ```

mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::{
    normalizer::{DEFAULT_TERMINATOR_KEY, DEFAULT_TERMINATOR_KEY_CODE},
    segmenter::{DEFAULT_IDLE_COMPLETION, DEFAULT_INTER_CHAR_GAP},
    KeyNormalizer, SegmenterConfig,
};

/// Where the scan history lives unless told otherwise
pub const DEFAULT_HISTORY_DIR: &str = "~/.local/share/wedge-scan";

/// Timing and terminator settings for one scanner model
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Human-readable label for logs
    pub name: String,

    /// Pause (ms) after which a new character starts a new burst
    pub inter_char_gap_ms: u64,

    /// Silence (ms) after which an unterminated burst is complete
    pub idle_completion_ms: u64,

    /// Key names treated as end-of-scan
    pub terminator_keys: Vec<String>,

    /// Legacy numeric key codes treated as end-of-scan
    pub terminator_key_codes: Vec<u32>,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            inter_char_gap_ms: DEFAULT_INTER_CHAR_GAP.as_millis() as u64,
            idle_completion_ms: DEFAULT_IDLE_COMPLETION.as_millis() as u64,
            terminator_keys: vec![DEFAULT_TERMINATOR_KEY.to_string()],
            terminator_key_codes: vec![DEFAULT_TERMINATOR_KEY_CODE],
        }
    }
}

impl DeviceProfile {
    /// Reads and validates a profile from a JSON file.
    ///
    /// A leading `~` in the path is expanded to the home directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if it isn't a valid profile, and
    /// `ConfigError::InvalidProfile` if its values are unusable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_path(path.as_ref())?;

        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let content = fs::read_to_string(&path)?;
        let profile = Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.clone(),
                message,
            },
            other => other,
        })?;

        tracing::info!(
            profile = %profile.name,
            gap_ms = profile.inter_char_gap_ms,
            idle_ms = profile.idle_completion_ms,
            "loaded device profile"
        );
        Ok(profile)
    }

    /// Parses and validates a profile from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let profile: Self = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;

        profile.validate()?;
        Ok(profile)
    }

    /// Checks that the thresholds are usable and a terminator exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inter_char_gap_ms == 0 {
            return Err(ConfigError::InvalidProfile(
                "inter_char_gap_ms must be greater than zero".to_string(),
            ));
        }

        if self.idle_completion_ms == 0 {
            return Err(ConfigError::InvalidProfile(
                "idle_completion_ms must be greater than zero".to_string(),
            ));
        }

        if self.terminator_keys.iter().all(|k| k.trim().is_empty())
            && self.terminator_key_codes.is_empty()
        {
            return Err(ConfigError::InvalidProfile(
                "at least one terminator key or key code is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Segmentation thresholds for this device
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            inter_char_gap: Duration::from_millis(self.inter_char_gap_ms),
            idle_completion: Duration::from_millis(self.idle_completion_ms),
        }
    }

    /// Key normaliser recognising this device's terminators
    pub fn normalizer(&self) -> KeyNormalizer {
        let keys = self
            .terminator_keys
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        KeyNormalizer::new(keys, self.terminator_key_codes.clone())
    }
}

/// Expands `~` and environment variables in a path.
pub fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path
        .to_str()
        .ok_or_else(|| ConfigError::InvalidPath("Invalid path encoding".to_string()))?;

    let expanded =
        shellexpand::full(raw).map_err(|e| ConfigError::InvalidPath(e.to_string()))?;

    Ok(PathBuf::from(expanded.as_ref()))
}
