use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a device profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Profile file does not exist.
    #[error("Profile not found: {0}")]
    NotFound(PathBuf),
    /// Profile file is not valid JSON or has the wrong shape.
    #[error("Failed to parse profile {path}: {message}")]
    Parse { path: PathBuf, message: String },
    /// Profile parsed but its values cannot be used.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
    /// Path contains an unexpandable variable or invalid encoding.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
