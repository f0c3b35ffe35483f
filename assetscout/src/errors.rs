//! Error types for the assetscout engine.
//!
//! Most failures inside a search session are deliberately *not* errors from the
//! caller's point of view: unreadable directories, files that vanish between
//! enumeration and mapping, and files outside the size window are all skipped
//! silently. The variants below cover what remains: patterns that do not
//! compile, configuration that does not validate, and the I/O failures the
//! file matcher classifies before discarding them.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while configuring or running a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn invalid_pattern(diagnostic: impl Into<String>) -> Self {
        Self::InvalidPattern(diagnostic.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}
