//! Error types for tagsync-core

use std::path::PathBuf;

/// Result type for tagsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run.
///
/// Problems inside scanned files are not errors at this level; they are
/// reported as [`tagsync_tags::ErrorDetails`] attached to the file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Migration mappings failed validation
    #[error("Invalid migration mapping for '{from}': {reason}")]
    InvalidMigration { from: String, reason: String },

    /// A configuration value failed validation
    #[error("Invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// The output sink was driven out of order
    #[error("Output sink misuse: {message}")]
    SinkMisuse { message: String },

    /// A persisted cache could not be read or written
    #[error("Cache file {path} is unusable: {message}")]
    CachePersist { path: PathBuf, message: String },

    /// Fixes no longer match the file they were generated for
    #[error("{path} changed since it was parsed: {applied} of {expected} fixes matched")]
    StaleFixes {
        path: PathBuf,
        expected: usize,
        applied: usize,
    },

    /// File enumeration failed
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// Filesystem error from tagsync-fs
    #[error(transparent)]
    Fs(#[from] tagsync_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn sink_misuse(message: impl Into<String>) -> Self {
        Self::SinkMisuse {
            message: message.into(),
        }
    }
}
