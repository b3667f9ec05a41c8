//! Error types for treediff

use std::path::PathBuf;
use thiserror::Error;

/// Error types for treediff operations
#[derive(Debug, Error)]
pub enum DiffError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A top-level source or destination directory could not be listed
    #[error("Root directory unavailable: {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory below the roots could not be listed
    #[error("Directory unavailable: {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Attributes of a common file could not be read
    #[error("Metadata unavailable: {path}: {source}")]
    MetadataUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content read failed while hashing a file for confirmation
    #[error("Hash failure ({label}): {source}")]
    HashFailure {
        label: String,
        #[source]
        source: std::io::Error,
    },

    /// A spawned comparison task panicked or was aborted
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The run did not finish within the configured time
    #[error("Comparison timed out after {0} seconds")]
    TimedOut(u64),
}

impl DiffError {
    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, DiffError::Config(_))
    }

    /// Wrap a directory listing failure
    pub fn directory_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiffError::DirectoryUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Promote a listing failure to [`DiffError::RootUnavailable`]
    ///
    /// Used on the outermost directory pair, where a listing failure ends
    /// the run instead of being recorded as an errored entry.
    pub fn at_root(self) -> Self {
        match self {
            DiffError::DirectoryUnavailable { path, source } => {
                DiffError::RootUnavailable { path, source }
            }
            other => other,
        }
    }
}
