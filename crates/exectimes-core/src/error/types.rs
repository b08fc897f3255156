//! Core error types

use nix::errno::Errno;
use std::path::Path;
use thiserror::Error;

/// Result type alias for slot store operations
pub type SlotResult<T> = Result<T, SlotError>;

/// Main error type for exectimes
#[derive(Error, Debug)]
pub enum SlotError {
    /// Wrong number or shape of arguments
    #[error("{message}")]
    Usage { message: String },

    /// Lock file I/O failure
    #[error("{message}: {source}")]
    Io {
        message: String,
        path: Option<String>,
        #[source]
        source: std::io::Error,
    },

    /// Record lock failure
    #[error("{message}: {source}")]
    Lock {
        message: String,
        offset: Option<u64>,
        #[source]
        source: Errno,
    },

    /// Process image replacement failure
    #[error("exec failed: {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl SlotError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "EXECTIMES_USAGE",
            Self::Io { .. } => "EXECTIMES_IO",
            Self::Lock { .. } => "EXECTIMES_LOCK",
            Self::Exec { .. } => "EXECTIMES_EXEC",
        }
    }
}

/// Extension trait for attaching lock file context to I/O results
pub trait IoResultExt<T> {
    /// Wrap an I/O error with a message and the path it concerns
    fn with_path(self, message: &str, path: &Path) -> SlotResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, message: &str, path: &Path) -> SlotResult<T> {
        self.map_err(|e| SlotError::io_with_path(message, path, e))
    }
}
