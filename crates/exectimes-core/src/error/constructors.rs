//! Constructor methods for SlotError

use super::types::SlotError;
use nix::errno::Errno;
use std::path::Path;

impl SlotError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            source,
        }
    }

    /// Create an I/O error tied to a path
    pub fn io_with_path(
        message: impl Into<String>,
        path: &Path,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.display().to_string()),
            source,
        }
    }

    /// Create a lock error
    pub fn lock(message: impl Into<String>, source: Errno) -> Self {
        Self::Lock {
            message: message.into(),
            offset: None,
            source,
        }
    }

    /// Create a lock error for a specific byte offset
    pub fn lock_at(message: impl Into<String>, offset: u64, source: Errno) -> Self {
        Self::Lock {
            message: message.into(),
            offset: Some(offset),
            source,
        }
    }

    /// Create an exec error
    pub fn exec(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Exec {
            program: program.into(),
            source,
        }
    }
}
