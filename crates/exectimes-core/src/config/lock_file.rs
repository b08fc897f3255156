//! Lock file location and creation settings

use std::path::{Path, PathBuf};

/// Permission bits for a newly created lock file, applied under a zero
/// creation mask so every cooperating user can open it.
pub const DEFAULT_CREATE_MODE: u32 = 0o666;

/// Where the slot store lives and how it is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockFileConfig {
    /// Path of the shared lock file
    pub path: PathBuf,
    /// Mode used when the file does not exist yet
    pub create_mode: u32,
}

impl LockFileConfig {
    /// Config for `path` with the default creation mode
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_mode: DEFAULT_CREATE_MODE,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
