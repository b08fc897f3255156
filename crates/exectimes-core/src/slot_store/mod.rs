//! The slot store: one shared file whose header records the highest slot
//! ever used and whose slot bytes are occupied by holding record locks.
//!
//! All mutation happens while the header lock is held. The only exception
//! is the holder's own slot lock, which outlives the header lock and lasts
//! exactly as long as the descriptor stays open.

mod header;
pub(crate) mod lock;

pub use header::{HEADER_WIDTH, SlotOffset};
pub use lock::{ByteRange, LockState};

use crate::config::LockFileConfig;
use crate::error::{IoResultExt, SlotError, SlotResult};
use std::fs::{File, OpenOptions, Permissions};
use std::io::ErrorKind;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::{FileExt, OpenOptionsExt, PermissionsExt};
use std::path::PathBuf;

pub(crate) const HEADER_RANGE: ByteRange = ByteRange::new(0, HEADER_WIDTH as u64);

/// An open handle on the shared lock file
#[derive(Debug)]
pub struct SlotStore {
    file: File,
    path: PathBuf,
    header_locked: bool,
}

impl SlotStore {
    /// Open the lock file for reading and writing, creating it if absent.
    ///
    /// A new file ends up with exactly `config.create_mode`, whatever the
    /// creation mask, so every cooperating user can open it later.
    pub fn open_or_create(config: &LockFileConfig) -> SlotResult<Self> {
        let path = config.path().to_path_buf();
        let created = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .mode(config.create_mode)
            .open(&path);

        let file = match created {
            Ok(file) => {
                file.set_permissions(Permissions::from_mode(config.create_mode))
                    .with_path("Failed to set lock file permissions", &path)?;
                tracing::debug!(path = %path.display(), "created slot store");
                file
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => OpenOptions::new()
                .read(true)
                .write(true)
                .open(&path)
                .with_path("Failed to open file", &path)?,
            Err(e) => return Err(SlotError::io_with_path("Failed to open file", &path, e)),
        };

        tracing::debug!(path = %path.display(), "opened slot store");
        Ok(Self {
            file,
            path,
            header_locked: false,
        })
    }

    /// Whether this handle currently holds the header lock
    #[cfg(test)]
    pub(crate) fn holds_header(&self) -> bool {
        self.header_locked
    }

    pub(crate) fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Take the header lock, waiting for any other process holding it
    pub fn lock_header_blocking(&mut self) -> SlotResult<()> {
        lock::lock_exclusive_wait(self.fd(), HEADER_RANGE)
            .map_err(|errno| SlotError::lock("Failed to lock file", errno))?;
        self.header_locked = true;
        tracing::debug!(path = %self.path.display(), "header lock acquired");
        Ok(())
    }

    /// Read the highest slot offset ever used.
    ///
    /// A new or truncated file yields [`SlotOffset::FIRST`].
    pub fn read_header(&self) -> SlotResult<SlotOffset> {
        let mut bytes = [0u8; HEADER_WIDTH];
        match self.file.read_exact_at(&mut bytes, 0) {
            Ok(()) => {
                let max_idx = header::decode(bytes);
                tracing::debug!(max_idx = max_idx.get(), "read header");
                Ok(max_idx)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                tracing::debug!("header missing or short, store is empty");
                Ok(SlotOffset::FIRST)
            }
            Err(e) => Err(SlotError::io_with_path("Failed to read file", &self.path, e)),
        }
    }

    /// Persist a new highest slot offset
    pub fn write_header(&mut self, max_idx: SlotOffset) -> SlotResult<()> {
        self.file
            .write_all_at(&header::encode(max_idx), 0)
            .with_path("Failed to write file", &self.path)?;
        tracing::debug!(max_idx = max_idx.get(), "wrote header");
        Ok(())
    }

    /// Check, without acquiring anything, whether another process holds `offset`
    pub fn probe_slot(&self, offset: SlotOffset) -> SlotResult<LockState> {
        let state = lock::query_exclusive(self.fd(), ByteRange::byte(offset.position()))
            .map_err(|errno| SlotError::lock_at("fcntl failure", offset.position(), errno))?;
        tracing::trace!(slot = offset.index(), ?state, "probed slot");
        Ok(state)
    }

    /// Lock the byte at `offset` for this process.
    ///
    /// The caller has checked under the header lock that it is free, so a
    /// conflict here means something outside the protocol touched the file.
    pub fn claim_slot(&mut self, offset: SlotOffset) -> SlotResult<()> {
        lock::lock_exclusive(self.fd(), ByteRange::byte(offset.position())).map_err(|errno| {
            SlotError::lock_at(
                "Failed to lock previously determined free byte in file",
                offset.position(),
                errno,
            )
        })?;
        tracing::debug!(slot = offset.index(), "claimed slot");
        Ok(())
    }

    /// Release the header lock; a no-op if it is not held
    pub fn unlock_header(&mut self) -> SlotResult<()> {
        if !self.header_locked {
            return Ok(());
        }
        lock::unlock(self.fd(), HEADER_RANGE)
            .map_err(|errno| SlotError::lock("Failed to release lock on file", errno))?;
        self.header_locked = false;
        tracing::debug!(path = %self.path.display(), "header lock released");
        Ok(())
    }

    /// Let the descriptor, and the slot lock riding on it, survive `exec`
    pub fn prepare_hand_off(&self) -> SlotResult<()> {
        lock::clear_close_on_exec(self.fd())
            .map_err(|errno| SlotError::lock("Failed to keep lock file open across exec", errno))
    }
}
