//! Helpers for tests that need locks held by another process

use crate::config::LockFileConfig;
use crate::slot_store::{ByteRange, SlotOffset, SlotStore, lock};
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, Pid, fork, pipe};
use std::fs::File;
use std::io::{Read, Write};

/// A forked child holding exclusive locks until dropped
pub struct Holder {
    pid: Pid,
    release: File,
}

impl Holder {
    /// Fork a child that locks `slots` in the store at `config` and waits
    pub fn spawn(config: &LockFileConfig, slots: &[SlotOffset]) -> Self {
        let ranges: Vec<ByteRange> = slots
            .iter()
            .map(|slot| ByteRange::byte(slot.position()))
            .collect();
        Self::lock_ranges(config, &ranges)
    }

    /// Fork a child that locks `ranges` in the store at `config` and waits.
    ///
    /// Returns once the child reports its locks are in place.
    pub fn lock_ranges(config: &LockFileConfig, ranges: &[ByteRange]) -> Self {
        let store = SlotStore::open_or_create(config).expect("open store for holder");
        let fd = store.fd();

        let (ready_rx, ready_tx) = pipe().expect("ready pipe");
        let (release_rx, release_tx) = pipe().expect("release pipe");
        let mut ready_rx = File::from(ready_rx);
        let mut ready_tx = File::from(ready_tx);
        let mut release_rx = File::from(release_rx);

        // SAFETY: the child only locks, reads and writes pipes, and leaves
        // through _exit without allocating or unwinding.
        match unsafe { fork() }.expect("fork holder") {
            ForkResult::Child => {
                drop(release_tx);
                let locked = ranges
                    .iter()
                    .all(|range| lock::lock_exclusive(fd, *range).is_ok());
                let _ = ready_tx.write_all(&[u8::from(!locked)]);
                let mut byte = [0u8; 1];
                let _ = release_rx.read(&mut byte);
                // SAFETY: skips destructors and atexit handlers of the
                // test harness copied into this child.
                unsafe { libc::_exit(0) }
            }
            ForkResult::Parent { child } => {
                drop(ready_tx);
                drop(release_rx);
                let mut status = [1u8; 1];
                ready_rx.read_exact(&mut status).expect("holder status");
                assert_eq!(status[0], 0, "holder could not lock its ranges");
                drop(store);

                Self {
                    pid: child,
                    release: File::from(release_tx),
                }
            }
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }
}

impl Drop for Holder {
    fn drop(&mut self) {
        // A byte rather than EOF: other tests' children may have inherited
        // a copy of the write end.
        let _ = self.release.write_all(&[1]);
        let _ = waitpid(self.pid, None);
    }
}
