//! POSIX record-lock primitives over byte ranges of an open file
//!
//! Record locks belong to the process, not the descriptor: they are
//! released when the process exits or closes any descriptor for the file,
//! and they survive `exec` as long as the descriptor stays open.

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use std::os::fd::RawFd;

/// A byte range within the lock file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub len: u64,
}

impl ByteRange {
    pub const fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }

    /// A single byte at `offset`
    pub const fn byte(offset: u64) -> Self {
        Self::new(offset, 1)
    }
}

/// Result of a lock query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Nobody else holds a conflicting lock
    Free,
    /// Another process holds an exclusive lock
    Held { pid: i32 },
}

/// Build a `struct flock` of type `kind` covering `range` from file start
fn record_lock(kind: libc::c_int, range: ByteRange) -> Result<libc::flock, Errno> {
    // SAFETY: `flock` is a plain C struct for which all-zero bytes are a
    // valid value; every field the kernel reads is set below.
    let mut fl: libc::flock = unsafe { std::mem::zeroed() };
    fl.l_type = kind as libc::c_short;
    fl.l_whence = libc::SEEK_SET as libc::c_short;
    fl.l_start = libc::off_t::try_from(range.start).map_err(|_| Errno::EOVERFLOW)?;
    fl.l_len = libc::off_t::try_from(range.len).map_err(|_| Errno::EOVERFLOW)?;
    Ok(fl)
}

/// Take an exclusive lock on `range`, blocking until it is granted.
///
/// An interrupted wait is retried; every other failure is returned.
pub fn lock_exclusive_wait(fd: RawFd, range: ByteRange) -> Result<(), Errno> {
    let fl = record_lock(libc::F_WRLCK as libc::c_int, range)?;
    loop {
        match fcntl(fd, FcntlArg::F_SETLKW(&fl)) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => {
                tracing::trace!("lock wait interrupted, retrying");
                continue;
            }
            Err(errno) => return Err(errno),
        }
    }
}

/// Take an exclusive lock on `range` without waiting
pub fn lock_exclusive(fd: RawFd, range: ByteRange) -> Result<(), Errno> {
    let fl = record_lock(libc::F_WRLCK as libc::c_int, range)?;
    fcntl(fd, FcntlArg::F_SETLK(&fl)).map(drop)
}

/// Release any lock this process holds on `range`
pub fn unlock(fd: RawFd, range: ByteRange) -> Result<(), Errno> {
    let fl = record_lock(libc::F_UNLCK as libc::c_int, range)?;
    fcntl(fd, FcntlArg::F_SETLK(&fl)).map(drop)
}

/// Ask whether an exclusive lock on `range` would conflict with one held by
/// another process. Nothing is acquired. Locks held by the calling process
/// never conflict with its own query.
pub fn query_exclusive(fd: RawFd, range: ByteRange) -> Result<LockState, Errno> {
    let mut fl = record_lock(libc::F_WRLCK as libc::c_int, range)?;
    fcntl(fd, FcntlArg::F_GETLK(&mut fl))?;

    if fl.l_type == libc::F_UNLCK as libc::c_short {
        Ok(LockState::Free)
    } else {
        Ok(LockState::Held { pid: fl.l_pid })
    }
}

/// Clear close-on-exec so the descriptor, and with it every record lock
/// this process holds on the file, survives process image replacement.
pub fn clear_close_on_exec(fd: RawFd) -> Result<(), Errno> {
    let mut flags = FdFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFD)?);
    flags.remove(FdFlag::FD_CLOEXEC);
    fcntl(fd, FcntlArg::F_SETFD(flags)).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LockFileConfig;
    use crate::slot_store::{HEADER_WIDTH, SlotStore};
    use crate::test_support::Holder;
    use nix::sys::pthread::{pthread_kill, pthread_self};
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
    use std::os::fd::AsRawFd;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    const HEADER: ByteRange = ByteRange::new(0, HEADER_WIDTH as u64);

    static ALARMS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn count_alarm(_: libc::c_int) {
        ALARMS.fetch_add(1, Ordering::SeqCst);
    }

    fn cloexec_set(fd: RawFd) -> bool {
        FdFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFD).unwrap())
            .contains(FdFlag::FD_CLOEXEC)
    }

    #[test]
    fn test_own_locks_do_not_show_in_query() {
        let file = tempfile::tempfile().unwrap();
        let fd = file.as_raw_fd();

        lock_exclusive(fd, ByteRange::byte(8)).unwrap();
        assert_eq!(query_exclusive(fd, ByteRange::byte(8)).unwrap(), LockState::Free);
        unlock(fd, ByteRange::byte(8)).unwrap();
    }

    #[test]
    fn test_wait_lock_on_free_range_returns() {
        let file = tempfile::tempfile().unwrap();
        let fd = file.as_raw_fd();

        lock_exclusive_wait(fd, HEADER).unwrap();
        unlock(fd, HEADER).unwrap();
    }

    #[test]
    fn test_query_reports_other_holder() {
        let dir = TempDir::new().unwrap();
        let config = LockFileConfig::new(dir.path().join("slots.lock"));
        let store = SlotStore::open_or_create(&config).unwrap();
        let holder = Holder::lock_ranges(&config, &[ByteRange::byte(9)]);

        assert_eq!(
            query_exclusive(store.fd(), ByteRange::byte(9)).unwrap(),
            LockState::Held { pid: holder.pid() }
        );
        assert_eq!(
            lock_exclusive(store.fd(), ByteRange::byte(9)).unwrap_err(),
            Errno::EAGAIN
        );
    }

    #[test]
    fn test_wait_retries_after_signal_until_holder_releases() {
        let dir = TempDir::new().unwrap();
        let config = LockFileConfig::new(dir.path().join("slots.lock"));
        let store = SlotStore::open_or_create(&config).unwrap();
        let holder = Holder::lock_ranges(&config, &[HEADER]);

        // No SA_RESTART, so the pending F_SETLKW fails with EINTR.
        let action = SigAction::new(
            SigHandler::Handler(count_alarm),
            SaFlags::empty(),
            SigSet::empty(),
        );
        // SAFETY: the handler only increments an atomic.
        unsafe { sigaction(Signal::SIGALRM, &action) }.unwrap();

        let waiter = pthread_self();
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            pthread_kill(waiter, Signal::SIGALRM).unwrap();
            thread::sleep(Duration::from_millis(200));
            drop(holder);
        });

        let started = Instant::now();
        lock_exclusive_wait(store.fd(), HEADER).unwrap();
        let waited = started.elapsed();
        releaser.join().unwrap();

        assert!(ALARMS.load(Ordering::SeqCst) >= 1);
        assert!(waited >= Duration::from_millis(300), "returned after {waited:?}");
    }

    #[test]
    fn test_bad_descriptor_is_reported() {
        assert_eq!(
            query_exclusive(-1, ByteRange::byte(8)).unwrap_err(),
            Errno::EBADF
        );
        assert_eq!(lock_exclusive(-1, ByteRange::byte(8)).unwrap_err(), Errno::EBADF);
    }

    #[test]
    fn test_offset_beyond_off_t_overflows() {
        assert_eq!(
            lock_exclusive(0, ByteRange::byte(u64::MAX)).unwrap_err(),
            Errno::EOVERFLOW
        );
    }

    #[test]
    fn test_clear_close_on_exec() {
        let file = tempfile::tempfile().unwrap();
        let fd = file.as_raw_fd();
        assert!(cloexec_set(fd));

        clear_close_on_exec(fd).unwrap();
        assert!(!cloexec_set(fd));
    }
}
