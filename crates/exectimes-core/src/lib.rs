//! exectimes core library
//!
//! Limits how many instances of a program run at once across unrelated
//! processes, using nothing but one shared lock file. Each running instance
//! holds an exclusive record lock on one byte ("slot") of the file; the
//! file's header records how far the slots have ever grown.
//!
//! ```no_run
//! use exectimes_core::allocation::{Acquired, Allocator};
//! use exectimes_core::config::LockFileConfig;
//!
//! # fn main() -> exectimes_core::error::SlotResult<()> {
//! let config = LockFileConfig::new("/tmp/backup.lock");
//! match Allocator::open(&config)?.acquire(2)? {
//!     Acquired::Claimed(claim) => {
//!         let err = exectimes_core::launch::exec(claim, &["backup".into()]);
//!         eprintln!("{err}");
//!     }
//!     Acquired::Refused { running } => eprintln!("{running} already running"),
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(not(unix))]
compile_error!("exectimes relies on POSIX record locks and only builds on Unix");

pub mod allocation;
pub mod config;
pub mod error;
pub mod launch;
pub mod slot_store;

#[cfg(test)]
mod test_support;

pub use allocation::{Acquired, Allocator, Claim, HeldSlot};
pub use config::{Invocation, LockFileConfig, Mode};
pub use error::{SlotError, SlotResult};
pub use slot_store::{HEADER_WIDTH, SlotOffset, SlotStore};
