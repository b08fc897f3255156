//! Error types for exectimes
//!
//! Every failure an invocation can hit is terminal. The variants follow the
//! failure classes of the tool:
//! - usage: wrong argument count, nothing touched
//! - io: opening, reading or writing the lock file
//! - lock: any record-lock failure other than an interrupted wait
//! - exec: the target command could not replace this process
//!
//! Admission refusal is not an error and lives in [`crate::allocation::Acquired`].

mod constructors;
mod types;

pub use types::{IoResultExt, SlotError, SlotResult};
