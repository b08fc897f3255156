//! Acquire a slot and replace this process with the target command

use exectimes_core::allocation::{Acquired, Allocator};
use exectimes_core::config::LockFileConfig;
use exectimes_core::error::SlotResult;
use exectimes_core::launch;
use std::ffi::OsString;
use std::process::ExitCode;

/// Only returns on refusal or failure; on success the target program
/// takes over this process.
pub fn run(
    config: &LockFileConfig,
    max_allowed: u64,
    command: &[OsString],
) -> SlotResult<ExitCode> {
    match Allocator::open(config)?.acquire(max_allowed)? {
        Acquired::Refused { running } => {
            eprintln!("Cannot start, {running} instances already running");
            Ok(ExitCode::FAILURE)
        }
        Acquired::Claimed(claim) => Err(launch::exec(claim, command)),
    }
}
