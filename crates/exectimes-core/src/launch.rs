//! Hand the claimed slot over to the target program
//!
//! The target replaces this process image, so it keeps this PID and the
//! open lock file descriptor. The slot therefore stays held for exactly as
//! long as the target runs, and `list` shows the target's PID.

use crate::allocation::Claim;
use crate::error::SlotError;
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::process::Command;

/// Replace the current process with `command`, keeping `claim` held.
///
/// Only returns on failure. The slot is then released when this process
/// exits and its descriptor closes.
pub fn exec(claim: Claim, command: &[OsString]) -> SlotError {
    let Some((program, args)) = command.split_first() else {
        return SlotError::usage("missing command to run");
    };

    if let Err(err) = claim.hand_off() {
        return err;
    }

    tracing::debug!(
        slot = claim.slot().index(),
        program = %program.to_string_lossy(),
        "replacing process image"
    );
    let source = Command::new(program).args(args).exec();

    // Still here: the claim drops with this frame and the descriptor closes.
    SlotError::exec(program.to_string_lossy(), source)
}
