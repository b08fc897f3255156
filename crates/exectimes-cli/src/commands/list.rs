//! `list`: print every held slot and its holder

use super::output_error;
use exectimes_core::allocation::{Allocator, HeldSlot};
use exectimes_core::config::LockFileConfig;
use exectimes_core::error::SlotResult;
use std::io::{self, Write};
use std::process::ExitCode;

pub fn list(config: &LockFileConfig) -> SlotResult<ExitCode> {
    let held = Allocator::open(config)?.list()?;

    let mut out = io::stdout().lock();
    write_held(&mut out, &held).map_err(output_error)?;
    Ok(ExitCode::SUCCESS)
}

fn write_held(out: &mut impl Write, held: &[HeldSlot]) -> io::Result<()> {
    for entry in held {
        writeln!(out, "Slot {} held by PID {}", entry.slot.index(), entry.pid)?;
    }
    out.flush()
}
