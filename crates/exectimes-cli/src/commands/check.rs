//! `check`: print how many instances currently hold a slot

use super::output_error;
use exectimes_core::allocation::Allocator;
use exectimes_core::config::LockFileConfig;
use exectimes_core::error::SlotResult;
use std::io::{self, Write};
use std::process::ExitCode;

pub fn check(config: &LockFileConfig) -> SlotResult<ExitCode> {
    let running = Allocator::open(config)?.check()?;

    let mut out = io::stdout().lock();
    writeln!(out, "{running} instances running")
        .and_then(|()| out.flush())
        .map_err(output_error)?;
    Ok(ExitCode::SUCCESS)
}
