//! Route a parsed command line to the matching command

use crate::args::{Cli, USAGE, banner};
use crate::commands;
use exectimes_core::config::{Invocation, LockFileConfig, Mode};
use exectimes_core::error::{SlotError, SlotResult};
use std::process::ExitCode;

/// Run the invocation described by `cli`
pub fn route(cli: Cli) -> SlotResult<ExitCode> {
    let Some(lock_file) = cli.lock_file else {
        println!("{}", banner());
        return Ok(ExitCode::FAILURE);
    };
    let Some(mode) = cli.mode else {
        return Err(SlotError::usage("missing max-instances, check or list"));
    };

    let invocation = Invocation::new(
        LockFileConfig::new(lock_file),
        Mode::parse(&mode, cli.command)?,
    );
    tracing::debug!(?invocation, "parsed invocation");

    match invocation.mode {
        Mode::List => commands::list(&invocation.lock_file),
        Mode::Check => commands::check(&invocation.lock_file),
        Mode::Acquire {
            max_allowed,
            command,
        } => commands::run(&invocation.lock_file, max_allowed, &command),
    }
}

/// Print an error the way each failure class is reported
pub fn report_error(err: &SlotError) {
    match err {
        SlotError::Usage { message } => {
            tracing::debug!(%message, "usage error");
            println!("{USAGE}");
        }
        other => {
            tracing::debug!(code = other.error_code(), "invocation failed");
            eprintln!("{other}");
        }
    }
}
