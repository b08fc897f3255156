//! exectimes command-line application
//!
//! Runs a command only if fewer than a given number of instances sharing
//! the same lock file are already running.
//!
//! ```bash
//! exectimes /var/lock/backup.lock 2 backup --full   # run if < 2 running
//! exectimes /var/lock/backup.lock check             # how many are running
//! exectimes /var/lock/backup.lock list              # which PIDs hold slots
//! ```
//!
//! Set `EXECTIMES_LOG=debug` for diagnostics on stderr.

mod args;
mod commands;
mod logging;
mod router;

use args::{Cli, Request};
use exectimes_core::config::LoggingConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::parse_args(std::env::args_os()) {
        Request::Run(cli) => cli,
        Request::Help => {
            print!("{}", args::help_text());
            return ExitCode::SUCCESS;
        }
        Request::Version => {
            print!("{}", args::version_text());
            return ExitCode::SUCCESS;
        }
    };
    logging::init(&LoggingConfig::from_env());

    match router::route(cli) {
        Ok(code) => code,
        Err(err) => {
            router::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
