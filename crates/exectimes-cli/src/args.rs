//! CLI argument definitions using clap
//!
//! Positional layout:
//! - exectimes LOCK_FILE MAX_INSTANCES COMMAND [ARGS...]
//! - exectimes LOCK_FILE check
//! - exectimes LOCK_FILE list
//!
//! The command after MAX_INSTANCES belongs to the target program, so the
//! vector is split by position and never reinterpreted. clap renders help
//! and version text, asked for only by the first argument.

use clap::{CommandFactory, Parser};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "exectimes";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = "Usage: exectimes lock-file max-instances command [args...]\n       exectimes lock-file check\n       exectimes lock-file list";

pub const COPYRIGHT: &str = "Copyright (C) The exectimes authors\nLicense GPLv2+: GNU GPL version 2 or later <http://gnu.org/licenses/gpl.html>.\nThis is free software: you are free to change and redistribute it.\nThere is NO WARRANTY, to the extent permitted by law.";

#[derive(Parser, Debug)]
#[command(name = PROGRAM_NAME)]
#[command(about = "Limit concurrent instances of a program")]
#[command(
    long_about = r#"Limit concurrent instances of a program

Every instance started through the same lock file holds one slot in it
for as long as it runs. A new instance starts only while fewer than
MAX_INSTANCES slots are held; otherwise exectimes exits with status 1.

USAGE:
  exectimes LOCK_FILE MAX_INSTANCES COMMAND [ARGS...]
  exectimes LOCK_FILE check      # print the number of running instances
  exectimes LOCK_FILE list       # print each held slot and its PID
  exectimes --help | --version"#
)]
#[command(version, disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Lock file shared by all cooperating invocations (created if missing)
    #[arg(value_name = "LOCK_FILE", allow_hyphen_values = true)]
    pub lock_file: Option<PathBuf>,

    /// Maximum number of concurrent instances, or `check` / `list`
    #[arg(value_name = "MAX_INSTANCES|check|list", allow_negative_numbers = true)]
    pub mode: Option<String>,

    /// Command to run and its arguments, passed through unchanged
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

/// What a command line asks for
#[derive(Debug)]
pub enum Request {
    Help,
    Version,
    Run(Cli),
}

impl Cli {
    /// Split `args` (program name first) by position.
    ///
    /// Everything from the third argument on is the command, byte for byte,
    /// including a leading `--` and flags clap would otherwise claim.
    pub fn parse_args<I, T>(args: I) -> Request
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into).skip(1);
        let lock_file = args.next();

        match lock_file.as_deref().and_then(OsStr::to_str) {
            Some("-h" | "--help") => return Request::Help,
            Some("-V" | "--version") => return Request::Version,
            _ => {}
        }

        Request::Run(Cli {
            lock_file: lock_file.map(PathBuf::from),
            mode: args.next().map(|mode| mode.to_string_lossy().into_owned()),
            command: args.collect(),
        })
    }
}

pub fn help_text() -> String {
    Cli::command().render_long_help().to_string()
}

pub fn version_text() -> String {
    Cli::command().render_version()
}

/// Banner printed when exectimes runs without arguments
pub fn banner() -> String {
    format!("{PROGRAM_NAME} version {VERSION}\n{COPYRIGHT}\n{USAGE}")
}
