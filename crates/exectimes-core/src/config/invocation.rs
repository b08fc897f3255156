//! Invocation mode parsed from the positional arguments

use super::lock_file::LockFileConfig;
use crate::error::{SlotError, SlotResult};
use std::ffi::OsString;

/// What one invocation does after scanning the slot store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Print every held slot with its holder PID
    List,
    /// Print how many slots are held
    Check,
    /// Claim a slot and replace this process with `command`
    Acquire {
        max_allowed: u64,
        command: Vec<OsString>,
    },
}

impl Mode {
    /// Interpret the second positional argument and the trailing command.
    ///
    /// `check` and `list` ignore any trailing arguments. Anything else is a
    /// max-instances value and needs a command after it.
    pub fn parse(mode: &str, command: Vec<OsString>) -> SlotResult<Self> {
        match mode {
            "check" => Ok(Self::Check),
            "list" => Ok(Self::List),
            limit => {
                if command.is_empty() {
                    return Err(SlotError::usage("missing command to run"));
                }
                Ok(Self::Acquire {
                    max_allowed: parse_max_instances(limit),
                    command,
                })
            }
        }
    }
}

/// A fully parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub lock_file: LockFileConfig,
    pub mode: Mode,
}

impl Invocation {
    pub fn new(lock_file: LockFileConfig, mode: Mode) -> Self {
        Self { lock_file, mode }
    }
}

/// Parse a max-instances argument the way `strtol(s, NULL, 10)` does.
///
/// Leading whitespace is skipped, an optional sign is accepted and the
/// longest decimal digit prefix is used. No digits yields 0, so a typo
/// refuses every acquisition. Negative values also yield 0 and overflow
/// saturates.
pub fn parse_max_instances(value: &str) -> u64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut parsed: u64 = 0;
    let mut saw_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        saw_digit = true;
        parsed = parsed
            .saturating_mul(10)
            .saturating_add(u64::from(byte - b'0'));
    }

    if !saw_digit || negative { 0 } else { parsed }
}
