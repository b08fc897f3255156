//! Configuration for exectimes
//!
//! The lock file path is always passed in explicitly; nothing here reads
//! global state except [`LoggingConfig::from_env`].

mod invocation;
mod lock_file;
mod logging_config;

pub use invocation::{Invocation, Mode, parse_max_instances};
pub use lock_file::{DEFAULT_CREATE_MODE, LockFileConfig};
pub use logging_config::{LOG_ENV, LOG_FORMAT_ENV, LogFormat, LoggingConfig};
