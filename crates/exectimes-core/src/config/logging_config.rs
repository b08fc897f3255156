//! Logging configuration

use std::env;

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "EXECTIMES_LOG";

/// Environment variable selecting the log line format
pub const LOG_FORMAT_ENV: &str = "EXECTIMES_LOG_FORMAT";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line with all fields
    #[default]
    Full,
    Compact,
    /// Multi-line, human oriented
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to full for anything unknown
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ => Self::Full,
        }
    }
}

/// Logging configuration
///
/// Diagnostics always go to stderr; stdout carries only the `list` and
/// `check` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or per-target)
    pub filter: String,
    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            format: LogFormat::Full,
        }
    }
}

impl LoggingConfig {
    /// Load from `EXECTIMES_LOG` (or `RUST_LOG`) and `EXECTIMES_LOG_FORMAT`
    /// (`full`, `compact`, `pretty` or `json`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(filter) = lookup(LOG_ENV).or_else(|| lookup("RUST_LOG")) {
            if !filter.trim().is_empty() {
                config.filter = filter;
            }
        }

        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.format = LogFormat::parse(&format);
        }

        config
    }
}
