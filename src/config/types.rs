//! Core configuration types.
//! - Config holds the knobs the operations expose, with the library defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::fs_ops::{
    CopyOptions, DEFAULT_PROCESS_BUFFER, DEFAULT_SECURE_PASSES, DEFAULT_TEMP_PREFIX, MoveOptions,
    ProcessOptions,
};
use crate::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// Precondition and retry detail
    Info,
    /// Everything, including per-pass and per-file traces
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime settings shared by the binary's subcommands.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Attempts per retried operation, first included
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Overall budget for a retried operation
    pub timeout: Option<Duration>,
    /// Chunk size for transform-and-commit
    pub buffer_size: usize,
    /// Overwrite passes for secure deletion
    pub secure_passes: u32,
    /// Carry timestamps and permissions onto copies
    pub preserve_metadata: bool,
    /// Name prefix for created temporary files
    pub temp_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            log_file: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: None,
            buffer_size: DEFAULT_PROCESS_BUFFER,
            secure_passes: DEFAULT_SECURE_PASSES,
            preserve_metadata: true,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: self.retry_delay,
            deadline: self.timeout,
        }
    }

    pub fn move_options(&self, overwrite: bool, create_dirs: bool) -> MoveOptions {
        MoveOptions {
            overwrite,
            create_dirs,
            retry: self.retry_policy(),
        }
    }

    pub fn copy_options(&self, overwrite: bool, create_dirs: bool) -> CopyOptions {
        CopyOptions {
            overwrite,
            create_dirs,
            preserve_metadata: self.preserve_metadata,
        }
    }

    /// Transform options seeded from this config; callers flip the per-call flags.
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            buffer_size: self.buffer_size,
            secure_passes: self.secure_passes,
            retry: self.retry_policy(),
            ..ProcessOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parsing() {
        assert_eq!(LogLevel::parse(" DEBUG "), Some(LogLevel::Debug));
        assert_eq!("quiet".parse::<LogLevel>().unwrap(), LogLevel::Quiet);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Info.to_string(), "info");
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
        let p = cfg.process_options();
        assert_eq!(p.buffer_size, 8192);
        assert_eq!(p.secure_passes, 3);
        assert!(p.create_dirs);
        assert!(!p.overwrite);
        assert!(cfg.copy_options(false, false).preserve_metadata);
    }

    #[test]
    fn options_carry_overrides() {
        let cfg = Config {
            max_attempts: 5,
            retry_delay: Duration::from_millis(10),
            timeout: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        let m = cfg.move_options(true, true);
        assert!(m.overwrite && m.create_dirs);
        assert_eq!(m.retry.max_attempts, 5);
        assert_eq!(m.retry.deadline, Some(Duration::from_secs(2)));
    }
}
