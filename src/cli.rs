//! CLI definition and parsing.
//! One subcommand per library operation; global flags tune logging and retries.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Flags override values loaded from config.xml.

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;
use std::time::Duration;

use safe_fileops::{Config, LogLevel, Permission};

/// Resilient file operations from the command line.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Retrying moves, atomic copies, secure deletion and transform-and-commit")]
pub struct Args {
    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Also append logs to this file.
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Attempts per retried operation, first included.
    #[arg(long, global = true, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Pause between retries in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Overall deadline for a retried operation, in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move a file, falling back to copy+delete across filesystems
    Mv {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        dest: PathBuf,
        /// Replace an existing destination
        #[arg(long)]
        overwrite: bool,
        /// Create missing parent directories of the destination
        #[arg(short = 'p', long)]
        parents: bool,
    },
    /// Move a directory tree; an existing destination directory receives it as a child
    Mvdir {
        #[arg(value_hint = ValueHint::DirPath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::DirPath)]
        dest: PathBuf,
    },
    /// Copy a file through a temp sibling and atomic rename
    Cp {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        dest: PathBuf,
        #[arg(long)]
        overwrite: bool,
        #[arg(short = 'p', long)]
        parents: bool,
        /// Do not carry timestamps and permissions over
        #[arg(long)]
        no_preserve: bool,
    },
    /// Delete a file
    Rm {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Overwrite the contents before unlinking
        #[arg(long)]
        secure: bool,
        /// Overwrite passes for --secure (default from config)
        #[arg(long, requires = "secure")]
        passes: Option<u32>,
    },
    /// Delete a directory
    Rmdir {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        /// Remove contents too
        #[arg(short = 'r', long)]
        recursive: bool,
    },
    /// Create a directory and any missing parents
    Mkdir {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
    /// Show disk space for the filesystem holding PATH
    Space {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// Fail unless at least this many bytes are available
        #[arg(long, value_name = "BYTES")]
        required: Option<u64>,
    },
    /// Transform SRC into DEST atomically, then remove SRC
    Process {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        dest: PathBuf,
        #[arg(long, value_enum, default_value_t = Transform::Identity)]
        transform: Transform,
        #[arg(long)]
        overwrite: bool,
        /// Securely delete SRC after the commit
        #[arg(long)]
        secure_delete: bool,
        /// Chunk size in bytes (default from config)
        #[arg(long, value_name = "BYTES")]
        buffer_size: Option<usize>,
    },
    /// Create a temporary file and print its path
    Temp {
        /// Directory to create it in (default: system temp dir)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long, default_value = "")]
        suffix: String,
        /// Initial content
        #[arg(long)]
        content: Option<String>,
    },
    /// Check or set permissions
    Perm {
        #[command(subcommand)]
        action: PermAction,
    },
    /// Print the config location and the effective settings
    PrintConfig,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PermAction {
    /// Exit 0 if the current process has the permission, 1 otherwise
    Check {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// read | write | execute
        #[arg(value_parser = parse_permission)]
        permission: Permission,
    },
    /// Replace the mode with owner-only bits from the flags
    Set {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        #[arg(long)]
        read: bool,
        #[arg(long)]
        write: bool,
        #[arg(long)]
        execute: bool,
    },
}

/// Built-in transforms for `process`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    Upper,
    Lower,
}

impl Transform {
    pub fn apply(self, chunk: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Transform::Identity => safe_fileops::identity(chunk),
            Transform::Upper => Ok(chunk.to_ascii_uppercase()),
            Transform::Lower => Ok(chunk.to_ascii_lowercase()),
        }
    }
}

fn parse_permission(s: &str) -> Result<Permission, String> {
    Permission::parse(s).ok_or_else(|| format!("invalid permission '{s}' (expected read, write or execute)"))
}

impl Args {
    /// Precedence: --debug > --log-level value > None (use config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(n) = self.max_attempts {
            cfg.max_attempts = n;
        }
        if let Some(ms) = self.retry_delay_ms {
            cfg.retry_delay = Duration::from_millis(ms);
        }
        if let Some(s) = self.timeout_secs {
            cfg.timeout = Some(Duration::from_secs(s));
        }
        if let Command::Process {
            buffer_size: Some(n), ..
        } = &self.command
        {
            cfg.buffer_size = *n;
        }
        if let Command::Rm { passes: Some(n), .. } = &self.command {
            cfg.secure_passes = *n;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
