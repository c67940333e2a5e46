//! Typed error definitions for safe_fileops.
//! One variant per failure kind; every public operation returns `OpResult<T>`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::fs_ops::helpers::build_message;

/// Result alias used by every public operation.
pub type OpResult<T> = Result<T, FsOpError>;

/// Copyable tag for the failure kind, handy for matching and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NotFound,
    NotADirectory,
    AlreadyExists,
    NotEmpty,
    PermissionDenied,
    Timeout,
    RetriesExhausted,
    Unexpected,
}

impl FailureKind {
    /// Short snake_case label for structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::NotADirectory => "not_a_directory",
            FailureKind::AlreadyExists => "already_exists",
            FailureKind::NotEmpty => "not_empty",
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::Timeout => "timeout",
            FailureKind::RetriesExhausted => "retries_exhausted",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

#[derive(Debug, Error)]
pub enum FsOpError {
    #[error("{what} does not exist: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("{what} is not a directory: {}", .path.display())]
    NotADirectory { what: &'static str, path: PathBuf },

    #[error("Target already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Directory not empty (use recursive delete): {}", .0.display())]
    NotEmpty(PathBuf),

    #[error("Permission denied on {}: {context}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        context: String,
        os_code: Option<i32>,
    },

    #[error("{op} timed out after {:.3}s ({attempts} attempts made)", .elapsed.as_secs_f64())]
    Timeout {
        op: String,
        elapsed: Duration,
        attempts: u32,
    },

    #[error("{op} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        op: String,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    Unexpected {
        message: String,
        #[source]
        source: Option<io::Error>,
    },
}

impl FsOpError {
    /// Classify an OS-level error raised while performing `op` on `path`.
    ///
    /// This is the only place raw error kinds are mapped onto the taxonomy;
    /// anything unrecognized becomes `Unexpected` with a hinted message.
    pub fn from_io(op: &str, path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => FsOpError::NotFound {
                what: "Path",
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotADirectory => FsOpError::NotADirectory {
                what: "Path",
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => FsOpError::AlreadyExists(path.to_path_buf()),
            io::ErrorKind::DirectoryNotEmpty => FsOpError::NotEmpty(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FsOpError::PermissionDenied {
                path: path.to_path_buf(),
                context: format!("{op}: {e}"),
                os_code: e.raw_os_error(),
            },
            _ => FsOpError::Unexpected {
                message: build_message(op, path, &e),
                source: Some(e),
            },
        }
    }

    /// `Unexpected` without an OS cause, for rejected arguments.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        FsOpError::Unexpected {
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FsOpError::NotFound { .. } => FailureKind::NotFound,
            FsOpError::NotADirectory { .. } => FailureKind::NotADirectory,
            FsOpError::AlreadyExists(_) => FailureKind::AlreadyExists,
            FsOpError::NotEmpty(_) => FailureKind::NotEmpty,
            FsOpError::PermissionDenied { .. } => FailureKind::PermissionDenied,
            FsOpError::Timeout { .. } => FailureKind::Timeout,
            FsOpError::RetriesExhausted { .. } => FailureKind::RetriesExhausted,
            FsOpError::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    /// Stable numeric code for logs and process exit reporting.
    pub fn code(&self) -> u16 {
        match self.kind() {
            FailureKind::NotFound => 10,
            FailureKind::NotADirectory => 11,
            FailureKind::AlreadyExists => 12,
            FailureKind::NotEmpty => 13,
            FailureKind::PermissionDenied => 20,
            FailureKind::Timeout => 30,
            FailureKind::RetriesExhausted => 31,
            FailureKind::Unexpected => 99,
        }
    }

    /// OS error number behind this failure, if one is known.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            FsOpError::PermissionDenied { os_code, .. } => *os_code,
            FsOpError::RetriesExhausted { source, .. } => source.raw_os_error(),
            FsOpError::Unexpected { source, .. } => source.as_ref().and_then(|e| e.raw_os_error()),
            FsOpError::Timeout { .. } => None,
            #[cfg(unix)]
            FsOpError::NotFound { .. } => Some(libc::ENOENT),
            #[cfg(unix)]
            FsOpError::NotADirectory { .. } => Some(libc::ENOTDIR),
            #[cfg(unix)]
            FsOpError::AlreadyExists(_) => Some(libc::EEXIST),
            #[cfg(unix)]
            FsOpError::NotEmpty(_) => Some(libc::ENOTEMPTY),
            #[cfg(not(unix))]
            _ => None,
        }
    }
}
