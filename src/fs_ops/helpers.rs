//! I/O error message helpers.
//!
//! Builds human-friendly messages for `FsOpError::Unexpected`: the operation,
//! the path, the OS error and a short platform-aware hint, plus the raw code.

use std::io;
use std::path::Path;

/// Format `op 'path': error (hint) [os code: N]`.
pub(crate) fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        if let Some(hint) = os_hint(code) {
            msg.push_str(" (hint: ");
            msg.push_str(hint);
            msg.push(')');
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else if let Some(hint) = kind_hint(e.kind()) {
        msg.push_str(" (hint: ");
        msg.push_str(hint);
        msg.push(')');
    }

    msg
}

#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions.",
        libc::EXDEV => "cross-filesystem; atomic rename not possible.",
        libc::EBUSY => "resource busy; another process may be using it.",
        libc::EAGAIN => "resource temporarily unavailable; retry shortly.",
        libc::EINTR => "interrupted system call; safe to retry.",
        libc::ENOENT => "path not found; verify it exists.",
        libc::EEXIST => "already exists; pick another name or allow overwrite.",
        libc::ENOSPC => "insufficient space on device.",
        libc::EDQUOT => "disk quota exceeded.",
        libc::EROFS => "read-only filesystem; cannot write here.",
        libc::EISDIR => "is a directory; use the directory variant of this operation.",
        libc::ELOOP => "too many symbolic link levels; possible symlink cycle.",
        libc::ENAMETOOLONG => "filename or path too long; shorten path segments.",
        libc::EMFILE => "process file descriptor limit reached; close files or raise limits.",
        libc::ENFILE => "system-wide file table overflow; reduce open files.",
        libc::EIO => "low-level I/O error; check the device.",
        _ => return None,
    };
    Some(hint)
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        5 => "access denied; check permissions.",
        17 => "not same device; cross-filesystem move.",
        32 => "sharing violation; file is in use.",
        2 | 3 => "path not found; verify it exists.",
        80 | 183 => "already exists; pick another name or allow overwrite.",
        112 => "insufficient disk space.",
        19 => "write protected / read-only media.",
        206 => "filename or path too long.",
        4 => "too many open files.",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions."),
        io::ErrorKind::NotFound => Some("path not found; verify it exists."),
        io::ErrorKind::AlreadyExists => Some("already exists; pick another name or allow overwrite."),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            Some("busy/timed out; retry after the current writer finishes.")
        }
        io::ErrorKind::InvalidInput => Some("invalid argument."),
        _ => None,
    }
}
