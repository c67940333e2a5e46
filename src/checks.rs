//! Precondition checks.
//!
//! Every check re-stats the path; nothing is cached between calls, so a
//! passing check is a best-effort statement about "now", not a guarantee
//! about the next syscall. None of these mutate the filesystem.

use std::fs;
use std::path::Path;
use tracing::{debug, trace};

use crate::errors::{FsOpError, OpResult};

/// Kind of access probed by [`has_access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Write,
    Execute,
}

impl Permission {
    /// Parse "read" / "write" / "execute" (also r / w / x), case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read" | "r" => Some(Permission::Read),
            "write" | "w" => Some(Permission::Write),
            "execute" | "exec" | "x" => Some(Permission::Execute),
            _ => None,
        }
    }
}

/// Fail with `NotFound` unless `path` exists (symlinks are followed).
pub fn exists(path: &Path) -> OpResult<()> {
    exists_as(path, "Path")
}

pub(crate) fn exists_as(path: &Path, what: &'static str) -> OpResult<()> {
    if fs::metadata(path).is_ok() {
        return Ok(());
    }
    debug!(path = %path.display(), what, "precondition failed: path does not exist");
    Err(FsOpError::NotFound {
        what,
        path: path.to_path_buf(),
    })
}

/// `NotFound` if absent, `NotADirectory` if present but not a directory.
pub fn is_directory(path: &Path) -> OpResult<()> {
    is_directory_as(path, "Path")
}

pub(crate) fn is_directory_as(path: &Path, what: &'static str) -> OpResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            debug!(path = %path.display(), what, "precondition failed: not a directory");
            Err(FsOpError::NotADirectory {
                what,
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(FsOpError::NotFound {
            what,
            path: path.to_path_buf(),
        }),
    }
}

/// `AlreadyExists` if `path` exists and `overwrite` is false.
///
/// Does not look at permission bits; see [`accessible`] for that.
pub fn target_writable(path: &Path, overwrite: bool) -> OpResult<()> {
    // symlink_metadata: a dangling symlink still occupies the name.
    if !overwrite && fs::symlink_metadata(path).is_ok() {
        debug!(path = %path.display(), "precondition failed: target exists and overwrite=false");
        return Err(FsOpError::AlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

/// Existing paths must be readable. For a path that does not exist yet, the
/// nearest existing ancestor must grant read, write and execute so a later
/// create can succeed.
pub fn accessible(path: &Path) -> OpResult<()> {
    if fs::metadata(path).is_ok() {
        if has_access(path, Permission::Read) {
            trace!(path = %path.display(), "path is accessible");
            return Ok(());
        }
        return Err(FsOpError::PermissionDenied {
            path: path.to_path_buf(),
            context: "no read permission".into(),
            os_code: None,
        });
    }

    let ancestor = path
        .ancestors()
        .skip(1)
        .map(|a| if a.as_os_str().is_empty() { Path::new(".") } else { a })
        .find(|a| fs::metadata(a).is_ok())
        .ok_or_else(|| FsOpError::NotFound {
            what: "Parent directory",
            path: path.to_path_buf(),
        })?;

    let ok = has_access(ancestor, Permission::Read)
        && has_access(ancestor, Permission::Write)
        && has_access(ancestor, Permission::Execute);
    if !ok {
        return Err(FsOpError::PermissionDenied {
            path: ancestor.to_path_buf(),
            context: format!("insufficient permissions to create '{}'", path.display()),
            os_code: None,
        });
    }
    trace!(path = %path.display(), ancestor = %ancestor.display(), "path has an accessible ancestor");
    Ok(())
}

/// OS-level access probe; false for missing paths and on any error.
#[cfg(unix)]
pub fn has_access(path: &Path, perm: Permission) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    let mode = match perm {
        Permission::Read => libc::R_OK,
        Permission::Write => libc::W_OK,
        Permission::Execute => libc::X_OK,
    };
    unsafe { libc::access(cpath.as_ptr(), mode) == 0 }
}

#[cfg(not(unix))]
pub fn has_access(path: &Path, perm: Permission) -> bool {
    match fs::metadata(path) {
        Ok(meta) => match perm {
            Permission::Read => true,
            Permission::Write => !meta.permissions().readonly(),
            Permission::Execute => {
                meta.is_dir()
                    || path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "exe" | "bat" | "cmd" | "com"))
            }
        },
        Err(_) => false,
    }
}
