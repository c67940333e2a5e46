//! Permission probing and owner permission bits.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::checks::{Permission, exists_as, has_access};
use crate::errors::{FsOpError, OpResult};

/// Whether the current process has `perm` on `path`. False for missing paths.
pub fn check_permission(path: &Path, perm: Permission) -> bool {
    has_access(path, perm)
}

/// Owner-only mode from three flags: read 0o400, write 0o200, execute 0o100.
pub fn owner_mode(read: bool, write: bool, execute: bool) -> u32 {
    let mut mode = 0;
    if read {
        mode |= 0o400;
    }
    if write {
        mode |= 0o200;
    }
    if execute {
        mode |= 0o100;
    }
    mode
}

/// Replace the permission bits of `path` with the owner-only mode built from
/// the flags. Group and other bits end up cleared. On Windows only the
/// read-only attribute (`!write`) is applied.
pub fn set_permissions(path: &Path, read: bool, write: bool, execute: bool) -> OpResult<()> {
    exists_as(path, "Path")?;

    #[cfg(unix)]
    let perms = {
        use std::os::unix::fs::PermissionsExt;
        fs::Permissions::from_mode(owner_mode(read, write, execute))
    };
    #[cfg(not(unix))]
    let perms = {
        let mut p = fs::metadata(path)
            .map_err(|e| FsOpError::from_io("stat path", path, e))?
            .permissions();
        p.set_readonly(!write);
        p
    };

    fs::set_permissions(path, perms).map_err(|e| FsOpError::from_io("set permissions", path, e))?;
    info!(
        path = %path.display(),
        mode = format!("{:o}", owner_mode(read, write, execute)),
        "Permissions set"
    );
    Ok(())
}
