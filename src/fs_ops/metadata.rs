//! Metadata preservation for copies.
//! Timestamps, permission bits (read-only flag on Windows) and, with the
//! `xattrs` feature, extended attributes. Best-effort: failures are logged.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Apply `src_meta`'s timestamps and permissions to `dest`.
pub(crate) fn preserve_metadata(dest: &Path, src_meta: &fs::Metadata) {
    let at = FileTime::from_last_access_time(src_meta);
    let mt = FileTime::from_last_modification_time(src_meta);
    match set_file_times(dest, at, mt) {
        Ok(()) => trace!(path = %dest.display(), "set atime/mtime on destination"),
        Err(e) => warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination"),
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o7777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(mode)) {
            warn!(path = %dest.display(), mode = format!("{:o}", mode), error = %e, "failed to set permissions on destination");
        }
    }

    #[cfg(not(unix))]
    {
        let ro = src_meta.permissions().readonly();
        if let Ok(meta) = fs::metadata(dest) {
            let mut perms = meta.permissions();
            perms.set_readonly(ro);
            if let Err(e) = fs::set_permissions(dest, perms) {
                warn!(path = %dest.display(), readonly = ro, error = %e, "failed to set readonly attribute on destination");
            }
        }
    }
}

/// Copy extended attributes from `src` to `dest` (no-op without `xattrs`).
pub(crate) fn preserve_xattrs(src: &Path, dest: &Path) {
    #[cfg(feature = "xattrs")]
    {
        let names = match xattr::list(src) {
            Ok(n) => n,
            Err(e) => {
                warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
                return;
            }
        };
        for name in names {
            let shown = name.to_string_lossy().into_owned();
            match xattr::get(src, &name) {
                Ok(value) => {
                    let value = value.unwrap_or_default();
                    if let Err(e) = xattr::set(dest, &name, &value) {
                        warn!(dest = %dest.display(), xattr = %shown, error = %e, "failed to set xattr on destination");
                    } else {
                        trace!(dest = %dest.display(), xattr = %shown, size = value.len(), "preserved xattr");
                    }
                }
                Err(e) => warn!(src = %src.display(), xattr = %shown, error = %e, "failed to read xattr"),
            }
        }
    }
    #[cfg(not(feature = "xattrs"))]
    {
        let _ = (src, dest);
    }
}
