//! Atomic rename helper.
//! - Plain `rename`; atomic when source and destination share a filesystem.
//! - On Windows, removes an existing destination first (MoveFile doesn't overwrite).
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::io;
use std::path::Path;

use super::util::{fsync_dir, parent_or_cwd};

/// Rename `src` onto `dst`. Errors are returned raw so callers can classify
/// them (cross-device, transient, fatal).
pub(crate) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if let Err(e) = fs::remove_file(dst)
            && e.kind() != io::ErrorKind::NotFound
        {
            return Err(e);
        }
    }

    fs::rename(src, dst)?;

    // A successful rename stays successful even if the directory sync fails.
    let _ = fsync_dir(&parent_or_cwd(dst));
    Ok(())
}
