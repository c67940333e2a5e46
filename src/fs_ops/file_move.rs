//! File move.
//! Renames under the retry engine; when the rename crosses a filesystem
//! boundary it falls back to a safe copy (temp sibling, fsync, atomic
//! rename, metadata preserved) followed by removing the source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::checks::{exists_as, target_writable};
use crate::errors::{FsOpError, OpResult};
use crate::retry::{RetryPolicy, retry};

use super::atomic::try_atomic_move;
use super::copy::copy_and_rename;
use super::mkdir::ensure_parent_exists;
use super::util::is_cross_device;

/// Options for [`move_file`].
#[derive(Debug, Clone, Default)]
pub struct MoveOptions {
    pub overwrite: bool,
    /// Create the destination's parent directories if missing
    pub create_dirs: bool,
    pub retry: RetryPolicy,
}

enum RenameOutcome {
    Renamed,
    CrossDevice(io::Error),
}

/// Move `src` to `dest`, returning `dest`.
pub fn move_file(src: &Path, dest: &Path, opts: &MoveOptions) -> OpResult<PathBuf> {
    move_file_via(src, dest, opts, try_atomic_move)
}

/// [`move_file`] with the rename step supplied by the caller.
pub(crate) fn move_file_via<R>(src: &Path, dest: &Path, opts: &MoveOptions, rename: R) -> OpResult<PathBuf>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    exists_as(src, "Source file")?;
    if fs::metadata(src).map(|m| m.is_dir()).unwrap_or(false) {
        return Err(FsOpError::invalid_input(format!(
            "Source is a directory, not a file: {} (use move_directory)",
            src.display()
        )));
    }
    if opts.create_dirs {
        ensure_parent_exists(dest)?;
    }
    target_writable(dest, opts.overwrite)?;

    let outcome = retry("move file", src, &opts.retry, || match rename(src, dest) {
        Ok(()) => Ok(RenameOutcome::Renamed),
        Err(e) if is_cross_device(&e) => Ok(RenameOutcome::CrossDevice(e)),
        Err(e) => Err(e),
    })?;

    match outcome {
        RenameOutcome::Renamed => {
            info!(src = %src.display(), dest = %dest.display(), "Renamed file atomically");
        }
        RenameOutcome::CrossDevice(e) => {
            warn!(src = %src.display(), dest = %dest.display(), error = %e, "cross-filesystem rename; using safe copy+rename");
            let bytes = copy_and_rename(src, dest, true)?;
            fs::remove_file(src).map_err(|e| FsOpError::from_io("remove original file", src, e))?;
            info!(src = %src.display(), dest = %dest.display(), bytes, "Copied file across filesystems and removed source");
        }
    }
    Ok(dest.to_path_buf())
}
