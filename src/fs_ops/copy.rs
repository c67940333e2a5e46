//! File copy.
//! - Copies into a hidden temp sibling of the destination (same directory,
//!   so the final rename is atomic), fsyncs it, then renames it into place.
//! - Preserves timestamps and permissions (and xattrs when enabled).
//! - A failure at any step removes the temp sibling.

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::checks::{exists_as, target_writable};
use crate::errors::{FsOpError, OpResult};

use super::atomic::try_atomic_move;
use super::mkdir::ensure_parent_exists;
use super::io_copy::copy_into;
use super::metadata::{preserve_metadata, preserve_xattrs};
use super::temp::new_guarded_temp;
use super::util::parent_or_cwd;

pub(crate) const COPY_TEMP_PREFIX: &str = ".safe_fileops.";
pub(crate) const COPY_TEMP_SUFFIX: &str = ".tmp";

/// Options for [`copy_file`].
#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub overwrite: bool,
    /// Create the destination's parent directories if missing
    pub create_dirs: bool,
    pub preserve_metadata: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            create_dirs: false,
            preserve_metadata: true,
        }
    }
}

/// Copy `src` to `dest`, returning `dest`.
pub fn copy_file(src: &Path, dest: &Path, opts: &CopyOptions) -> OpResult<PathBuf> {
    exists_as(src, "Source file")?;
    if opts.create_dirs {
        ensure_parent_exists(dest)?;
    }
    target_writable(dest, opts.overwrite)?;

    let bytes = copy_and_rename(src, dest, opts.preserve_metadata)?;
    info!(src = %src.display(), dest = %dest.display(), bytes, "File copied");
    Ok(dest.to_path_buf())
}

/// Core of copy and of the cross-device move fallback: temp sibling, stream,
/// fsync, rename over `dest`. Does not check preconditions.
pub(crate) fn copy_and_rename(src: &Path, dest: &Path, preserve: bool) -> OpResult<u64> {
    let mut src_f = File::open(src).map_err(|e| FsOpError::from_io("open source", src, e))?;
    let src_meta = src_f
        .metadata()
        .map_err(|e| FsOpError::from_io("stat source", src, e))?;
    if src_meta.is_dir() {
        return Err(FsOpError::invalid_input(format!(
            "Source is a directory, not a file: {}",
            src.display()
        )));
    }

    let dest_dir = parent_or_cwd(dest);
    let mut tmp = new_guarded_temp(&dest_dir, COPY_TEMP_PREFIX, COPY_TEMP_SUFFIX)?;
    debug!(tmp = %tmp.path().display(), "copying into temporary sibling");

    let bytes = copy_into(&mut src_f, tmp.as_file_mut())
        .map_err(|e| FsOpError::from_io("copy to temporary file", tmp.path(), e))?;
    drop(src_f);

    let tmp_path = tmp.into_temp_path();
    if preserve {
        preserve_metadata(&tmp_path, &src_meta);
        preserve_xattrs(src, &tmp_path);
    }

    try_atomic_move(&tmp_path, dest).map_err(|e| FsOpError::from_io("rename temporary file into place", dest, e))?;
    // Renamed away; nothing left for the guard to delete.
    let _ = tmp_path.keep();
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use std::fs;
    use tempfile::tempdir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(COPY_TEMP_PREFIX) && n.ends_with(COPY_TEMP_SUFFIX))
            .collect()
    }

    #[test]
    fn copies_content_and_keeps_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.txt");
        let dst = td.path().join("b.txt");
        fs::write(&src, "hello").unwrap();

        let out = copy_file(&src, &dst, &CopyOptions::default()).unwrap();
        assert_eq!(out, dst);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "hello");
        assert!(src.exists());
        assert!(leftovers(td.path()).is_empty());
    }

    #[test]
    fn refuses_existing_target_without_overwrite() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.txt");
        let dst = td.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        let err = copy_file(&src, &dst, &CopyOptions::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");

        let opts = CopyOptions {
            overwrite: true,
            ..Default::default()
        };
        copy_file(&src, &dst, &opts).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn missing_source_is_not_found() {
        let td = tempdir().unwrap();
        let err = copy_file(&td.path().join("nope"), &td.path().join("b"), &CopyOptions::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(err.to_string().starts_with("Source file does not exist"));
    }

    #[test]
    fn create_dirs_builds_parent_chain() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.txt");
        fs::write(&src, "x").unwrap();
        let dst = td.path().join("x").join("y").join("a.txt");

        let without = copy_file(&src, &dst, &CopyOptions::default());
        assert!(without.is_err());

        let opts = CopyOptions {
            create_dirs: true,
            ..Default::default()
        };
        copy_file(&src, &dst, &opts).unwrap();
        assert!(dst.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn directory_source_is_rejected_without_leftovers() {
        let td = tempdir().unwrap();
        let src = td.path().join("dir");
        fs::create_dir(&src).unwrap();
        let err = copy_file(&src, &td.path().join("out"), &CopyOptions::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert!(leftovers(td.path()).is_empty());
    }
}
