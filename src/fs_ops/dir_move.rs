//! Directory move.
//! Tries a rename first; across filesystems it copies the tree (files in
//! parallel) and removes the source. A failed copy removes the partial
//! target so the source stays the only copy.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::checks::is_directory_as;
use crate::errors::{FsOpError, OpResult};

use super::copy::copy_and_rename;
use super::metadata::preserve_metadata;
use super::mkdir::ensure_parent_exists;
use super::util::{fsync_dir, is_cross_device, parent_or_cwd};

/// Move the directory `src` to `dest` and return where it ended up.
///
/// An existing directory at `dest` receives `src` as a child, so the result
/// is `dest/<src name>`. `AlreadyExists` only when that final path (or a
/// non-directory at `dest`) is already taken.
pub fn move_directory(src: &Path, dest: &Path) -> OpResult<PathBuf> {
    move_directory_via(src, dest, |a, b| fs::rename(a, b))
}

pub(crate) fn move_directory_via<R>(src: &Path, dest: &Path, rename: R) -> OpResult<PathBuf>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    is_directory_as(src, "Source directory")?;
    let resolved = resolve_target(src, dest)?;
    let dest = resolved.as_path();
    if fs::symlink_metadata(dest).is_ok() {
        return Err(FsOpError::AlreadyExists(dest.to_path_buf()));
    }
    ensure_parent_exists(dest)?;

    match rename(src, dest) {
        Ok(()) => {
            let _ = fsync_dir(&parent_or_cwd(dest));
            info!(src = %src.display(), dest = %dest.display(), "Renamed directory atomically");
            return Ok(dest.to_path_buf());
        }
        Err(e) if is_cross_device(&e) => {
            warn!(src = %src.display(), dest = %dest.display(), error = %e, "cross-filesystem rename; copying directory tree");
        }
        Err(e) => return Err(FsOpError::from_io("move directory", src, e)),
    }

    let files = match copy_tree(src, dest) {
        Ok(n) => n,
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(dest) {
                warn!(dest = %dest.display(), error = %cleanup, "failed to remove partial directory copy");
            }
            return Err(e);
        }
    };

    fs::remove_dir_all(src).map_err(|e| FsOpError::from_io("remove source directory", src, e))?;
    info!(src = %src.display(), dest = %dest.display(), files, "Copied directory tree and removed source");
    Ok(dest.to_path_buf())
}

/// `dest` itself, or `dest/<src name>` when `dest` is an existing directory.
fn resolve_target(src: &Path, dest: &Path) -> OpResult<PathBuf> {
    if !fs::metadata(dest).map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(dest.to_path_buf());
    }
    let name = src
        .file_name()
        .ok_or_else(|| FsOpError::invalid_input(format!("Source directory has no name: {}", src.display())))?;
    debug!(dest = %dest.display(), "destination is an existing directory; moving inside it");
    Ok(dest.join(name))
}

fn walk_error(root: &Path, e: walkdir::Error) -> FsOpError {
    let path = e.path().unwrap_or(root).to_path_buf();
    match e.into_io_error() {
        Some(ioe) => FsOpError::from_io("walk source directory", &path, ioe),
        None => FsOpError::invalid_input(format!("Filesystem loop under {}", root.display())),
    }
}

/// Recreate `src` under `dest`. Returns the number of files copied.
fn copy_tree(src: &Path, dest: &Path) -> OpResult<usize> {
    fs::create_dir(dest).map_err(|e| FsOpError::from_io("create directory", dest, e))?;

    let mut dirs: Vec<PathBuf> = vec![PathBuf::new()];
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(src, e))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| FsOpError::invalid_input(format!("Entry outside source tree: {}", entry.path().display())))?
            .to_path_buf();
        let ft = entry.file_type();
        if ft.is_dir() {
            let new_dir = dest.join(&rel);
            fs::create_dir(&new_dir).map_err(|e| FsOpError::from_io("create directory", &new_dir, e))?;
            dirs.push(rel);
        } else if ft.is_symlink() {
            copy_symlink(entry.path(), &dest.join(&rel))?;
        } else {
            files.push(rel);
        }
    }

    files.par_iter().try_for_each(|rel| -> OpResult<()> {
        let from = src.join(rel);
        let to = dest.join(rel);
        copy_and_rename(&from, &to, true)?;
        debug!(src = %from.display(), dest = %to.display(), "copied file");
        Ok(())
    })?;

    // Children first, so adding entries doesn't bump a restored mtime.
    for rel in dirs.iter().rev() {
        if let Ok(meta) = fs::metadata(src.join(rel)) {
            preserve_metadata(&dest.join(rel), &meta);
        }
    }
    Ok(files.len())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> OpResult<()> {
    let target = fs::read_link(from).map_err(|e| FsOpError::from_io("read symlink", from, e))?;
    std::os::unix::fs::symlink(&target, to).map_err(|e| FsOpError::from_io("create symlink", to, e))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> OpResult<()> {
    copy_and_rename(from, to, true).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use assert_fs::prelude::*;

    fn cross_device_error() -> io::Error {
        #[cfg(unix)]
        {
            io::Error::from_raw_os_error(libc::EXDEV)
        }
        #[cfg(windows)]
        {
            io::Error::from_raw_os_error(17)
        }
    }

    fn populated(temp: &assert_fs::TempDir) -> PathBuf {
        let src = temp.child("src");
        src.child("a.txt").write_str("a").unwrap();
        src.child("nested/b.txt").write_str("b").unwrap();
        src.child("nested/deeper/c.txt").write_str("c").unwrap();
        src.child("empty").create_dir_all().unwrap();
        src.path().to_path_buf()
    }

    #[test]
    fn renames_within_filesystem() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.path().join("moved");

        assert_eq!(move_directory(&src, &dest).unwrap(), dest);
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dest.join("nested/b.txt")).unwrap(), "b");
    }

    #[test]
    fn simulated_cross_device_copies_tree() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.path().join("other").join("moved");

        move_directory_via(&src, &dest, |_, _| Err(cross_device_error())).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dest.join("nested/deeper/c.txt")).unwrap(), "c");
        assert!(dest.join("empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_recreated_not_followed() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        std::os::unix::fs::symlink("a.txt", src.join("link")).unwrap();
        let dest = temp.path().join("moved");

        move_directory_via(&src, &dest, |_, _| Err(cross_device_error())).unwrap();
        let link = dest.join("link");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("a.txt"));
    }

    #[test]
    fn existing_directory_receives_source_as_child() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.child("archive");
        dest.child("older.txt").write_str("kept").unwrap();

        let out = move_directory(&src, dest.path()).unwrap();
        assert_eq!(out, dest.path().join("src"));
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(out.join("nested/b.txt")).unwrap(), "b");
        dest.child("older.txt").assert("kept");
    }

    #[test]
    fn cross_device_into_existing_directory_lands_inside() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.child("archive");
        dest.create_dir_all().unwrap();

        let out = move_directory_via(&src, dest.path(), |_, _| Err(cross_device_error())).unwrap();
        assert_eq!(out, dest.path().join("src"));
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "a");
        assert!(!src.exists());
    }

    #[test]
    fn taken_child_name_is_refused() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.child("archive");
        dest.child("src").create_dir_all().unwrap();

        let err = move_directory(&src, dest.path()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::AlreadyExists);
        assert!(src.join("a.txt").exists());
    }

    #[test]
    fn file_at_destination_is_refused() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.child("plain.txt");
        dest.write_str("x").unwrap();

        let err = move_directory(&src, dest.path()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::AlreadyExists);
        assert!(src.is_dir());
    }

    #[test]
    fn source_must_be_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let f = temp.child("file");
        f.touch().unwrap();
        let err = move_directory(f.path(), &temp.path().join("x")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotADirectory);
        let err = move_directory(&temp.path().join("missing"), &temp.path().join("y")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[test]
    fn fatal_rename_error_is_not_copied() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = populated(&temp);
        let dest = temp.path().join("moved");

        let err = move_directory_via(&src, &dest, |_, _| Err(io::Error::from(io::ErrorKind::PermissionDenied)))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::PermissionDenied);
        assert!(!dest.exists());
        assert!(src.exists());
    }
}
