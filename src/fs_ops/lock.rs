//! Advisory per-target lock.
//!
//! Writers to the same target path are last-writer-wins. Callers that need
//! one mover per target take a [`TargetLock`] first: an exclusive advisory
//! lock on a hidden sidecar `.<name>.safe_fileops.lock` next to the target.
//!
//! - The lock is released and the sidecar removed when the guard drops.
//! - Advisory only: code that skips the lock is not stopped.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::trace;

use crate::errors::{FsOpError, OpResult};

use super::util::parent_or_cwd;

/// RAII guard for an exclusive lock on a target path.
#[derive(Debug)]
pub struct TargetLock {
    file: File,
    path: PathBuf,
}

impl TargetLock {
    /// Sidecar lock file backing this guard.
    pub fn lock_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        // Remove the name first so a waiter that wins next recreates it.
        let _ = std::fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

pub(crate) fn lock_file_path(target: &Path) -> OpResult<PathBuf> {
    let name = target
        .file_name()
        .ok_or_else(|| FsOpError::invalid_input(format!("Target has no file name: {}", target.display())))?;
    let mut sidecar = std::ffi::OsString::from(".");
    sidecar.push(name);
    sidecar.push(".safe_fileops.lock");
    Ok(parent_or_cwd(target).join(sidecar))
}

fn open_sidecar(path: &Path) -> OpResult<File> {
    let mut opts = OpenOptions::new();
    opts.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path).map_err(|e| FsOpError::from_io("open lock file", path, e))
}

/// Block until the lock for `target` is held.
pub fn acquire_target_lock(target: &Path) -> OpResult<TargetLock> {
    let path = lock_file_path(target)?;
    let start = Instant::now();
    loop {
        let file = open_sidecar(&path)?;
        FileExt::lock_exclusive(&file).map_err(|e| FsOpError::from_io("lock target", &path, e))?;
        if still_linked(&file, &path) {
            trace!(path = %path.display(), waited_ms = start.elapsed().as_millis() as u64, "target lock acquired");
            return Ok(TargetLock { file, path });
        }
        trace!(path = %path.display(), "lock file was replaced while waiting; retrying");
    }
}

/// Non-blocking form: `Ok(None)` if another holder has the lock.
pub fn try_acquire_target_lock(target: &Path) -> OpResult<Option<TargetLock>> {
    let path = lock_file_path(target)?;
    loop {
        let file = open_sidecar(&path)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) if still_linked(&file, &path) => {
                trace!(path = %path.display(), "target try-lock success");
                return Ok(Some(TargetLock { file, path }));
            }
            Ok(()) => continue,
            Err(e) if is_contended(&e) => {
                trace!(path = %path.display(), "target try-lock would block");
                return Ok(None);
            }
            Err(e) => return Err(FsOpError::from_io("lock target", &path, e)),
        }
    }
}

/// A holder that just released may have unlinked the sidecar we locked.
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> bool {
    path.exists()
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_target() {
        let p = lock_file_path(Path::new("/data/out/movie.mkv")).unwrap();
        assert_eq!(p, PathBuf::from("/data/out/.movie.mkv.safe_fileops.lock"));
        assert!(lock_file_path(Path::new("/")).is_err());
    }

    #[test]
    fn second_try_lock_is_refused_until_release() {
        let td = tempdir().unwrap();
        let target = td.path().join("t.bin");

        let held = acquire_target_lock(&target).unwrap();
        assert!(held.lock_path().exists());
        assert!(try_acquire_target_lock(&target).unwrap().is_none());

        drop(held);
        let again = try_acquire_target_lock(&target).unwrap();
        assert!(again.is_some());
        drop(again);
        assert!(!lock_file_path(&target).unwrap().exists());
    }

    #[test]
    fn distinct_targets_do_not_contend() {
        let td = tempdir().unwrap();
        let _a = acquire_target_lock(&td.path().join("a")).unwrap();
        assert!(try_acquire_target_lock(&td.path().join("b")).unwrap().is_some());
    }
}
