//! Deletion: plain unlink, multi-pass overwrite-then-unlink, directories.

use rand::RngCore;
use std::fs::{self, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::checks::{exists_as, is_directory_as};
use crate::errors::{FsOpError, OpResult};

pub const DEFAULT_SECURE_PASSES: u32 = 3;

const OVERWRITE_CHUNK: usize = 64 * 1024;

fn reject_directory(path: &Path) -> OpResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| FsOpError::from_io("stat file", path, e))?;
    if meta.is_dir() {
        return Err(FsOpError::invalid_input(format!(
            "Path is a directory, not a file: {} (use delete_directory)",
            path.display()
        )));
    }
    Ok(())
}

/// Unlink a file. A symlink is removed, not its target.
pub fn delete_file(path: &Path) -> OpResult<()> {
    exists_as(path, "File")?;
    reject_directory(path)?;
    fs::remove_file(path).map_err(|e| FsOpError::from_io("delete file", path, e))?;
    info!(path = %path.display(), "File deleted");
    Ok(())
}

/// Overwrite a file's bytes `passes` times in place, syncing each pass to
/// disk, then unlink it.
///
/// Pass 1 writes zeros, pass 2 writes 0xFF, every later pass writes fresh
/// random bytes from the thread-local CSPRNG (new bytes per chunk). On
/// copy-on-write or journaling filesystems and SSDs the old blocks may
/// survive regardless; this is best-effort erasure.
pub fn secure_delete_file(path: &Path, passes: u32) -> OpResult<()> {
    exists_as(path, "File")?;
    reject_directory(path)?;

    let size = fs::metadata(path)
        .map_err(|e| FsOpError::from_io("stat file", path, e))?
        .len();

    if size > 0 && passes > 0 {
        overwrite_passes(path, size, passes)
            .map_err(|e| FsOpError::from_io("overwrite file for secure delete", path, e))?;
    }

    fs::remove_file(path).map_err(|e| FsOpError::from_io("delete file", path, e))?;
    info!(path = %path.display(), passes, bytes = size, "File securely deleted");
    Ok(())
}

fn overwrite_passes(path: &Path, size: u64, passes: u32) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).open(path)?;
    let mut buf = vec![0u8; OVERWRITE_CHUNK];
    let mut rng = rand::rng();

    for pass in 0..passes {
        match pass {
            0 => buf.fill(0x00),
            1 => buf.fill(0xFF),
            _ => {}
        }
        f.seek(SeekFrom::Start(0))?;
        let mut remaining = size;
        while remaining > 0 {
            let n = remaining.min(OVERWRITE_CHUNK as u64) as usize;
            if pass >= 2 {
                rng.fill_bytes(&mut buf[..n]);
            }
            f.write_all(&buf[..n])?;
            remaining -= n as u64;
        }
        f.flush()?;
        f.sync_all()?;
        debug!(path = %path.display(), pass = pass + 1, passes, "overwrite pass synced");
    }
    Ok(())
}

/// Remove a directory. Without `recursive`, a directory with entries fails
/// with `NotEmpty`.
pub fn delete_directory(path: &Path, recursive: bool) -> OpResult<()> {
    is_directory_as(path, "Directory")?;

    if recursive {
        fs::remove_dir_all(path).map_err(|e| FsOpError::from_io("delete directory tree", path, e))?;
        info!(path = %path.display(), "Directory recursively deleted");
        return Ok(());
    }

    match fs::remove_dir(path) {
        Ok(()) => {
            info!(path = %path.display(), "Empty directory deleted");
            Ok(())
        }
        // Some platforms report a non-empty directory as EEXIST.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(FsOpError::NotEmpty(path.to_path_buf())),
        Err(e) => Err(FsOpError::from_io("delete directory", path, e)),
    }
}
