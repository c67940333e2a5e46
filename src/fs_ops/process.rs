//! Transform-and-commit.
//!
//! `safe_process` streams a source file through a caller-supplied transform
//! into a hidden temp file next to the target, fsyncs it, renames it over the
//! target and only then removes the source. Until the rename the target is
//! untouched and the temp file is owned by a guard, so any failure leaves
//! neither a partial target nor a stray temp behind.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::checks::{exists_as, target_writable};
use crate::errors::{FsOpError, OpResult};
use crate::retry::{RetryPolicy, retry};

use super::atomic::try_atomic_move;
use super::delete::{DEFAULT_SECURE_PASSES, delete_file, secure_delete_file};
use super::mkdir::ensure_directory_exists;
use super::temp::new_guarded_temp;
use super::util::{parent_or_cwd, same_file};

pub const DEFAULT_PROCESS_BUFFER: usize = 8192;
pub(crate) const PROCESS_TEMP_PREFIX: &str = ".safe_process_";
pub(crate) const PROCESS_TEMP_SUFFIX: &str = ".tmp";

/// Options for [`safe_process`].
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Read chunk size handed to the transform; must be non-zero
    pub buffer_size: usize,
    /// Overwrite-then-unlink the source instead of a plain unlink
    pub secure_delete: bool,
    pub secure_passes: u32,
    /// Create the target's parent directory if missing
    pub create_dirs: bool,
    pub overwrite: bool,
    /// Applied to the final rename
    pub retry: RetryPolicy,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_PROCESS_BUFFER,
            secure_delete: false,
            secure_passes: DEFAULT_SECURE_PASSES,
            create_dirs: true,
            overwrite: false,
            retry: RetryPolicy::default(),
        }
    }
}

/// What a successful [`safe_process`] produced.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub target: PathBuf,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub source_removed: bool,
    /// Set when the target was committed but removing the source failed
    pub source_cleanup_error: Option<FsOpError>,
}

/// Pass-through transform.
pub fn identity(chunk: &[u8]) -> io::Result<Vec<u8>> {
    Ok(chunk.to_vec())
}

/// Stream `source` through `transform` into `target`, then remove `source`.
///
/// The transform sees the file in chunks of at most `buffer_size` bytes, in
/// order. A failing transform aborts the whole operation. Failing to remove
/// the source after the commit does not: it is logged and reported in
/// [`ProcessOutcome::source_cleanup_error`].
///
/// When `source` and `target` name the same file (which needs `overwrite`),
/// the result replaces it in place and nothing is removed afterwards.
pub fn safe_process<F>(source: &Path, target: &Path, transform: F, opts: &ProcessOptions) -> OpResult<ProcessOutcome>
where
    F: FnMut(&[u8]) -> io::Result<Vec<u8>>,
{
    safe_process_via(source, target, transform, opts, try_atomic_move)
}

/// [`safe_process`] with the commit rename supplied by the caller.
pub(crate) fn safe_process_via<F, R>(
    source: &Path,
    target: &Path,
    mut transform: F,
    opts: &ProcessOptions,
    rename: R,
) -> OpResult<ProcessOutcome>
where
    F: FnMut(&[u8]) -> io::Result<Vec<u8>>,
    R: Fn(&Path, &Path) -> io::Result<()>,
{
    if opts.buffer_size == 0 {
        return Err(FsOpError::invalid_input("buffer_size must be greater than zero"));
    }
    exists_as(source, "Source file")?;
    target_writable(target, opts.overwrite)?;
    let in_place = same_file(source, target);

    let dir = parent_or_cwd(target);
    if opts.create_dirs {
        ensure_directory_exists(&dir)?;
    }

    let mut src_f = File::open(source).map_err(|e| FsOpError::from_io("open source", source, e))?;
    let mut tmp = new_guarded_temp(&dir, PROCESS_TEMP_PREFIX, PROCESS_TEMP_SUFFIX)?;
    debug!(tmp = %tmp.path().display(), "processing into temporary file");

    let (bytes_read, bytes_written) = pump(&mut src_f, tmp.as_file_mut(), &mut transform, opts.buffer_size)
        .map_err(|e| FsOpError::from_io("process into temporary file", source, e))?;
    drop(src_f);

    let tmp_path = tmp.into_temp_path();
    retry("commit processed file", target, &opts.retry, || rename(&tmp_path, target))?;
    let _ = tmp_path.keep();
    info!(
        src = %source.display(),
        dest = %target.display(),
        bytes_read,
        bytes_written,
        "Processed file committed"
    );

    let (source_removed, source_cleanup_error) = if in_place {
        debug!(path = %target.display(), "processed in place; source is the committed target");
        (false, None)
    } else {
        let cleanup = if opts.secure_delete {
            secure_delete_file(source, opts.secure_passes)
        } else {
            delete_file(source)
        };
        match cleanup {
            Ok(()) => (true, None),
            Err(e) => {
                warn!(src = %source.display(), error = %e, "Target committed but source could not be removed");
                (false, Some(e))
            }
        }
    };

    Ok(ProcessOutcome {
        target: target.to_path_buf(),
        bytes_read,
        bytes_written,
        source_removed,
        source_cleanup_error,
    })
}

fn pump<F>(src: &mut File, dst: &mut File, transform: &mut F, buffer_size: usize) -> io::Result<(u64, u64)>
where
    F: FnMut(&[u8]) -> io::Result<Vec<u8>>,
{
    let mut buf = vec![0u8; buffer_size];
    let mut read_total: u64 = 0;
    let mut written_total: u64 = 0;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        read_total += n as u64;
        let out = transform(&buf[..n])?;
        dst.write_all(&out)?;
        written_total += out.len() as u64;
    }
    dst.flush()?;
    dst.sync_all()?;
    Ok((read_total, written_total))
}
