//! Streaming copy into an already-created destination handle.
//!
//! - Linux: tries `copy_file_range` first (in-kernel copy), falling back to
//!   buffered streaming when the kernel or filesystem refuses.
//! - Elsewhere: buffered `io::copy` with 1 MiB buffers.
//! - Always ends with `sync_all` on the destination; callers own the rename
//!   and the parent-directory sync.
//!
//! The source is read once from start to EOF. Bytes appended concurrently
//! after EOF is observed are not included.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

pub(crate) const COPY_BUF_SIZE: usize = 1024 * 1024;

/// Copy all of `src` into `dst` (positioned at its start) and fsync `dst`.
pub(crate) fn copy_into(src: &mut File, dst: &mut File) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        if let Some(bytes) = copy_file_range_all(src, dst)? {
            dst.sync_all()?;
            return Ok(bytes);
        }
    }

    let mut reader = BufReader::with_capacity(COPY_BUF_SIZE, src);
    let mut writer = BufWriter::with_capacity(COPY_BUF_SIZE, &mut *dst);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    drop(writer);
    dst.sync_all()?;
    Ok(bytes)
}

/// `Ok(None)` means "not supported here, stream instead"; only returned when
/// nothing has been copied yet.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: usize = 16 * 1024 * 1024;
    let mut total: u64 = 0;
    loop {
        let rc = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                CHUNK,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
            continue;
        }
        if rc == 0 {
            return Ok(Some(total));
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            continue;
        }
        let unsupported = matches!(
            err.raw_os_error(),
            Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EPERM | libc::EOPNOTSUPP)
        );
        if total == 0 && unsupported {
            return Ok(None);
        }
        return Err(err);
    }
}
