use std::io;
use std::path::{Path, PathBuf};

/// Directory a new entry at `path` would be created in ("." for bare names).
pub(crate) fn parent_or_cwd(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True only for the "rename across filesystems" condition; nothing else
/// may trigger the non-atomic copy fallback.
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        // ERROR_NOT_SAME_DEVICE
        #[cfg(windows)]
        Some(code) => code == 17,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

/// True when both paths resolve to the same file on disk.
#[cfg(unix)]
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(x), Ok(y)) => x.dev() == y.dev() && x.ino() == y.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

#[cfg(unix)]
pub(crate) fn fsync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub(crate) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_bare_name_is_cwd() {
        assert_eq!(parent_or_cwd(Path::new("out.bin")), PathBuf::from("."));
        assert_eq!(parent_or_cwd(Path::new("/a/b/out.bin")), PathBuf::from("/a/b"));
    }

    #[test]
    fn same_file_sees_through_path_spelling() {
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        std::fs::write(&a, b"x").unwrap();
        std::fs::write(&b, b"x").unwrap();
        assert!(same_file(&a, &td.path().join(".").join("a")));
        assert!(!same_file(&a, &b));
        assert!(!same_file(&a, &td.path().join("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn only_exdev_counts_as_cross_device() {
        assert!(is_cross_device(&io::Error::from_raw_os_error(libc::EXDEV)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(libc::EBUSY)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(libc::EACCES)));
        assert!(!is_cross_device(&io::Error::from(io::ErrorKind::Other)));
    }
}
