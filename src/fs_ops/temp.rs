//! Temporary file creation.
//!
//! Names are `<prefix><random><suffix>` created with O_EXCL semantics by
//! `tempfile`. The file is owned by a guard that unlinks it on drop until
//! the caller explicitly keeps or commits it, so early returns never leave
//! an orphan behind.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::checks::accessible;
use crate::errors::{FsOpError, OpResult};

pub const DEFAULT_TEMP_PREFIX: &str = "safe_fileops_";

/// Options for [`create_temp_file`].
#[derive(Debug, Clone)]
pub struct TempFileOptions<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
    /// Written and fsynced when present
    pub content: Option<&'a [u8]>,
    /// Defaults to the system temp directory
    pub dir: Option<&'a Path>,
}

impl Default for TempFileOptions<'_> {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_TEMP_PREFIX,
            suffix: "",
            content: None,
            dir: None,
        }
    }
}

/// Create a uniquely named file in `dir`, still guarded (deleted on drop).
pub(crate) fn new_guarded_temp(dir: &Path, prefix: &str, suffix: &str) -> OpResult<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .rand_bytes(12)
        .tempfile_in(dir)
        .map_err(|e| FsOpError::from_io("create temporary file", dir, e))
}

/// Create a temporary file and return its path. The file outlives the call;
/// removing it is the caller's job.
///
/// If writing or syncing `content` fails, the file is removed before the
/// error is returned.
pub fn create_temp_file(opts: &TempFileOptions<'_>) -> OpResult<PathBuf> {
    let dir = match opts.dir {
        Some(d) => {
            accessible(d)?;
            d.to_path_buf()
        }
        None => std::env::temp_dir(),
    };

    let mut tmp = new_guarded_temp(&dir, opts.prefix, opts.suffix)?;

    if let Some(content) = opts.content {
        let path = tmp.path().to_path_buf();
        tmp.write_all(content)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| FsOpError::from_io("write temporary file", &path, e))?;
    }

    let (_file, path) = tmp
        .keep()
        .map_err(|e| FsOpError::from_io("keep temporary file", &dir, e.error))?;
    info!(path = %path.display(), "Created temporary file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn creates_file_with_content_in_dir() {
        let td = tempdir().unwrap();
        let opts = TempFileOptions {
            prefix: "unit_",
            suffix: ".bin",
            content: Some(b"payload"),
            dir: Some(td.path()),
        };
        let path = create_temp_file(&opts).unwrap();
        assert!(path.starts_with(td.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("unit_") && name.ends_with(".bin"), "name: {name}");
        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn names_do_not_collide() {
        let td = tempdir().unwrap();
        let opts = TempFileOptions {
            dir: Some(td.path()),
            ..Default::default()
        };
        let a = create_temp_file(&opts).unwrap();
        let b = create_temp_file(&opts).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn guarded_temp_is_removed_on_drop() {
        let td = tempdir().unwrap();
        let path = {
            let tmp = new_guarded_temp(td.path(), ".x_", ".tmp").unwrap();
            tmp.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn missing_parent_chain_is_not_found() {
        let opts = TempFileOptions {
            dir: Some(Path::new("/definitely/not/here/safe_fileops")),
            ..Default::default()
        };
        // The root always exists, so accessibility is decided by permissions
        // on "/"; creating inside the missing dir must fail either way.
        assert!(create_temp_file(&opts).is_err());
    }
}
