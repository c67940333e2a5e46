//! Directory creation helpers.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::errors::{FsOpError, OpResult};

/// Make sure `path` is a directory, creating it and any missing parents.
/// An existing non-directory at `path` is `NotADirectory`.
pub fn ensure_directory_exists(path: &Path) -> OpResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(FsOpError::NotADirectory {
                what: "Path exists but",
                path: path.to_path_buf(),
            });
        }
        Err(_) => {}
    }
    fs::create_dir_all(path).map_err(|e| FsOpError::from_io("create directory", path, e))?;
    info!(path = %path.display(), "Created directory");
    Ok(())
}

/// Create the parent directory of `path` if it has one and it is missing.
pub(crate) fn ensure_parent_exists(path: &Path) -> OpResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}
