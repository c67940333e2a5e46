//! Default path helpers and symlink checks.

use dirs::{config_dir, data_dir};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SAFE_FILEOPS_CONFIG";
const APP_DIR: &str = "safe_fileops";

/// `$SAFE_FILEOPS_CONFIG` when set, else the OS config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    config_dir()
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .map(|base| base.join(APP_DIR).join("config.xml"))
}

/// OS-appropriate log file location (data dir). Not created here.
pub fn default_log_path() -> Option<PathBuf> {
    data_dir()
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
        .map(|base| base.join(APP_DIR).join("safe_fileops.log"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if !anc.as_os_str().is_empty() && anc.exists() && fs::symlink_metadata(anc)?.file_type().is_symlink() {
            return Ok(true);
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn env_override_wins() {
        unsafe { std::env::set_var(CONFIG_ENV, "/tmp/custom/cfg.xml") };
        assert_eq!(default_config_path(), Some(PathBuf::from("/tmp/custom/cfg.xml")));
        unsafe { std::env::remove_var(CONFIG_ENV) };
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("safe_fileops/config.xml"));
        }
    }

    #[test]
    fn plain_path_has_no_symlink_ancestor() {
        let td = tempdir().unwrap();
        // macOS temp dirs live under the /var symlink
        let base = td.path().canonicalize().unwrap();
        assert!(!path_has_symlink_ancestor(&base.join("a").join("b.log")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_ancestor_is_detected() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, td.path().join("link")).unwrap();
        assert!(path_has_symlink_ancestor(&td.path().join("link").join("x.log")).unwrap());
    }
}
