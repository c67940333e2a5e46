//! Disk space accounting for the filesystem holding a path.

use std::path::Path;
use tracing::{debug, warn};

use crate::checks::exists_as;
use crate::errors::{FsOpError, OpResult};
use crate::platform::disk_usage;

/// Point-in-time usage snapshot, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceInfo {
    pub total: u64,
    /// `total - free`
    pub used: u64,
    /// Free space including superuser-reserved blocks
    pub free: u64,
    /// Free space usable by the calling user
    pub available: u64,
}

pub fn get_space(path: &Path) -> OpResult<SpaceInfo> {
    exists_as(path, "Path")?;
    let u = disk_usage(path).map_err(|e| FsOpError::from_io("stat filesystem", path, e))?;
    Ok(SpaceInfo {
        total: u.total,
        used: u.total.saturating_sub(u.free),
        free: u.free,
        available: u.available,
    })
}

/// True when at least `required` bytes are available to the caller.
///
/// Advisory only: another writer can consume the space before it is used.
pub fn has_sufficient_space(path: &Path, required: u64) -> OpResult<bool> {
    let info = get_space(path)?;
    let ok = info.available >= required;
    if ok {
        debug!(path = %path.display(), required, available = info.available, "sufficient disk space");
    } else {
        warn!(
            path = %path.display(),
            required = %format_bytes(required),
            available = %format_bytes(info.available),
            "Insufficient disk space"
        );
    }
    Ok(ok)
}

/// Binary-unit rendering: `512 B`, `1.5 KiB`, `3.0 GiB`.
pub fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if n < 1024 {
        return format!("{n} B");
    }
    let mut value = n as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use tempfile::tempdir;

    #[test]
    fn snapshot_is_consistent() {
        let td = tempdir().unwrap();
        let s = get_space(td.path()).unwrap();
        assert!(s.total > 0);
        assert_eq!(s.used, s.total - s.free);
        assert!(s.available <= s.total);
    }

    #[test]
    fn sufficiency_bounds() {
        let td = tempdir().unwrap();
        assert!(has_sufficient_space(td.path(), 0).unwrap());
        assert!(!has_sufficient_space(td.path(), u64::MAX).unwrap());
    }

    #[test]
    fn missing_path_is_not_found() {
        let td = tempdir().unwrap();
        let err = get_space(&td.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(has_sufficient_space(&td.path().join("nope"), 1).is_err());
    }

    #[test]
    fn formats_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
