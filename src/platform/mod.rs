//! Platform-specific helpers.
//! Hides the Unix/Windows split for filesystem statistics and log file
//! opening behind one API.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{disk_usage, open_log_file_secure_append};

#[cfg(not(unix))]
pub use windows::{disk_usage, open_log_file_secure_append};

/// Raw byte counts for the filesystem holding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    /// Free blocks including those reserved for the superuser
    pub free: u64,
    /// Free space usable by the calling user
    pub available: u64,
}
