//! Resilient file operations.
//!
//! Every filesystem mutation goes through here: precondition checks,
//! retrying with transient/fatal classification, atomic moves and copies
//! that survive filesystem boundaries, secure multi-pass deletion, disk
//! space accounting and an atomic transform-and-commit primitive.
//!
//! All operations are synchronous and return [`OpResult`]; the error's
//! [`FailureKind`] says what went wrong and its `Display` says where.

pub mod checks;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod retry;

pub use checks::{Permission, accessible, exists, has_access, is_directory, target_writable};
pub use config::{
    Config, LogLevel, default_config_path, default_log_path, load_config, load_config_from_xml_path,
    parse_config_xml, path_has_symlink_ancestor, render_config_xml,
};
pub use errors::{FailureKind, FsOpError, OpResult};
pub use fs_ops::{
    CopyOptions, DEFAULT_PROCESS_BUFFER, DEFAULT_SECURE_PASSES, DEFAULT_TEMP_PREFIX, MoveOptions,
    ProcessOptions, ProcessOutcome, SpaceInfo, TargetLock, TempFileOptions, acquire_target_lock,
    check_permission, copy_file, create_temp_file, delete_directory, delete_file, ensure_directory_exists,
    format_bytes, get_space, has_sufficient_space, identity, move_directory, move_file, owner_mode,
    safe_process, secure_delete_file, set_permissions, try_acquire_target_lock,
};
pub use retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy, is_transient, retry};
