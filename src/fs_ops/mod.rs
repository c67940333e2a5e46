//! Filesystem operations: modularized.

mod atomic;
mod copy;
mod delete;
mod dir_move;
mod file_move;
pub(crate) mod helpers;
mod io_copy;
mod lock;
mod metadata;
mod mkdir;
mod perms;
mod process;
mod space;
mod temp;
mod util;

pub use copy::{CopyOptions, copy_file};
pub use delete::{DEFAULT_SECURE_PASSES, delete_directory, delete_file, secure_delete_file};
pub use dir_move::move_directory;
pub use file_move::{MoveOptions, move_file};
pub use lock::{TargetLock, acquire_target_lock, try_acquire_target_lock};
pub use mkdir::ensure_directory_exists;
pub use perms::{check_permission, owner_mode, set_permissions};
pub use process::{DEFAULT_PROCESS_BUFFER, ProcessOptions, ProcessOutcome, identity, safe_process};
pub use space::{SpaceInfo, format_bytes, get_space, has_sufficient_space};
pub use temp::{DEFAULT_TEMP_PREFIX, TempFileOptions, create_temp_file};
