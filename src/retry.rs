//! Retry-with-backoff for OS operations.
//!
//! Only transient errors (interrupted call, temporarily unavailable, busy)
//! are retried. Anything else is classified and returned on first sight.

use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::{FsOpError, OpResult};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How often and for how long an operation may be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first (0 is treated as 1)
    pub max_attempts: u32,
    /// Sleep between a transient failure and the next attempt
    pub delay: Duration,
    /// Optional overall budget, checked before each attempt after the first
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no sleeping.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            deadline: None,
        }
    }

    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// EINTR, EAGAIN/EWOULDBLOCK and EBUSY are worth another try.
pub fn is_transient(e: &io::Error) -> bool {
    match e.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::ResourceBusy => {
            return true;
        }
        _ => {}
    }
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EINTR || code == libc::EAGAIN || code == libc::EBUSY,
        // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
        #[cfg(windows)]
        Some(code) => code == 32 || code == 33,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

/// Strictly past: an attempt starting exactly at the deadline still runs.
fn deadline_passed(elapsed: Duration, deadline: Duration) -> bool {
    elapsed > deadline
}

/// Run `f` under `policy`. `op` and `path` only feed error messages and logs.
///
/// Returns `Timeout` when the deadline has passed before an attempt,
/// `RetriesExhausted` when every attempt failed transiently, and the
/// classified error for any fatal failure.
pub fn retry<T, F>(op: &str, path: &Path, policy: &RetryPolicy, mut f: F) -> OpResult<T>
where
    F: FnMut() -> io::Result<T>,
{
    let max = policy.attempts();
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0
            && let Some(deadline) = policy.deadline
        {
            let elapsed = start.elapsed();
            if deadline_passed(elapsed, deadline) {
                warn!(op, path = %path.display(), attempts = attempt, elapsed_ms = elapsed.as_millis() as u64, "deadline elapsed before next attempt");
                return Err(FsOpError::Timeout {
                    op: op.to_string(),
                    elapsed,
                    attempts: attempt,
                });
            }
        }

        attempt += 1;
        match f() {
            Ok(v) => {
                if attempt > 1 {
                    debug!(op, path = %path.display(), attempt, "succeeded after retry");
                }
                return Ok(v);
            }
            Err(e) if is_transient(&e) => {
                if attempt >= max {
                    warn!(op, path = %path.display(), attempts = attempt, error = %e, "transient error persisted; giving up");
                    return Err(FsOpError::RetriesExhausted {
                        op: op.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
                warn!(op, path = %path.display(), attempt, max, error = %e, "transient error; retrying");
                if !policy.delay.is_zero() {
                    sleep(policy.delay);
                }
            }
            Err(e) => return Err(FsOpError::from_io(op, path, e)),
        }
    }
}
