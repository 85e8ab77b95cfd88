//! Condition-variable return-code classification.
//!
//! Timed waits take an absolute deadline. The only two legitimate results
//! are "notified" and "deadline passed"; anything else from the host means
//! the caller broke the usage contract (wrong mutex, mutex not held,
//! destroyed object) and is reported as [`GcmtError::ContractViolation`].
//! The native layer treats that as fatal.

use crate::errno;
use crate::error::{GcmtError, GcmtResult};

/// Why a timed wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken by a notify (or spuriously; callers re-check their predicate).
    Notified,
    /// The absolute deadline elapsed first.
    TimedOut,
}

impl WaitOutcome {
    /// `true` if woken by a notify.
    #[must_use]
    pub const fn was_notified(self) -> bool {
        matches!(self, Self::Notified)
    }
}

/// Classify a `pthread_cond_timedwait` return code.
pub fn classify_timed_wait(rc: i32) -> GcmtResult<WaitOutcome> {
    match rc {
        0 => Ok(WaitOutcome::Notified),
        errno::ETIMEDOUT => Ok(WaitOutcome::TimedOut),
        _ => Err(GcmtError::ContractViolation {
            op: "cond_timedwait",
            errno: rc,
        }),
    }
}

/// Classify a `pthread_cond_wait` return code.
pub fn classify_wait(rc: i32) -> GcmtResult<()> {
    match rc {
        0 => Ok(()),
        _ => Err(GcmtError::ContractViolation {
            op: "cond_wait",
            errno: rc,
        }),
    }
}

/// Classify a `pthread_cond_signal` / `pthread_cond_broadcast` return code.
pub fn classify_signal(op: &'static str, rc: i32) -> GcmtResult<()> {
    match rc {
        0 => Ok(()),
        _ => Err(GcmtError::ContractViolation { op, errno: rc }),
    }
}
