//! Error taxonomy shared by every gcmt crate.

use thiserror::Error;

use crate::errno;

/// Failure reported by a construction, locking or lifecycle call.
///
/// Timeouts are deliberately absent: a timed wait that expires reports
/// `false`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GcmtError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The OS refused to create or operate a primitive (resource exhaustion,
    /// permission, ...). Propagated to the caller, never retried.
    #[error("{op} failed: {} ({errno})", errno_label(.errno))]
    Os { op: &'static str, errno: i32 },
    /// A wait or signal primitive failed in a way that is unreachable under
    /// correct usage.
    #[error("{op} contract violation: {} ({errno})", errno_label(.errno))]
    ContractViolation { op: &'static str, errno: i32 },
}

impl GcmtError {
    /// errno-style code for the C boundary.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => errno::EINVAL,
            Self::Os { errno, .. } | Self::ContractViolation { errno, .. } => *errno,
        }
    }

    /// Returns true for errors that indicate misuse or a platform bug rather
    /// than a recoverable OS condition.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

fn errno_label(errno: &i32) -> &'static str {
    errno::errno_name(*errno)
}

pub type GcmtResult<T> = Result<T, GcmtError>;

/// Map a pthread-style return code (0 on success, errno otherwise).
pub fn check_os(op: &'static str, rc: i32) -> GcmtResult<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(GcmtError::Os { op, errno: rc })
    }
}
