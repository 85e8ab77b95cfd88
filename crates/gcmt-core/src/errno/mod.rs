//! Error number definitions.
//!
//! The native back-ends report failures as raw errno values. The constants are
//! taken from the host `libc` so that classification matches what
//! `pthread_*` actually returns on the target.

pub use libc::{EAGAIN, EBUSY, EDEADLK, EINTR, EINVAL, ENOMEM, EPERM, ESRCH, ETIMEDOUT};

/// Human-readable name for the errno values this layer produces.
#[must_use]
pub fn errno_name(errno: i32) -> &'static str {
    match errno {
        0 => "OK",
        EAGAIN => "EAGAIN",
        EBUSY => "EBUSY",
        EDEADLK => "EDEADLK",
        EINTR => "EINTR",
        EINVAL => "EINVAL",
        ENOMEM => "ENOMEM",
        EPERM => "EPERM",
        ESRCH => "ESRCH",
        ETIMEDOUT => "ETIMEDOUT",
        _ => "EUNKNOWN",
    }
}
