//! Reading the wall clock.

use gcmt_core::WtTime;

use crate::backend::{Backend, SyncBackend};

/// Current wall-clock time in nicks since 1601.
///
/// Never fails: if the host clock cannot be read the result is
/// [`WtTime::ZERO`].
#[must_use]
pub fn now() -> WtTime {
    Backend::now()
}

/// Absolute deadline `millis` milliseconds from now.
#[must_use]
pub fn deadline_after(millis: u32) -> WtTime {
    now().advance(millis)
}
