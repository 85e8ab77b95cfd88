//! Native synchronization back-ends.
//!
//! One trait, one implementation compiled per target:
//! - `pthread`: POSIX mutexes and condition variables through `libc`, with
//!   absolute `timespec` deadlines. Default on unix.
//! - `portable`: `parking_lot` primitives with relative, millisecond-rounded
//!   waits recomputed from the clock. Used off unix, or on unix with the
//!   `portable` feature.

use gcmt_core::pthread::WaitOutcome;
use gcmt_core::{GcmtResult, WtTime};

#[cfg(any(not(unix), feature = "portable"))]
mod portable;
#[cfg(all(unix, not(feature = "portable")))]
mod pthread;

#[cfg(any(not(unix), feature = "portable"))]
pub(crate) type Backend = portable::PortableBackend;
#[cfg(all(unix, not(feature = "portable")))]
pub(crate) type Backend = pthread::PthreadBackend;

pub(crate) type RawMutex = <Backend as SyncBackend>::RawMutex;
pub(crate) type RawGuard<'a> = <Backend as SyncBackend>::Guard<'a>;
pub(crate) type RawCond = <Backend as SyncBackend>::RawCond;

/// Operations every back-end provides.
///
/// Guards are proof of ownership: a `Guard` exists exactly while the
/// calling thread holds the mutex it was produced from.
pub(crate) trait SyncBackend {
    const NAME: &'static str;

    type RawMutex: Send + Sync;
    type Guard<'a>;
    type RawCond: Send + Sync;

    /// Wall clock in nicks; [`WtTime::ZERO`] if the clock cannot be read.
    fn now() -> WtTime;

    fn mutex_new() -> GcmtResult<Self::RawMutex>;
    fn mutex_lock(mutex: &Self::RawMutex) -> GcmtResult<Self::Guard<'_>>;
    fn mutex_try_lock(mutex: &Self::RawMutex) -> GcmtResult<Option<Self::Guard<'_>>>;
    fn mutex_unlock(guard: Self::Guard<'_>) -> GcmtResult<()>;
    /// Rebuild a guard for a lock whose original guard was forgotten.
    ///
    /// # Safety
    /// The calling thread must hold `mutex` and no other guard for it may
    /// be live.
    unsafe fn mutex_assume_locked(mutex: &Self::RawMutex) -> Self::Guard<'_>;
    fn mutex_destroy(mutex: Self::RawMutex) -> GcmtResult<()>;

    fn cond_new() -> GcmtResult<Self::RawCond>;
    fn cond_wait(cond: &Self::RawCond, guard: &mut Self::Guard<'_>) -> GcmtResult<()>;
    fn cond_wait_until(
        cond: &Self::RawCond,
        guard: &mut Self::Guard<'_>,
        deadline: WtTime,
    ) -> GcmtResult<WaitOutcome>;
    fn cond_notify_one(cond: &Self::RawCond) -> GcmtResult<()>;
    fn cond_notify_all(cond: &Self::RawCond) -> GcmtResult<()>;
    fn cond_destroy(cond: Self::RawCond) -> GcmtResult<()>;
}
