//! Portable back-end on `parking_lot`.
//!
//! Timed waits follow the millisecond-relative model: the absolute deadline
//! is turned into a wait of `deadline - now` milliseconds, rounded up and
//! clamped at zero, each time a wait starts.

use std::time::SystemTime;

use gcmt_core::pthread::WaitOutcome;
use gcmt_core::{GcmtResult, WtTime};
use parking_lot::{Condvar, Mutex, MutexGuard};

use super::SyncBackend;

pub(crate) struct PortableBackend;

impl SyncBackend for PortableBackend {
    const NAME: &'static str = "portable";

    type RawMutex = Mutex<()>;
    type Guard<'a> = MutexGuard<'a, ()>;
    type RawCond = Condvar;

    fn now() -> WtTime {
        WtTime::from_system_time(SystemTime::now())
    }

    fn mutex_new() -> GcmtResult<Mutex<()>> {
        Ok(Mutex::new(()))
    }

    fn mutex_lock(mutex: &Mutex<()>) -> GcmtResult<MutexGuard<'_, ()>> {
        Ok(mutex.lock())
    }

    fn mutex_try_lock(mutex: &Mutex<()>) -> GcmtResult<Option<MutexGuard<'_, ()>>> {
        Ok(mutex.try_lock())
    }

    fn mutex_unlock(guard: MutexGuard<'_, ()>) -> GcmtResult<()> {
        drop(guard);
        Ok(())
    }

    unsafe fn mutex_assume_locked(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
        // SAFETY: forwarded from the caller's contract.
        unsafe { mutex.make_guard_unchecked() }
    }

    fn mutex_destroy(mutex: Mutex<()>) -> GcmtResult<()> {
        drop(mutex);
        Ok(())
    }

    fn cond_new() -> GcmtResult<Condvar> {
        Ok(Condvar::new())
    }

    fn cond_wait(cond: &Condvar, guard: &mut MutexGuard<'_, ()>) -> GcmtResult<()> {
        cond.wait(guard);
        Ok(())
    }

    fn cond_wait_until(
        cond: &Condvar,
        guard: &mut MutexGuard<'_, ()>,
        deadline: WtTime,
    ) -> GcmtResult<WaitOutcome> {
        let timeout = deadline.duration_until(Self::now());
        let result = cond.wait_for(guard, timeout);
        Ok(if result.timed_out() {
            WaitOutcome::TimedOut
        } else {
            WaitOutcome::Notified
        })
    }

    fn cond_notify_one(cond: &Condvar) -> GcmtResult<()> {
        cond.notify_one();
        Ok(())
    }

    fn cond_notify_all(cond: &Condvar) -> GcmtResult<()> {
        cond.notify_all();
        Ok(())
    }

    fn cond_destroy(cond: Condvar) -> GcmtResult<()> {
        drop(cond);
        Ok(())
    }
}
