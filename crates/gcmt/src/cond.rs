//! Condition variables with absolute-deadline waits.
//!
//! Waits may wake spuriously; callers re-check their predicate in a loop.
//! A host failure from wait or notify means the usage contract was broken
//! (waiting without holding the mutex, mixing mutexes) and panics.

use std::fmt;
use std::mem::ManuallyDrop;

use gcmt_core::{GcmtError, GcmtResult, WtTime};

use crate::backend::{Backend, RawCond, SyncBackend};
use crate::mutex::MutexGuard;

pub struct Condvar {
    raw: ManuallyDrop<RawCond>,
}

#[cold]
fn contract_violation(err: GcmtError) -> ! {
    log::error!("gcmt: {err}");
    panic!("gcmt: {err}");
}

impl Condvar {
    pub fn new() -> GcmtResult<Self> {
        Ok(Self {
            raw: ManuallyDrop::new(Backend::cond_new()?),
        })
    }

    /// Wake at least one waiter, if any.
    pub fn notify_one(&self) {
        Backend::cond_notify_one(&self.raw).unwrap_or_else(|err| contract_violation(err));
    }

    /// Wake every current waiter.
    pub fn notify_all(&self) {
        Backend::cond_notify_all(&self.raw).unwrap_or_else(|err| contract_violation(err));
    }

    /// Atomically release the guard's mutex and sleep until notified.
    /// The mutex is held again on return.
    pub fn wait(&self, guard: &mut MutexGuard<'_>) {
        Backend::cond_wait(&self.raw, guard.raw_mut()).unwrap_or_else(|err| contract_violation(err));
    }

    /// Like [`wait`](Self::wait) but gives up at `deadline`.
    ///
    /// Returns `true` if woken by a notify (or spuriously) and `false` if the
    /// deadline passed. A deadline already in the past returns `false`
    /// promptly. The mutex is held again on return either way.
    pub fn wait_until(&self, guard: &mut MutexGuard<'_>, deadline: WtTime) -> bool {
        Backend::cond_wait_until(&self.raw, guard.raw_mut(), deadline)
            .unwrap_or_else(|err| contract_violation(err))
            .was_notified()
    }

    pub fn destroy(self) -> GcmtResult<()> {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: destructor suppressed; the raw object is taken exactly once.
        let raw = unsafe { ManuallyDrop::take(&mut this.raw) };
        Backend::cond_destroy(raw)
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        // SAFETY: `drop` runs at most once and nothing reads `raw` afterwards.
        let raw = unsafe { ManuallyDrop::take(&mut self.raw) };
        if let Err(err) = Backend::cond_destroy(raw) {
            log::warn!("gcmt: dropping condvar: {err}");
        }
    }
}

impl fmt::Debug for Condvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condvar").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::mutex::Mutex;
    use crate::time::now;

    #[test]
    fn past_deadline_times_out_immediately() {
        let m = Mutex::new().unwrap();
        let c = Condvar::new().unwrap();
        let mut g = m.lock().unwrap();
        assert!(!c.wait_until(&mut g, now().retreat(10)));
        // Still held after the wait.
        assert!(m.try_lock().unwrap().is_none());
    }

    #[test]
    fn notify_wakes_waiter() {
        let m = Mutex::new().unwrap();
        let c = Condvar::new().unwrap();
        let ready = AtomicBool::new(false);
        std::thread::scope(|s| {
            s.spawn(|| {
                let mut g = m.lock().unwrap();
                while !ready.load(Ordering::Relaxed) {
                    c.wait(&mut g);
                }
            });
            let g = m.lock().unwrap();
            ready.store(true, Ordering::Relaxed);
            c.notify_all();
            drop(g);
        });
        c.destroy().unwrap();
    }

    #[test]
    fn notify_without_waiters_is_harmless() {
        let c = Condvar::new().unwrap();
        c.notify_one();
        c.notify_all();
    }
}
