//! Mutual exclusion.
//!
//! A [`Mutex`] guards no data of its own; callers decide what it protects.
//! Locking returns a [`MutexGuard`] that unlocks when dropped, or explicitly
//! through [`MutexGuard::unlock`] when the caller wants the result.
//! Non-recursive: locking a mutex already held by the calling thread
//! deadlocks (POSIX default kind), and `try_lock` reports it as busy.

use std::fmt;
use std::mem::ManuallyDrop;

use gcmt_core::GcmtResult;
use gcmt_core::pthread::{
    MutexContractOp, MutexContractState, classify_trylock, mutex_contract_transition,
};

use crate::backend::{Backend, RawGuard, RawMutex, SyncBackend};

pub struct Mutex {
    raw: ManuallyDrop<RawMutex>,
}

impl Mutex {
    /// Create an unlocked mutex. Fails only if the OS refuses the resource.
    pub fn new() -> GcmtResult<Self> {
        Ok(Self {
            raw: ManuallyDrop::new(Backend::mutex_new()?),
        })
    }

    /// Block until the calling thread owns the mutex.
    pub fn lock(&self) -> GcmtResult<MutexGuard<'_>> {
        let raw = Backend::mutex_lock(&self.raw)?;
        Ok(MutexGuard::new(raw))
    }

    /// Acquire without blocking; `Ok(None)` if another owner (or the calling
    /// thread itself) already holds it.
    pub fn try_lock(&self) -> GcmtResult<Option<MutexGuard<'_>>> {
        let raw = Backend::mutex_try_lock(&self.raw)?;
        debug_assert!(try_lock_matches_contract(raw.is_some()));
        Ok(raw.map(MutexGuard::new))
    }

    /// Guard for a lock taken earlier whose guard was passed to
    /// [`std::mem::forget`]. Lets callers that cannot keep a guard alive
    /// (C callers holding a lock across calls) unlock or wait later.
    ///
    /// # Safety
    /// The calling thread must currently hold this mutex, and no other guard
    /// for it may be live.
    pub unsafe fn make_guard_unchecked(&self) -> MutexGuard<'_> {
        // SAFETY: forwarded from the caller's contract.
        MutexGuard::new(unsafe { Backend::mutex_assume_locked(&self.raw) })
    }

    /// Release the native object and report the result. Dropping does the
    /// same but can only log a failure.
    pub fn destroy(self) -> GcmtResult<()> {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used again and its destructor is suppressed,
        // so the raw mutex is taken exactly once.
        let raw = unsafe { ManuallyDrop::take(&mut this.raw) };
        Backend::mutex_destroy(raw)
    }
}

/// Whether a `try_lock` result agrees with the contract table. A success
/// means the mutex was unlocked; "not acquired" means some owner held it.
fn try_lock_matches_contract(acquired: bool) -> bool {
    use MutexContractState as S;

    let from = if acquired { S::Unlocked } else { S::LockedByOther };
    let outcome = mutex_contract_transition(from, MutexContractOp::TryLock);
    !outcome.blocks
        && (outcome.next == S::LockedBySelf) == acquired
        && classify_trylock(outcome.errno) == Ok(acquired)
}

impl Drop for Mutex {
    fn drop(&mut self) {
        // SAFETY: `drop` runs at most once and nothing reads `raw` afterwards.
        let raw = unsafe { ManuallyDrop::take(&mut self.raw) };
        if let Err(err) = Backend::mutex_destroy(raw) {
            log::warn!("gcmt: dropping mutex: {err}");
        }
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex").finish_non_exhaustive()
    }
}

/// Proof that the calling thread holds a [`Mutex`].
#[must_use = "the mutex is unlocked as soon as the guard is dropped"]
pub struct MutexGuard<'a> {
    raw: ManuallyDrop<RawGuard<'a>>,
}

impl<'a> MutexGuard<'a> {
    fn new(raw: RawGuard<'a>) -> Self {
        Self {
            raw: ManuallyDrop::new(raw),
        }
    }

    pub(crate) fn raw_mut(&mut self) -> &mut RawGuard<'a> {
        &mut self.raw
    }

    /// Unlock now and report the result.
    pub fn unlock(self) -> GcmtResult<()> {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: destructor suppressed; the guard is taken exactly once.
        let raw = unsafe { ManuallyDrop::take(&mut this.raw) };
        Backend::mutex_unlock(raw)
    }
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: `drop` runs at most once and nothing reads `raw` afterwards.
        let raw = unsafe { ManuallyDrop::take(&mut self.raw) };
        if let Err(err) = Backend::mutex_unlock(raw) {
            log::warn!("gcmt: dropping mutex guard: {err}");
        }
    }
}

impl fmt::Debug for MutexGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_then_unlock() {
        let m = Mutex::new().unwrap();
        let g = m.lock().unwrap();
        g.unlock().unwrap();
        let g = m.lock().unwrap();
        drop(g);
        m.destroy().unwrap();
    }

    #[test]
    fn try_lock_on_held_mutex_is_not_acquired() {
        let m = Mutex::new().unwrap();
        let held = m.lock().unwrap();
        assert!(m.try_lock().unwrap().is_none());
        drop(held);
        let g = m.try_lock().unwrap();
        assert!(g.is_some());
    }

    #[test]
    fn try_lock_results_agree_with_contract_table() {
        assert!(try_lock_matches_contract(true));
        assert!(try_lock_matches_contract(false));

        let m = Mutex::new().unwrap();
        let held = m.try_lock().unwrap();
        assert!(held.is_some());
        assert!(m.try_lock().unwrap().is_none());
        drop(held);
        m.destroy().unwrap();
    }

    #[test]
    fn try_lock_from_other_thread_sees_owner() {
        let m = Mutex::new().unwrap();
        let held = m.lock().unwrap();
        std::thread::scope(|s| {
            s.spawn(|| assert!(m.try_lock().unwrap().is_none()));
        });
        drop(held);
        std::thread::scope(|s| {
            s.spawn(|| assert!(m.try_lock().unwrap().is_some()));
        });
    }

    #[test]
    fn forgotten_guard_can_be_rebuilt() {
        let m = Mutex::new().unwrap();
        std::mem::forget(m.lock().unwrap());
        assert!(m.try_lock().unwrap().is_none());
        // SAFETY: this thread still holds the lock taken above.
        let g = unsafe { m.make_guard_unchecked() };
        g.unlock().unwrap();
        assert!(m.try_lock().unwrap().is_some());
    }

    #[test]
    fn excludes_concurrent_writers() {
        use std::sync::atomic::{AtomicU64, Ordering};

        let m = Mutex::new().unwrap();
        let counter = AtomicU64::new(0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        let _g = m.lock().unwrap();
                        // Non-atomic read-modify-write; only correct under the lock.
                        let v = counter.load(Ordering::Relaxed);
                        counter.store(v + 1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(counter.load(Ordering::Relaxed), 4000);
    }
}
