//! POSIX back-end: `pthread_mutex_t` / `pthread_cond_t` through `libc`.
//!
//! Both objects are boxed so their addresses stay fixed for their whole
//! lifetime; the host implementation may keep pointers into them.

use std::cell::UnsafeCell;
use std::ptr;

use gcmt_core::error::check_os;
use gcmt_core::pthread::{
    WaitOutcome, classify_signal, classify_timed_wait, classify_trylock, classify_wait,
};
use gcmt_core::{GcmtResult, Timespec, WtTime};

use super::SyncBackend;

pub(crate) struct PthreadBackend;

pub(crate) struct PthreadMutex {
    inner: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

impl PthreadMutex {
    fn as_ptr(&self) -> *mut libc::pthread_mutex_t {
        self.inner.get()
    }
}

// SAFETY: a pthread mutex is designed to be shared and operated from any
// thread; all access goes through the pthread API.
unsafe impl Send for PthreadMutex {}
// SAFETY: see above.
unsafe impl Sync for PthreadMutex {}

pub(crate) struct PthreadCond {
    inner: Box<UnsafeCell<libc::pthread_cond_t>>,
}

impl PthreadCond {
    fn as_ptr(&self) -> *mut libc::pthread_cond_t {
        self.inner.get()
    }
}

// SAFETY: a pthread condition variable is designed for cross-thread use.
unsafe impl Send for PthreadCond {}
// SAFETY: see above.
unsafe impl Sync for PthreadCond {}

/// Held-lock token; carries the mutex so waits and unlock can reach it.
pub(crate) struct PthreadGuard<'a> {
    mutex: &'a PthreadMutex,
}

fn native_timespec(ts: Timespec) -> libc::timespec {
    // SAFETY: `timespec` is plain old data; all-zero is a valid value and
    // also clears any padding fields some targets carry.
    let mut native: libc::timespec = unsafe { std::mem::zeroed() };
    native.tv_sec = ts.tv_sec as libc::time_t;
    native.tv_nsec = ts.tv_nsec as _;
    native
}

impl SyncBackend for PthreadBackend {
    const NAME: &'static str = "pthread";

    type RawMutex = PthreadMutex;
    type Guard<'a> = PthreadGuard<'a>;
    type RawCond = PthreadCond;

    fn now() -> WtTime {
        // SAFETY: see `native_timespec`.
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: `ts` is a valid, writable timespec.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) };
        if rc != 0 {
            return WtTime::ZERO;
        }
        WtTime::from_timespec(Timespec {
            tv_sec: ts.tv_sec as i64,
            tv_nsec: ts.tv_nsec as i64,
        })
    }

    fn mutex_new() -> GcmtResult<PthreadMutex> {
        let mutex = PthreadMutex {
            inner: Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER)),
        };
        // SAFETY: the pointer is to a freshly boxed, never-shared mutex;
        // null attributes select the default (non-recursive) kind.
        let rc = unsafe { libc::pthread_mutex_init(mutex.as_ptr(), ptr::null()) };
        check_os("mutex_init", rc)?;
        Ok(mutex)
    }

    fn mutex_lock(mutex: &PthreadMutex) -> GcmtResult<PthreadGuard<'_>> {
        // SAFETY: `mutex` was initialized by `mutex_new` and is not destroyed
        // while borrowed.
        let rc = unsafe { libc::pthread_mutex_lock(mutex.as_ptr()) };
        check_os("mutex_lock", rc)?;
        Ok(PthreadGuard { mutex })
    }

    fn mutex_try_lock(mutex: &PthreadMutex) -> GcmtResult<Option<PthreadGuard<'_>>> {
        // SAFETY: as in `mutex_lock`.
        let rc = unsafe { libc::pthread_mutex_trylock(mutex.as_ptr()) };
        Ok(classify_trylock(rc)?.then_some(PthreadGuard { mutex }))
    }

    fn mutex_unlock(guard: PthreadGuard<'_>) -> GcmtResult<()> {
        // SAFETY: the guard proves the calling thread holds the lock.
        let rc = unsafe { libc::pthread_mutex_unlock(guard.mutex.as_ptr()) };
        check_os("mutex_unlock", rc)
    }

    unsafe fn mutex_assume_locked(mutex: &PthreadMutex) -> PthreadGuard<'_> {
        PthreadGuard { mutex }
    }

    fn mutex_destroy(mutex: PthreadMutex) -> GcmtResult<()> {
        // SAFETY: taken by value, so no guard can still borrow it.
        let rc = unsafe { libc::pthread_mutex_destroy(mutex.as_ptr()) };
        check_os("mutex_destroy", rc)
    }

    fn cond_new() -> GcmtResult<PthreadCond> {
        let cond = PthreadCond {
            inner: Box::new(UnsafeCell::new(libc::PTHREAD_COND_INITIALIZER)),
        };
        // SAFETY: freshly boxed, never shared. Default attributes measure
        // timed waits against CLOCK_REALTIME, the clock `now` reads.
        let rc = unsafe { libc::pthread_cond_init(cond.as_ptr(), ptr::null()) };
        check_os("cond_init", rc)?;
        Ok(cond)
    }

    fn cond_wait(cond: &PthreadCond, guard: &mut PthreadGuard<'_>) -> GcmtResult<()> {
        // SAFETY: both objects are initialized; the guard proves the mutex is
        // held by this thread.
        let rc = unsafe { libc::pthread_cond_wait(cond.as_ptr(), guard.mutex.as_ptr()) };
        classify_wait(rc)
    }

    fn cond_wait_until(
        cond: &PthreadCond,
        guard: &mut PthreadGuard<'_>,
        deadline: WtTime,
    ) -> GcmtResult<WaitOutcome> {
        let abstime = native_timespec(deadline.to_timespec());
        // SAFETY: as in `cond_wait`; `abstime` outlives the call.
        let rc = unsafe {
            libc::pthread_cond_timedwait(cond.as_ptr(), guard.mutex.as_ptr(), &abstime)
        };
        classify_timed_wait(rc)
    }

    fn cond_notify_one(cond: &PthreadCond) -> GcmtResult<()> {
        // SAFETY: initialized by `cond_new`.
        let rc = unsafe { libc::pthread_cond_signal(cond.as_ptr()) };
        classify_signal("cond_signal", rc)
    }

    fn cond_notify_all(cond: &PthreadCond) -> GcmtResult<()> {
        // SAFETY: initialized by `cond_new`.
        let rc = unsafe { libc::pthread_cond_broadcast(cond.as_ptr()) };
        classify_signal("cond_broadcast", rc)
    }

    fn cond_destroy(cond: PthreadCond) -> GcmtResult<()> {
        // SAFETY: taken by value; no waiter can still borrow it.
        let rc = unsafe { libc::pthread_cond_destroy(cond.as_ptr()) };
        check_os("cond_destroy", rc)
    }
}
