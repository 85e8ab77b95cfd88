//! `GC_cond_*`.

use std::ffi::c_int;

use gcmt::Condvar;
use gcmt_core::WtTime;

use crate::mutex_abi::GcMutex;
use crate::time_abi::GcWtTime;
use crate::{error_code, publish, release};

/// Opaque condition-variable handle.
pub struct GcCond {
    inner: Condvar,
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_cond_init(out: *mut *mut GcCond) -> c_int {
    // SAFETY: forwarded out-pointer contract.
    unsafe { publish(out, || Ok(GcCond { inner: Condvar::new()? })) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_cond_delete(cv: *mut GcCond) {
    // SAFETY: live handle from `GC_cond_init` with no waiters.
    if let Some(cv) = unsafe { release(cv) } {
        if let Err(err) = cv.inner.destroy() {
            error_code(err);
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_cond_notifyOne(cv: *mut GcCond) {
    // SAFETY: null or a live handle.
    if let Some(cv) = unsafe { cv.as_ref() } {
        cv.inner.notify_one();
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_cond_notifyAll(cv: *mut GcCond) {
    // SAFETY: null or a live handle.
    if let Some(cv) = unsafe { cv.as_ref() } {
        cv.inner.notify_all();
    }
}

/// The calling thread must hold `mx`; it holds it again on return.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_cond_wait(cv: *mut GcCond, mx: *mut GcMutex) {
    // SAFETY: null or live handles.
    let (Some(cv), Some(mx)) = (unsafe { cv.as_ref() }, unsafe { mx.as_ref() }) else {
        return;
    };
    // SAFETY: C contract: the caller holds `mx`.
    let mut guard = unsafe { mx.inner.make_guard_unchecked() };
    cv.inner.wait(&mut guard);
    std::mem::forget(guard);
}

/// Wait until notified or until the absolute tick count `abs_time`.
/// Returns 1 if notified, 0 if the deadline passed (or on null handles).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_cond_timedWaitAbs(
    cv: *mut GcCond,
    mx: *mut GcMutex,
    abs_time: GcWtTime,
) -> c_int {
    // SAFETY: null or live handles.
    let (Some(cv), Some(mx)) = (unsafe { cv.as_ref() }, unsafe { mx.as_ref() }) else {
        return 0;
    };
    // SAFETY: C contract: the caller holds `mx`.
    let mut guard = unsafe { mx.inner.make_guard_unchecked() };
    let notified = cv.inner.wait_until(&mut guard, WtTime::from_ticks(abs_time));
    std::mem::forget(guard);
    c_int::from(notified)
}
