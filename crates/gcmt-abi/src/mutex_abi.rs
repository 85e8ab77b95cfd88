//! `GC_mutex_*`: lock and unlock are separate calls, so the guard from a
//! successful lock is forgotten and rebuilt at unlock.

use std::ffi::c_int;

use gcmt::Mutex;

use crate::{error_code, publish, release};

/// Opaque mutex handle.
pub struct GcMutex {
    pub(crate) inner: Mutex,
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_mutex_init(out: *mut *mut GcMutex) -> c_int {
    // SAFETY: forwarded out-pointer contract.
    unsafe { publish(out, || Ok(GcMutex { inner: Mutex::new()? })) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_mutex_delete(mx: *mut GcMutex) {
    // SAFETY: live handle from `GC_mutex_init`, not locked, not in use.
    if let Some(mx) = unsafe { release(mx) } {
        if let Err(err) = mx.inner.destroy() {
            error_code(err);
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_mutex_lock(mx: *mut GcMutex) -> c_int {
    // SAFETY: null or a live handle.
    let Some(mx) = (unsafe { mx.as_ref() }) else {
        return libc::EINVAL;
    };
    match mx.inner.lock() {
        Ok(guard) => {
            std::mem::forget(guard);
            0
        }
        Err(err) => error_code(err),
    }
}

/// `*got_it` is 1 if the lock was taken and 0 if it was busy. Busy is not
/// an error: the call still returns 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_mutex_trylock(mx: *mut GcMutex, got_it: *mut c_int) -> c_int {
    // SAFETY: null or a live handle / writable int.
    let (Some(mx), Some(got_it)) = (unsafe { mx.as_ref() }, unsafe { got_it.as_mut() }) else {
        return libc::EINVAL;
    };
    match mx.inner.try_lock() {
        Ok(Some(guard)) => {
            std::mem::forget(guard);
            *got_it = 1;
            0
        }
        Ok(None) => {
            *got_it = 0;
            0
        }
        Err(err) => {
            *got_it = 0;
            error_code(err)
        }
    }
}

/// The calling thread must hold the mutex.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_mutex_unlock(mx: *mut GcMutex) -> c_int {
    // SAFETY: null or a live handle.
    let Some(mx) = (unsafe { mx.as_ref() }) else {
        return libc::EINVAL;
    };
    // SAFETY: C contract: the caller holds the lock taken by `GC_mutex_lock`
    // or `GC_mutex_trylock`, whose guard was forgotten.
    let guard = unsafe { mx.inner.make_guard_unchecked() };
    match guard.unlock() {
        Ok(()) => 0,
        Err(err) => error_code(err),
    }
}
