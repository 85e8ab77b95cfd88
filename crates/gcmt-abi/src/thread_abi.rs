//! `GC_thread_*`: suspended-start threads running a C function.

use std::ffi::{c_int, c_void};

use gcmt::{GcmtError, Thread};

use crate::{error_code, publish, release};

/// Thread body. Receives the user-data pointer given to `GC_thread_init`;
/// its return value is what `GC_thread_waitFor` reports.
pub type GcThreadFunc = unsafe extern "C" fn(user_data: *mut c_void) -> c_int;

/// Opaque thread handle.
pub struct GcThread {
    inner: Thread,
}

struct UserData(*mut c_void);

impl UserData {
    fn get(&self) -> *mut c_void {
        self.0
    }
}

// SAFETY: the pointer is handed to the C body untouched; sharing what it
// points to across threads is the C caller's responsibility.
unsafe impl Send for UserData {}

/// Create a suspended thread. Fails with `EINVAL` for a null function or
/// out-pointer, or with the OS error code if the thread cannot be created.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_thread_init(
    out: *mut *mut GcThread,
    func: Option<GcThreadFunc>,
    user_data: *mut c_void,
) -> c_int {
    let Some(func) = func else {
        if !out.is_null() {
            // SAFETY: non-null out-pointer is writable per contract.
            unsafe { *out = std::ptr::null_mut() };
        }
        return error_code(GcmtError::InvalidArgument("thread function"));
    };
    let data = UserData(user_data);
    // SAFETY: forwarded out-pointer contract.
    unsafe {
        publish(out, move || {
            let inner = Thread::spawn_suspended(move || {
                // SAFETY: the C caller supplied `func` for exactly this call.
                unsafe { func(data.get()) }
            })?;
            Ok(GcThread { inner })
        })
    }
}

/// Start the thread. Only the first call has an effect.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_thread_resume(thd: *mut GcThread) {
    // SAFETY: null or a live handle.
    if let Some(thd) = unsafe { thd.as_ref() } {
        thd.inner.resume();
    }
}

/// Wait for the thread's function to return and report its result;
/// -1 if the thread cannot be waited for.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_thread_waitFor(thd: *mut GcThread) -> c_int {
    // SAFETY: null or a live handle, not used concurrently with this call.
    match unsafe { thd.as_mut() } {
        Some(thd) => thd.inner.wait_for(),
        None => gcmt::THREAD_WAIT_FAILED,
    }
}

/// Terminate (if never started), reap and free the thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_thread_delete(thd: *mut GcThread) {
    // SAFETY: live handle from `GC_thread_init`, released exactly once.
    if let Some(thd) = unsafe { release(thd) } {
        thd.inner.delete();
    }
}
