// Exports take raw pointers from C callers; every entry point null-checks
// its handles and documents the rest in one place below.
#![allow(clippy::missing_safety_doc)]
#![allow(non_snake_case)]
//! # gcmt-abi
//!
//! C boundary for the gcmt threading layer.
//!
//! Mutexes, condition variables and threads are opaque heap handles handed
//! out through out-pointers by the `*_init` calls and released by the
//! matching `*_delete`. A handle must not be used after its `*_delete`, and
//! a mutex or condvar must not be deleted while another thread uses it.
//! Calls returning `c_int` report 0 on success and an errno value on
//! failure; null handles are rejected with `EINVAL`.
//!
//! ```text
//! C caller -> GC_* entry (this crate) -> gcmt native layer -> pthread / portable back-end
//! ```

pub mod cond_abi;
pub mod gms_abi;
pub mod mutex_abi;
pub mod thread_abi;
pub mod time_abi;

pub use cond_abi::GcCond;
pub use mutex_abi::GcMutex;
pub use thread_abi::{GcThread, GcThreadFunc};
pub use time_abi::GcWtTime;

use std::ffi::c_int;

use gcmt_core::GcmtError;

fn error_code(err: GcmtError) -> c_int {
    log::debug!("gcmt-abi: {err}");
    err.errno()
}

/// Box a freshly created object and publish it through `out`.
///
/// # Safety
/// `out` must be null or valid for a pointer-sized write.
unsafe fn publish<T>(out: *mut *mut T, make: impl FnOnce() -> Result<T, GcmtError>) -> c_int {
    if out.is_null() {
        return libc::EINVAL;
    }
    match make() {
        Ok(value) => {
            // SAFETY: `out` non-null and writable per caller contract.
            unsafe { *out = Box::into_raw(Box::new(value)) };
            0
        }
        Err(err) => {
            // SAFETY: as above.
            unsafe { *out = std::ptr::null_mut() };
            error_code(err)
        }
    }
}

/// Reclaim a handle produced by [`publish`]. Null is ignored.
///
/// # Safety
/// `ptr` must be null or a live handle from [`publish`] not yet released.
unsafe fn release<T>(ptr: *mut T) -> Option<T> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: ownership returns to Rust exactly once per caller contract.
    Some(*unsafe { Box::from_raw(ptr) })
}
