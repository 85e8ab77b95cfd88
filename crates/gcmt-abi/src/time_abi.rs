//! Wall-clock ticks: `GC_nowWtTime`, `GC_incWtTime`, `GC_decWtTime`.

use std::ffi::c_uint;

use gcmt_core::WtTime;

/// 100-ns ticks since 1601-01-01 UTC.
pub type GcWtTime = i64;

#[unsafe(no_mangle)]
pub extern "C" fn GC_nowWtTime() -> GcWtTime {
    gcmt::now().ticks()
}

/// Advance `*wt` by `millis` milliseconds. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_incWtTime(wt: *mut GcWtTime, millis: c_uint) {
    // SAFETY: caller passes null or a valid, writable tick count.
    if let Some(wt) = unsafe { wt.as_mut() } {
        *wt = WtTime::from_ticks(*wt).advance(millis).ticks();
    }
}

/// Move `*wt` back by `millis` milliseconds. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn GC_decWtTime(wt: *mut GcWtTime, millis: c_uint) {
    // SAFETY: caller passes null or a valid, writable tick count.
    if let Some(wt) = unsafe { wt.as_mut() } {
        *wt = WtTime::from_ticks(*wt).retreat(millis).ticks();
    }
}
