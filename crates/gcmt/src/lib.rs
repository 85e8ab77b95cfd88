//! # gcmt
//!
//! Portable threads, mutexes and condition variables with waits against an
//! absolute wall-clock deadline.
//!
//! The back-end is fixed at build time: POSIX threads through `libc` on unix,
//! or `parking_lot` elsewhere (and on unix with the `portable` feature).
//! Both honour the same contracts; see [`backend_name`] to tell which one
//! is compiled in.
//!
//! ```no_run
//! use gcmt::{Condvar, Mutex, Thread, time};
//!
//! let mut worker = Thread::spawn_suspended(|| 42).unwrap();
//! worker.resume();
//! assert_eq!(worker.wait_for(), 42);
//!
//! let m = Mutex::new().unwrap();
//! let c = Condvar::new().unwrap();
//! let mut guard = m.lock().unwrap();
//! let notified = c.wait_until(&mut guard, time::deadline_after(50));
//! assert!(!notified);
//! ```

mod backend;
pub mod cond;
pub mod config;
pub mod mutex;
pub mod thread;
pub mod time;

pub use cond::Condvar;
pub use config::{GcmtConfig, config};
pub use gcmt_core::pthread::{THREAD_WAIT_FAILED, ThreadState};
pub use gcmt_core::{GcmtError, GcmtResult, WtTime};
pub use mutex::{Mutex, MutexGuard};
pub use thread::{Thread, ThreadBuilder};
pub use time::now;

/// Error type of every fallible call in this crate.
pub type SysError = GcmtError;

/// Name of the compiled-in back-end: `"pthread"` or `"portable"`.
#[must_use]
pub const fn backend_name() -> &'static str {
    <backend::Backend as backend::SyncBackend>::NAME
}
