//! Threads that start suspended.
//!
//! [`Thread::spawn_suspended`] creates the OS thread immediately but parks it
//! at a start gate built from this crate's own [`Mutex`] and [`Condvar`].
//! The first [`Thread::resume`] opens the gate; later calls do nothing.
//! The user function runs once, its `i32` result is recorded, and the
//! thread is marked finished whether or not the function ran.
//!
//! Tearing down an unfinished thread ([`Thread::delete`] or drop) sets the
//! termination flag, resumes the thread and waits for it. The flag is only
//! checked before the function starts: a never-resumed thread is released
//! straight into a skipped body, but a running function is never
//! interrupted.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU64, Ordering};
use std::thread::JoinHandle;

use gcmt_core::errno;
use gcmt_core::pthread::{
    THREAD_WAIT_FAILED, ThreadContractOp, ThreadContractOutcome, ThreadState,
    thread_contract_transition,
};
use gcmt_core::{GcmtError, GcmtResult};

use crate::cond::Condvar;
use crate::config::config;
use crate::mutex::Mutex;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// One-shot latch the new thread parks on until resumed.
struct StartGate {
    mutex: Mutex,
    cond: Condvar,
    // Written and read only with `mutex` held.
    released: AtomicBool,
}

impl StartGate {
    fn new() -> GcmtResult<Self> {
        Ok(Self {
            mutex: Mutex::new()?,
            cond: Condvar::new()?,
            released: AtomicBool::new(false),
        })
    }

    fn wait(&self) -> GcmtResult<()> {
        let mut guard = self.mutex.lock()?;
        while !self.released.load(Ordering::Relaxed) {
            self.cond.wait(&mut guard);
        }
        guard.unlock()
    }

    fn release(&self) -> GcmtResult<()> {
        let guard = self.mutex.lock()?;
        self.released.store(true, Ordering::Relaxed);
        self.cond.notify_all();
        guard.unlock()
    }
}

/// State shared between the handle and the running thread.
struct Shared {
    id: u64,
    state: AtomicU8,
    terminated: AtomicBool,
    return_value: AtomicI32,
    gate: StartGate,
}

impl Shared {
    fn state(&self) -> ThreadState {
        ThreadState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(ThreadState::Deleted)
    }

    /// Apply a non-blocking lifecycle operation atomically.
    fn apply(&self, op: ThreadContractOp) -> ThreadContractOutcome {
        let mut current = self.state();
        loop {
            let outcome = thread_contract_transition(current, op);
            if outcome.errno != 0 || outcome.next == current {
                return outcome;
            }
            match self.state.compare_exchange(
                current.as_u8(),
                outcome.next.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return outcome,
                Err(actual) => {
                    current = ThreadState::from_u8(actual).unwrap_or(ThreadState::Deleted);
                }
            }
        }
    }

    /// Everything the OS thread does: wait for resume, run or skip the body,
    /// record the result, mark finished.
    fn run(&self, body: Box<dyn FnOnce() -> i32 + Send>) -> i32 {
        if let Err(err) = self.gate.wait() {
            log::error!("gcmt: thread {} start gate failed: {err}", self.id);
            self.terminated.store(true, Ordering::Release);
        }
        if self.terminated.load(Ordering::Acquire) {
            log::debug!("gcmt: thread {} terminated before start", self.id);
            drop(body);
        } else {
            log::trace!("gcmt: thread {} running", self.id);
            let rc = body();
            self.return_value.store(rc, Ordering::Release);
        }
        let outcome = self.apply(ThreadContractOp::Finish);
        if outcome.errno != 0 {
            log::warn!(
                "gcmt: thread {} finished from unexpected state: {}",
                self.id,
                errno::errno_name(outcome.errno)
            );
        }
        self.return_value.load(Ordering::Acquire)
    }
}

/// Options for a new suspended thread.
#[derive(Debug, Clone)]
pub struct ThreadBuilder {
    name: Option<String>,
    stack_size: Option<usize>,
}

impl Default for ThreadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadBuilder {
    /// Builder seeded from the process configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            stack_size: config().thread_stack_size,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Create the OS thread parked at its start gate. `body` does not run
    /// until [`Thread::resume`].
    ///
    /// Fails with [`GcmtError::InvalidArgument`] if the name contains a NUL
    /// byte.
    pub fn spawn_suspended<F>(self, body: F) -> GcmtResult<Thread>
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        if self.name.as_deref().is_some_and(|n| n.contains('\0')) {
            return Err(GcmtError::InvalidArgument("thread name"));
        }
        let id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Shared {
            id,
            state: AtomicU8::new(ThreadState::Created.as_u8()),
            terminated: AtomicBool::new(false),
            return_value: AtomicI32::new(0),
            gate: StartGate::new()?,
        });

        let name = self
            .name
            .unwrap_or_else(|| format!("{}-{id}", config().thread_name_prefix));
        let mut builder = std::thread::Builder::new().name(name);
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }

        let body: Box<dyn FnOnce() -> i32 + Send> = Box::new(body);
        let worker = Arc::clone(&shared);
        let handle = builder.spawn(move || worker.run(body)).map_err(|err| {
            let errno = err.raw_os_error().unwrap_or(errno::EAGAIN);
            log::warn!("gcmt: thread {id} create failed: {err}");
            GcmtError::Os {
                op: "thread_create",
                errno,
            }
        })?;
        log::trace!("gcmt: thread {id} created suspended");

        Ok(Thread {
            shared,
            handle: Some(handle),
        })
    }
}

/// Handle to a thread created by [`ThreadBuilder::spawn_suspended`].
///
/// Owning the handle owns the thread: dropping it tears the thread down the
/// same way [`delete`](Self::delete) does.
pub struct Thread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<i32>>,
}

impl Thread {
    /// Create a suspended thread with default options.
    pub fn spawn_suspended<F>(body: F) -> GcmtResult<Self>
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        ThreadBuilder::new().spawn_suspended(body)
    }

    /// Process-unique id, also used in the default thread name.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    #[must_use]
    pub fn state(&self) -> ThreadState {
        self.shared.state()
    }

    /// True once the body has returned or been skipped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// True once teardown asked the thread to skip its body.
    #[must_use]
    pub fn termination_requested(&self) -> bool {
        self.shared.terminated.load(Ordering::Acquire)
    }

    /// Open the start gate. Only the first call on a created thread has an
    /// effect; any later call, from any thread, is a no-op.
    pub fn resume(&self) {
        let outcome = self.shared.apply(ThreadContractOp::Resume);
        if !outcome.releases_gate {
            return;
        }
        log::trace!("gcmt: thread {} resumed", self.shared.id);
        if let Err(err) = self.shared.gate.release() {
            log::error!("gcmt: thread {} resume failed: {err}", self.shared.id);
        }
    }

    /// Block until the body has returned and give back its result.
    ///
    /// Returns [`THREAD_WAIT_FAILED`] if the thread cannot be reaped: it was
    /// never resumed (waiting would never end) or it panicked. After a
    /// successful wait, further calls return the same result.
    pub fn wait_for(&mut self) -> i32 {
        let outcome = thread_contract_transition(self.state(), ThreadContractOp::Join);
        if outcome.errno != 0 {
            log::warn!(
                "gcmt: wait on thread {} refused: {}",
                self.shared.id,
                errno::errno_name(outcome.errno)
            );
            return THREAD_WAIT_FAILED;
        }
        let rc = match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(rc) => rc,
                Err(_) => {
                    log::warn!("gcmt: thread {} panicked", self.shared.id);
                    self.shared.return_value.store(THREAD_WAIT_FAILED, Ordering::Release);
                    THREAD_WAIT_FAILED
                }
            },
            None => self.shared.return_value.load(Ordering::Acquire),
        };
        // The OS thread is gone; only this handle touches the state now.
        self.shared
            .state
            .store(ThreadState::Joined.as_u8(), Ordering::Release);
        log::trace!("gcmt: thread {} joined with {rc}", self.shared.id);
        rc
    }

    /// Terminate (if unfinished), reap and release the thread.
    pub fn delete(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let outcome = thread_contract_transition(self.state(), ThreadContractOp::Delete);
        if outcome.errno != 0 {
            return;
        }
        if outcome.requests_termination {
            self.shared.terminated.store(true, Ordering::Release);
        }
        if outcome.releases_gate {
            self.resume();
        }
        if self.is_finished() {
            // Nothing left to wait for; let the OS reclaim it.
            drop(self.handle.take());
        } else {
            self.wait_for();
        }
        self.shared
            .state
            .store(ThreadState::Deleted.as_u8(), Ordering::Release);
        log::trace!("gcmt: thread {} deleted", self.shared.id);
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn created_thread_waits_for_resume() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let mut t = Thread::spawn_suspended(move || {
            flag.store(true, Ordering::SeqCst);
            7
        })
        .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(t.state(), ThreadState::Created);
        t.resume();
        assert_eq!(t.wait_for(), 7);
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(t.state(), ThreadState::Joined);
    }

    #[test]
    fn nul_in_name_is_rejected() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let err = ThreadBuilder::new()
            .name("bad\0name")
            .spawn_suspended(move || {
                flag.store(true, Ordering::SeqCst);
                0
            })
            .unwrap_err();
        assert_eq!(err, GcmtError::InvalidArgument("thread name"));
        assert_eq!(err.errno(), errno::EINVAL);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn resume_is_idempotent() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut t = Thread::spawn_suspended(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        })
        .unwrap();
        t.resume();
        t.resume();
        assert_eq!(t.wait_for(), 0);
        t.resume();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn wait_for_never_resumed_thread_fails_fast() {
        let mut t = Thread::spawn_suspended(|| 1).unwrap();
        assert_eq!(t.wait_for(), THREAD_WAIT_FAILED);
        assert_eq!(t.state(), ThreadState::Created);
    }

    #[test]
    fn wait_for_twice_returns_cached_code() {
        let mut t = Thread::spawn_suspended(|| 42).unwrap();
        t.resume();
        assert_eq!(t.wait_for(), 42);
        assert_eq!(t.wait_for(), 42);
    }

    #[test]
    fn delete_never_resumed_skips_body() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let t = Thread::spawn_suspended(move || {
            flag.store(true, Ordering::SeqCst);
            1
        })
        .unwrap();
        let shared = Arc::clone(&t.shared);
        t.delete();
        assert!(!ran.load(Ordering::SeqCst));
        assert!(shared.terminated.load(Ordering::SeqCst));
        assert_eq!(shared.state(), ThreadState::Deleted);
    }

    #[test]
    fn panicking_body_reports_failure() {
        let mut t = Thread::spawn_suspended(|| panic!("boom")).unwrap();
        t.resume();
        assert_eq!(t.wait_for(), THREAD_WAIT_FAILED);
    }

    #[test]
    fn builder_names_thread() {
        let mut t = ThreadBuilder::new()
            .name("gcmt-test-worker")
            .spawn_suspended(|| {
                let name = std::thread::current().name().map(str::to_owned);
                i32::from(name.as_deref() == Some("gcmt-test-worker"))
            })
            .unwrap();
        t.resume();
        assert_eq!(t.wait_for(), 1);
    }
}
