//! Threading scenarios run against the compiled back-end.
//!
//! Each scenario exercises one observable property of the native layer and
//! reports pass/fail with the time it took. Scenarios never panic on a
//! failed check; they return [`Outcome::Fail`] with details instead.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use clap::ValueEnum;
use gcmt::{Condvar, Mutex, Thread, WtTime};
use serde_json::json;

use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Successive clock reads never go backwards.
    ClockMonotonic,
    /// `try_lock` on a held mutex reports not acquired.
    MutexTrylock,
    /// A timed wait with no notify returns false, no earlier than its deadline.
    TimedWaitTimeout,
    /// A timed wait returns true when notified before its deadline.
    TimedWaitNotify,
    /// Resume, run, join: the return code comes back and the body ran once.
    ThreadLifecycle,
    /// Deleting a never-resumed thread never runs its body.
    ThreadTerminateBeforeStart,
}

impl Scenario {
    pub const ALL: [Self; 6] = [
        Self::ClockMonotonic,
        Self::MutexTrylock,
        Self::TimedWaitTimeout,
        Self::TimedWaitNotify,
        Self::ThreadLifecycle,
        Self::ThreadTerminateBeforeStart,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ClockMonotonic => "clock_monotonic",
            Self::MutexTrylock => "mutex_trylock",
            Self::TimedWaitTimeout => "timed_wait_timeout",
            Self::TimedWaitNotify => "timed_wait_notify",
            Self::ThreadLifecycle => "thread_lifecycle",
            Self::ThreadTerminateBeforeStart => "thread_terminate_before_start",
        }
    }

    fn body(self) -> HarnessResult<serde_json::Value> {
        match self {
            Self::ClockMonotonic => clock_monotonic(),
            Self::MutexTrylock => mutex_trylock(),
            Self::TimedWaitTimeout => timed_wait_timeout(),
            Self::TimedWaitNotify => timed_wait_notify(),
            Self::ThreadLifecycle => thread_lifecycle(),
            Self::ThreadTerminateBeforeStart => thread_terminate_before_start(),
        }
    }

    /// Run the scenario and describe the result.
    #[must_use]
    pub fn run(self) -> ScenarioReport {
        let start = Instant::now();
        let result = self.body();
        let latency_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let (outcome, errno, details) = match result {
            Ok(details) => (Outcome::Pass, None, details),
            Err(HarnessError::Check { message, .. }) => {
                (Outcome::Fail, None, json!({ "message": message }))
            }
            Err(HarnessError::Gcmt(err)) => (
                Outcome::Error,
                Some(err.errno()),
                json!({ "message": err.to_string() }),
            ),
            Err(err) => (Outcome::Error, None, json!({ "message": err.to_string() })),
        };
        ScenarioReport {
            scenario: self,
            outcome,
            errno,
            latency_ns,
            details,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub outcome: Outcome,
    pub errno: Option<i32>,
    pub latency_ns: u64,
    pub details: serde_json::Value,
}

impl ScenarioReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    #[must_use]
    pub fn to_entry(&self) -> LogEntry {
        let level = if self.passed() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let mut entry = LogEntry::new("", level, "scenario_result")
            .with_scenario(self.scenario.name())
            .with_backend(gcmt::backend_name())
            .with_outcome(self.outcome)
            .with_latency_ns(self.latency_ns)
            .with_details(self.details.clone());
        if let Some(errno) = self.errno {
            entry = entry.with_errno(errno);
        }
        entry
    }
}

/// Run `scenarios` in order, logging a start event, one entry per
/// scenario and a summary.
pub fn run_all<W: Write>(
    scenarios: &[Scenario],
    emitter: &mut LogEmitter<W>,
) -> HarnessResult<Vec<ScenarioReport>> {
    emitter.emit(LogLevel::Info, "run_start")?;
    let mut reports = Vec::with_capacity(scenarios.len());
    for &scenario in scenarios {
        log::debug!("running {}", scenario.name());
        let report = scenario.run();
        emitter.emit_entry(report.to_entry())?;
        reports.push(report);
    }
    let failed = reports.iter().filter(|r| !r.passed()).count();
    emitter.emit_entry(
        LogEntry::new(
            "",
            if failed == 0 { LogLevel::Info } else { LogLevel::Warn },
            "run_summary",
        )
        .with_backend(gcmt::backend_name())
        .with_details(json!({ "total": reports.len(), "failed": failed })),
    )?;
    emitter.flush()?;
    Ok(reports)
}

fn check(scenario: Scenario, ok: bool, message: impl FnOnce() -> String) -> HarnessResult<()> {
    if ok {
        Ok(())
    } else {
        Err(HarnessError::Check {
            scenario: scenario.name(),
            message: message(),
        })
    }
}

fn clock_monotonic() -> HarnessResult<serde_json::Value> {
    const READS: usize = 100_000;
    let first = gcmt::now();
    let mut prev = first;
    for _ in 0..READS {
        let next = gcmt::now();
        check(Scenario::ClockMonotonic, next >= prev, || {
            format!("clock went back from {} to {}", prev.ticks(), next.ticks())
        })?;
        prev = next;
    }
    check(Scenario::ClockMonotonic, !first.is_zero(), || {
        "clock read failed".to_string()
    })?;
    Ok(json!({ "reads": READS, "span_ticks": prev.ticks() - first.ticks() }))
}

fn mutex_trylock() -> HarnessResult<serde_json::Value> {
    let m = Mutex::new()?;
    let held = m.lock()?;
    let busy = m.try_lock()?.is_none();
    check(Scenario::MutexTrylock, busy, || {
        "try_lock acquired a held mutex".to_string()
    })?;
    held.unlock()?;
    let free = m.try_lock()?.is_some();
    check(Scenario::MutexTrylock, free, || {
        "try_lock failed on a free mutex".to_string()
    })?;
    m.destroy()?;
    Ok(json!({ "busy_when_held": busy, "acquired_when_free": free }))
}

fn timed_wait_timeout() -> HarnessResult<serde_json::Value> {
    const WAIT_MS: u32 = 50;
    let m = Mutex::new()?;
    let c = Condvar::new()?;
    let deadline = gcmt::now().advance(WAIT_MS);
    let mut guard = m.lock()?;
    let mut spurious = 0u32;
    while c.wait_until(&mut guard, deadline) {
        spurious += 1;
    }
    let woke = gcmt::now();
    check(Scenario::TimedWaitTimeout, woke >= deadline, || {
        format!("woke {} ticks early", deadline.ticks() - woke.ticks())
    })?;
    guard.unlock()?;
    Ok(json!({
        "wait_ms": WAIT_MS,
        "overshoot_ticks": woke.ticks() - deadline.ticks(),
        "spurious_wakeups": spurious,
    }))
}

fn timed_wait_notify() -> HarnessResult<serde_json::Value> {
    let m = Arc::new(Mutex::new()?);
    let c = Arc::new(Condvar::new()?);
    let flag = Arc::new(AtomicBool::new(false));

    let mut guard = m.lock()?;
    let mut notifier = {
        let (m, c, flag) = (Arc::clone(&m), Arc::clone(&c), Arc::clone(&flag));
        Thread::spawn_suspended(move || {
            let Ok(guard) = m.lock() else {
                return 1;
            };
            flag.store(true, Ordering::Relaxed);
            c.notify_one();
            drop(guard);
            0
        })?
    };
    notifier.resume();

    let deadline: WtTime = gcmt::time::deadline_after(5_000);
    let mut notified = true;
    while notified && !flag.load(Ordering::Relaxed) {
        notified = c.wait_until(&mut guard, deadline);
    }
    guard.unlock()?;
    let rc = notifier.wait_for();
    check(Scenario::TimedWaitNotify, notified, || {
        "deadline passed before notification".to_string()
    })?;
    check(Scenario::TimedWaitNotify, rc == 0, || {
        format!("notifier returned {rc}")
    })?;
    Ok(json!({ "notified": notified }))
}

fn thread_lifecycle() -> HarnessResult<serde_json::Value> {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let mut t = Thread::spawn_suspended(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        42
    })?;
    t.resume();
    t.resume();
    let rc = t.wait_for();
    let runs = runs.load(Ordering::SeqCst);
    check(Scenario::ThreadLifecycle, rc == 42, || {
        format!("expected 42, joined with {rc}")
    })?;
    check(Scenario::ThreadLifecycle, runs == 1, || {
        format!("body ran {runs} times")
    })?;
    let state = format!("{:?}", t.state());
    t.delete();
    Ok(json!({ "return_code": rc, "runs": runs, "state_after_join": state }))
}

fn thread_terminate_before_start() -> HarnessResult<serde_json::Value> {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let t = Thread::spawn_suspended(move || {
        flag.store(true, Ordering::SeqCst);
        1
    })?;
    t.delete();
    let ran = ran.load(Ordering::SeqCst);
    check(Scenario::ThreadTerminateBeforeStart, !ran, || {
        "body ran after delete of a suspended thread".to_string()
    })?;
    Ok(json!({ "body_ran": ran }))
}
