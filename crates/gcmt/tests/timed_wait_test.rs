//! Absolute-deadline waits and the wall clock, against the compiled back-end.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gcmt::time::deadline_after;
use gcmt::{Condvar, Mutex, now};
use gcmt_core::time::NICKS_PER_MSEC;

#[test]
fn clock_is_non_decreasing() {
    let mut prev = now();
    for _ in 0..10_000 {
        let next = now();
        assert!(next >= prev, "{next:?} < {prev:?}");
        prev = next;
    }
}

#[test]
fn clock_tracks_sleep() {
    let before = now();
    std::thread::sleep(Duration::from_millis(30));
    let after = now();
    assert!(after.ticks() - before.ticks() >= 30 * NICKS_PER_MSEC);
}

#[test]
fn timed_wait_without_notify_times_out_after_deadline() {
    let m = Mutex::new().unwrap();
    let c = Condvar::new().unwrap();
    let start = now();
    let deadline = start.advance(50);
    let mut guard = m.lock().unwrap();
    // Spurious wake-ups report `true`; loop until the deadline answer.
    while c.wait_until(&mut guard, deadline) {}
    let end = now();
    assert!(end >= deadline, "woke {} nicks early", deadline.ticks() - end.ticks());
    drop(guard);
    c.destroy().unwrap();
    m.destroy().unwrap();
}

#[test]
fn timed_wait_reports_notification() {
    let m = Arc::new(Mutex::new().unwrap());
    let c = Arc::new(Condvar::new().unwrap());
    let flag = Arc::new(AtomicBool::new(false));

    let mut guard = m.lock().unwrap();
    let notifier = {
        let (m, c, flag) = (Arc::clone(&m), Arc::clone(&c), Arc::clone(&flag));
        std::thread::spawn(move || {
            let _g = m.lock().unwrap();
            flag.store(true, Ordering::Relaxed);
            c.notify_one();
        })
    };

    let deadline = deadline_after(10_000);
    let mut notified = false;
    while !flag.load(Ordering::Relaxed) {
        notified = c.wait_until(&mut guard, deadline);
        if !notified {
            break;
        }
    }
    assert!(notified, "notification lost before a 10s deadline");
    assert!(now() < deadline);
    drop(guard);
    notifier.join().unwrap();
}

#[test]
fn notify_all_releases_every_waiter() {
    let m = Mutex::new().unwrap();
    let c = Condvar::new().unwrap();
    let go = AtomicBool::new(false);
    let deadline = deadline_after(10_000);

    std::thread::scope(|s| {
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut g = m.lock().unwrap();
                    while !go.load(Ordering::Relaxed) {
                        if !c.wait_until(&mut g, deadline) {
                            return false;
                        }
                    }
                    true
                })
            })
            .collect();
        std::thread::sleep(Duration::from_millis(20));
        {
            let _g = m.lock().unwrap();
            go.store(true, Ordering::Relaxed);
            c.notify_all();
        }
        for w in waiters {
            assert!(w.join().unwrap());
        }
    });
}
