//! Absolute wall-clock instants.
//!
//! A [`WtTime`] counts 100-nanosecond intervals ("nicks") since
//! 1 Jan 1601 00:00:00 UTC, the same base the Win32 `FILETIME` uses.
//! Reading the host clock lives in the native crate; this module only does
//! the arithmetic: advancing by whole milliseconds and converting a deadline
//! into what the host wait primitive wants.
//!
//! Epochs involved:
//!   Unix    epoch:  1 Jan 1970 00:00:00 UTC
//!   WtTime  epoch:  1 Jan 1601 00:00:00 UTC
//!
//! `WtTime` epoch + [`DATE_DELTA_WT_UNIX`] days = Unix epoch.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One nick is 1e-1 microseconds.
pub const NICKS_PER_USEC: i64 = 10;
pub const NICKS_PER_MSEC: i64 = 1000 * NICKS_PER_USEC;
pub const NICKS_PER_SEC: i64 = 1000 * NICKS_PER_MSEC;
pub const NICKS_PER_MIN: i64 = 60 * NICKS_PER_SEC;
pub const NICKS_PER_HOUR: i64 = 60 * NICKS_PER_MIN;
pub const NICKS_PER_DAY: i64 = 24 * NICKS_PER_HOUR;

/// Days between the 1601 epoch and the Unix epoch.
pub const DATE_DELTA_WT_UNIX: i64 = 134_774;

/// The Unix epoch expressed in nicks.
pub const UNIX_EPOCH_NICKS: i64 = NICKS_PER_DAY * DATE_DELTA_WT_UNIX;

const NANOS_PER_NICK: i64 = 100;

/// Largest relative wait handed to a millisecond-based host wait.
/// `u32::MAX` is reserved as the "infinite" marker on that family.
pub const MAX_WAIT_MILLIS: u32 = u32::MAX - 1;

/// Represents a timespec value (seconds + nanoseconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    /// Seconds since the Unix epoch.
    pub tv_sec: i64,
    /// Nanoseconds (0 to 999_999_999).
    pub tv_nsec: i64,
}

/// An absolute instant in nicks since 1601-01-01 UTC.
///
/// Plain value type: each clock read produces an independent value and
/// arithmetic never touches shared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WtTime(i64);

impl WtTime {
    /// The epoch itself. Also the value a failed clock read degrades to.
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// True for the degenerate epoch value returned when the clock could not be read.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Build from a Unix `(seconds, microseconds)` pair as `gettimeofday` reports it.
    #[must_use]
    pub const fn from_unix(secs: i64, micros: i64) -> Self {
        Self(secs * NICKS_PER_SEC + micros * NICKS_PER_USEC + UNIX_EPOCH_NICKS)
    }

    /// Build from a Unix `timespec`, truncating to whole nicks.
    #[must_use]
    pub const fn from_timespec(ts: Timespec) -> Self {
        Self(ts.tv_sec * NICKS_PER_SEC + ts.tv_nsec / NANOS_PER_NICK + UNIX_EPOCH_NICKS)
    }

    /// Convert a [`SystemTime`], including instants before 1970.
    #[must_use]
    pub fn from_system_time(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(UNIX_EPOCH_NICKS.saturating_add(duration_to_nicks(after))),
            Err(before) => {
                Self(UNIX_EPOCH_NICKS.saturating_sub(duration_to_nicks(before.duration())))
            }
        }
    }

    /// Move forward by `millis` milliseconds.
    #[must_use]
    pub const fn advance(self, millis: u32) -> Self {
        Self(self.0.saturating_add(millis as i64 * NICKS_PER_MSEC))
    }

    /// Move backward by `millis` milliseconds.
    #[must_use]
    pub const fn retreat(self, millis: u32) -> Self {
        Self(self.0.saturating_sub(millis as i64 * NICKS_PER_MSEC))
    }

    /// Deadline for `pthread_cond_timedwait`: shift to the Unix epoch, then
    /// split into whole seconds and a nanosecond remainder.
    #[must_use]
    pub const fn to_timespec(self) -> Timespec {
        let t = self.0 - UNIX_EPOCH_NICKS;
        Timespec {
            tv_sec: t.div_euclid(NICKS_PER_SEC),
            tv_nsec: t.rem_euclid(NICKS_PER_SEC) * NANOS_PER_NICK,
        }
    }

    /// Relative wait in milliseconds from `now` until `self`.
    ///
    /// Zero if the deadline already passed; otherwise rounded up so a wait
    /// never wakes before the deadline.
    #[must_use]
    pub const fn millis_until(self, now: WtTime) -> u32 {
        let d = self.0 - now.0;
        if d <= 0 {
            return 0;
        }
        let mut millis = d / NICKS_PER_MSEC;
        if d % NICKS_PER_MSEC > 0 {
            millis += 1;
        }
        if millis >= MAX_WAIT_MILLIS as i64 {
            MAX_WAIT_MILLIS
        } else {
            millis as u32
        }
    }

    /// [`millis_until`](Self::millis_until) as a [`Duration`].
    #[must_use]
    pub const fn duration_until(self, now: WtTime) -> Duration {
        Duration::from_millis(self.millis_until(now) as u64)
    }
}

fn duration_to_nicks(d: Duration) -> i64 {
    let secs = i64::try_from(d.as_secs()).unwrap_or(i64::MAX);
    secs.saturating_mul(NICKS_PER_SEC)
        .saturating_add(i64::from(d.subsec_nanos()) / NANOS_PER_NICK)
}
