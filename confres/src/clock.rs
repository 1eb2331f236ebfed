//! The clock collaborator: a source of monotonic millisecond
//! timestamps for the age-aware cache.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Yields a monotonic millisecond timestamp.
///
/// The cache never needs wall-clock semantics, only a strictly
/// non-decreasing counter; tests substitute a [`FakeClock`] to drive
/// exact age-boundary scenarios.
pub trait Clock: Send + Sync {
    /// The current time, in milliseconds.
    fn now_ms(&self) -> i64;
}

/// The default [`Clock`], backed by the system wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_millis() as i64
    }
}

/// A [`Clock`] whose value is set explicitly by a test, rather than
/// advancing on its own.
#[derive(Debug, Default)]
pub struct FakeClock(AtomicI64);

impl FakeClock {
    /// Create a fake clock starting at `now_ms`.
    pub fn new(now_ms: i64) -> Self {
        Self(AtomicI64::new(now_ms))
    }

    /// Advance (or rewind) the clock to `now_ms`.
    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_reports_what_it_was_set_to() {
        let clock = FakeClock::new(5000);
        assert_eq!(clock.now_ms(), 5000);
        clock.set(8000);
        assert_eq!(clock.now_ms(), 8000);
    }

    #[test]
    fn system_clock_is_plausible() {
        let now = SystemClock.now_ms();
        assert!(now > 1_700_000_000_000);
    }
}
