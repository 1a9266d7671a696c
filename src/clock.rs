//! Monotonic and wall-clock time sources.
//!
//! Rate-limit windows and idle detection need a monotonic clock that never
//! jumps backward; message timestamps and admin snapshots need wall-clock
//! time. Both are behind one small trait so tests can drive time explicitly
//! instead of sleeping.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// A time source usable from async tasks without direct `SystemTime`/`Instant`
/// calls scattered through the codebase.
pub trait Clock: Send + Sync + 'static {
    /// Monotonic instant, used for rate-limit windows and idle timeouts.
    fn now(&self) -> Instant;

    /// Milliseconds since the Unix epoch, used for message timestamps and
    /// persisted records.
    fn now_ms(&self) -> i64;

    /// Seconds since the Unix epoch, used for persisted `INTEGER` timestamp
    /// columns.
    fn now_unix(&self) -> i64 {
        self.now_ms() / 1000
    }
}

/// Production clock backed by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Deterministic clock for tests: starts at a fixed instant and only moves
/// when told to via [`FakeClock::advance`].
#[derive(Debug)]
pub struct FakeClock {
    start: Instant,
    offset_ms: AtomicI64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicI64::new(0),
        }
    }

    /// Advance the fake clock by `ms` milliseconds.
    pub fn advance(&self, ms: i64) {
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + std::time::Duration::from_millis(self.offset_ms.load(Ordering::SeqCst) as u64)
    }

    fn now_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_monotonically() {
        let clock = FakeClock::new();
        let t0 = clock.now();
        clock.advance(1000);
        let t1 = clock.now();
        assert!(t1 > t0);
        assert_eq!(clock.now_ms(), 1000);
    }
}
