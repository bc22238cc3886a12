use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source behind the session's wall-clock anchors.
pub trait Clock: Send {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Production clock anchored at construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-stepped clock for drivers under test. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.micros.fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.micros.store(to.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

/// Remaining budget given a level-start anchor; clamps at zero.
pub fn remaining(limit: Duration, started_at: Duration, now: Duration) -> Duration {
    limit.saturating_sub(now.saturating_sub(started_at))
}

/// Whole seconds shown to the player; partial seconds round up.
pub fn display_seconds(remaining: Duration) -> u64 {
    remaining.as_secs_f64().ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_clamps_at_zero() {
        let limit = Duration::from_secs(20);
        let start = Duration::from_secs(5);

        assert_eq!(
            remaining(limit, start, Duration::from_secs(5)),
            Duration::from_secs(20)
        );
        assert_eq!(
            remaining(limit, start, Duration::from_secs(17)),
            Duration::from_secs(8)
        );
        assert_eq!(remaining(limit, start, Duration::from_secs(60)), Duration::ZERO);
    }

    #[test]
    fn display_rounds_partial_seconds_up() {
        assert_eq!(display_seconds(Duration::from_secs(8)), 8);
        assert_eq!(display_seconds(Duration::from_millis(7_100)), 8);
        assert_eq!(display_seconds(Duration::from_millis(100)), 1);
        assert_eq!(display_seconds(Duration::ZERO), 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let observer = clock.clone();

        clock.advance(Duration::from_millis(1_500));
        assert_eq!(observer.now(), Duration::from_millis(1_500));

        clock.set(Duration::from_secs(9));
        assert_eq!(observer.now(), Duration::from_secs(9));
    }
}
