//! Wall-clock access, in whole seconds since the Unix epoch.
//!
//! Token expiry is compared against this clock, so tests can pin "now"
//! with [`MockClock`] instead of minting tokens relative to the real time.

use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(any(test, feature = "test-support"))]
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
#[cfg(any(test, feature = "test-support"))]
use std::time::Duration;

pub trait GetUnixTime {
    fn unix_time(&self) -> u64;
}

/// Zero-sized type, delegates to `std::time::SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl GetUnixTime for SystemClock {
    #[inline]
    fn unix_time(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Time only moves when [`advance`](MockClock::advance) or
/// [`set`](MockClock::set) is called. Clones share the same time.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    current: Arc<AtomicU64>,
}

#[cfg(any(test, feature = "test-support"))]
impl MockClock {
    pub fn at(unix_time: u64) -> Self {
        let clock = Self::default();
        clock.set(unix_time);
        clock
    }

    pub fn set(&self, unix_time: u64) {
        self.current.store(unix_time, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.current.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl GetUnixTime for MockClock {
    fn unix_time(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.unix_time() > 1_577_836_800);
    }

    #[test]
    fn mock_clock_moves_only_when_told() {
        let clock = MockClock::at(1_000);
        assert_eq!(clock.unix_time(), 1_000);

        clock.advance(Duration::from_secs(30));
        assert_eq!(clock.unix_time(), 1_030);

        clock.set(10);
        assert_eq!(clock.unix_time(), 10);
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::at(5);
        let other = clock.clone();
        clock.advance(Duration::from_secs(5));
        assert_eq!(other.unix_time(), 10);
    }
}
