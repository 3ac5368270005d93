//! Randomized pauses between page visits.

use std::time::Duration;

use rand::Rng;

/// Inclusive range a politeness pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// No pause at all; used by tests and dry runs against fixtures.
    pub const ZERO: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    #[must_use]
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms.min(max_ms)),
            max: Duration::from_millis(max_ms.max(min_ms)),
        }
    }

    /// A uniformly random duration in `min..=max`.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Sleep for a freshly sampled duration.
    pub async fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis(), "politeness pause");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_within_range() {
        let range = DelayRange::from_millis(2_000, 4_000);
        for _ in 0..200 {
            let d = range.sample();
            assert!(d >= Duration::from_millis(2_000) && d <= Duration::from_millis(4_000));
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        let range = DelayRange::from_millis(1_000, 1_000);
        assert_eq!(range.sample(), Duration::from_millis(1_000));
        assert_eq!(DelayRange::ZERO.sample(), Duration::ZERO);
    }

    #[test]
    fn inverted_bounds_are_normalized() {
        let range = DelayRange::from_millis(500, 100);
        assert_eq!(range.min, Duration::from_millis(100));
        assert_eq!(range.max, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn zero_pause_returns_immediately() {
        DelayRange::ZERO.pause().await;
    }
}
