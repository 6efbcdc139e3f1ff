// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Poll throttling.
//!
//! The host may ask for updates as often as it likes; a [`Throttle`] makes
//! sure the adapter is hit at most once per interval for a given
//! (device, data class) pair. Throttled calls return immediately.
//!
//! Time comes from [`tokio::time::Instant`], so tests can pause and advance
//! the clock.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// How often a kind of data may be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataClass {
    /// Live state and realtime readings.
    Fast,
    /// Aggregates such as energy trends.
    Slow,
}

/// Minimum intervals per [`DataClass`].
///
/// # Examples
///
/// ```
/// use hubsync::scheduler::{DataClass, PollIntervals};
/// use std::time::Duration;
///
/// let intervals = PollIntervals::default().with_fast(Duration::from_secs(30));
/// assert_eq!(intervals.interval(DataClass::Fast), Duration::from_secs(30));
/// assert_eq!(intervals.interval(DataClass::Slow), Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    fast: Duration,
    slow: Duration,
}

impl PollIntervals {
    /// Default minimum interval for [`DataClass::Fast`].
    pub const DEFAULT_FAST: Duration = Duration::from_secs(60);
    /// Default minimum interval for [`DataClass::Slow`].
    pub const DEFAULT_SLOW: Duration = Duration::from_secs(300);

    /// Overrides the fast interval.
    #[must_use]
    pub fn with_fast(mut self, interval: Duration) -> Self {
        self.fast = interval;
        self
    }

    /// Overrides the slow interval.
    #[must_use]
    pub fn with_slow(mut self, interval: Duration) -> Self {
        self.slow = interval;
        self
    }

    /// Interval for a data class.
    #[must_use]
    pub fn interval(&self, class: DataClass) -> Duration {
        match class {
            DataClass::Fast => self.fast,
            DataClass::Slow => self.slow,
        }
    }

    /// Builds a throttle for a data class.
    #[must_use]
    pub fn throttle(&self, class: DataClass) -> Throttle {
        Throttle::new(self.interval(class))
    }
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            fast: Self::DEFAULT_FAST,
            slow: Self::DEFAULT_SLOW,
        }
    }
}

/// Rate limiter admitting one call per interval.
///
/// The slot is claimed when [`try_acquire`](Self::try_acquire) returns
/// `true`, before any I/O, so two concurrent callers never both proceed.
/// A failed call still consumes its slot.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle that admits the first call immediately.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Minimum spacing between admitted calls.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Claims the slot if the interval has elapsed since the last claim.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock();
        match *last {
            Some(previous) if now.duration_since(previous) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Forgets the last claim so the next call is admitted.
    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

/// Result of a throttled operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The operation ran.
    Ran(T),
    /// The call fell inside the throttle window; nothing was done.
    Throttled,
}

impl<T> PollOutcome<T> {
    /// Returns `true` if the call was throttled.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled)
    }

    /// Returns the inner outcome if the operation ran.
    #[must_use]
    pub fn ran(self) -> Option<T> {
        match self {
            Self::Ran(outcome) => Some(outcome),
            Self::Throttled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn admits_once_per_interval() {
        let throttle = Throttle::new(Duration::from_secs(60));

        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!throttle.try_acquire());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_readmits() {
        let throttle = Throttle::new(Duration::from_secs(300));
        assert!(throttle.try_acquire());
        throttle.reset();
        assert!(throttle.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn classes_are_independent() {
        let intervals = PollIntervals::default();
        let fast = intervals.throttle(DataClass::Fast);
        let slow = intervals.throttle(DataClass::Slow);

        assert!(fast.try_acquire());
        assert!(slow.try_acquire());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(fast.try_acquire());
        assert!(!slow.try_acquire());

        tokio::time::advance(Duration::from_secs(240)).await;
        assert!(slow.try_acquire());
    }

    #[test]
    fn outcome_helpers() {
        assert!(PollOutcome::<()>::Throttled.is_throttled());
        assert_eq!(PollOutcome::Ran(3).ran(), Some(3));
        assert_eq!(PollOutcome::<u8>::Throttled.ran(), None);
    }
}
