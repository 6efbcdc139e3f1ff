// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.

use crate::capabilities::DeviceCapabilities;
use crate::scheduler::PollIntervals;

/// What happens to the optimistic snapshot when every write attempt failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Keep showing the desired state until the next successful read.
    #[default]
    KeepOptimistic,
    /// Restore the snapshot held before the write.
    Rollback,
}

/// Configuration for a [`SyncEngine`](super::SyncEngine).
///
/// # Examples
///
/// ```
/// use hubsync::engine::{SyncConfig, WriteFailurePolicy};
///
/// let config = SyncConfig::default()
///     .with_max_attempts(3)
///     .with_write_failure_policy(WriteFailurePolicy::Rollback);
///
/// assert_eq!(config.max_attempts, 3);
/// assert_eq!(SyncConfig::default().max_attempts, 2);
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Attempts per write, counting the first one. At least 1.
    pub max_attempts: u32,
    /// Policy applied when a write exhausts its attempts.
    pub write_failure_policy: WriteFailurePolicy,
    /// Minimum polling intervals.
    pub poll_intervals: PollIntervals,
    /// Capabilities known in advance, for adapters that cannot probe them.
    pub capabilities: Option<DeviceCapabilities>,
}

impl SyncConfig {
    /// One initial attempt plus one retry.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

    /// Sets the number of attempts per write; zero is raised to one.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the write failure policy.
    #[must_use]
    pub fn with_write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    /// Sets the polling intervals.
    #[must_use]
    pub fn with_poll_intervals(mut self, intervals: PollIntervals) -> Self {
        self.poll_intervals = intervals;
        self
    }

    /// Seeds the capabilities; the adapter is then never asked for them.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            write_failure_policy: WriteFailurePolicy::default(),
            poll_intervals: PollIntervals::default(),
            capabilities: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.write_failure_policy, WriteFailurePolicy::KeepOptimistic);
        assert_eq!(config.poll_intervals, PollIntervals::default());
        assert!(config.capabilities.is_none());
    }

    #[test]
    fn zero_attempts_becomes_one() {
        assert_eq!(SyncConfig::default().with_max_attempts(0).max_attempts, 1);
    }
}
