// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device synchronization state.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::capabilities::DeviceCapabilities;
use crate::state::DeviceSnapshot;

/// Everything an engine knows about its device.
///
/// Owned by exactly one engine; callers get copies through
/// [`SyncEngine::state`](super::SyncEngine::state).
#[derive(Debug, Clone)]
pub struct SyncState {
    pub(crate) snapshot: Option<DeviceSnapshot>,
    pub(crate) capabilities: Option<DeviceCapabilities>,
    pub(crate) available: bool,
    pub(crate) pending_writes: u32,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl SyncState {
    pub(crate) fn new(capabilities: Option<DeviceCapabilities>) -> Self {
        Self {
            snapshot: None,
            capabilities,
            available: true,
            pending_writes: 0,
            last_updated: None,
        }
    }

    /// Last-known snapshot; `None` until the first successful read.
    #[must_use]
    pub fn snapshot(&self) -> Option<&DeviceSnapshot> {
        self.snapshot.as_ref()
    }

    /// Capabilities; `None` until the first successful fetch.
    #[must_use]
    pub fn capabilities(&self) -> Option<&DeviceCapabilities> {
        self.capabilities.as_ref()
    }

    /// Whether the last interaction with the device succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Number of writes started and not yet finished.
    #[must_use]
    pub fn pending_writes(&self) -> u32 {
        self.pending_writes
    }

    /// When the snapshot was last replaced.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Both capabilities and snapshot are known.
    pub(crate) fn initialized(&self) -> Option<(DeviceSnapshot, DeviceCapabilities)> {
        Some((self.snapshot.clone()?, self.capabilities.clone()?))
    }
}

/// Marks a write as in progress for as long as it lives.
pub(crate) struct PendingWrite<'a> {
    state: &'a Mutex<SyncState>,
}

impl<'a> PendingWrite<'a> {
    pub(crate) fn enter(state: &'a Mutex<SyncState>) -> Self {
        state.lock().pending_writes += 1;
        Self { state }
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.pending_writes = state.pending_writes.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    #[test]
    fn starts_available_and_empty() {
        let state = SyncState::new(None);
        assert!(state.is_available());
        assert!(state.snapshot().is_none());
        assert!(state.last_updated().is_none());
        assert!(state.initialized().is_none());
    }

    #[test]
    fn pending_write_guard_counts() {
        let state = Mutex::new(SyncState::new(None));
        {
            let _a = PendingWrite::enter(&state);
            let _b = PendingWrite::enter(&state);
            assert_eq!(state.lock().pending_writes(), 2);
        }
        assert_eq!(state.lock().pending_writes(), 0);
    }

    #[test]
    fn initialized_needs_both_parts() {
        let mut state = SyncState::new(None);
        state.snapshot = Some(DeviceSnapshot::new(PowerState::On));
        assert!(state.initialized().is_none());

        state.capabilities = Some(DeviceCapabilities::basic_switch(
            crate::capabilities::DeviceIdentity::new("id", "Plug", "HS100"),
        ));
        assert!(state.initialized().is_some());
    }
}
