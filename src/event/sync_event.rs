// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronization event types.

use serde::Serialize;

use crate::state::DeviceSnapshot;

use super::DeviceId;

/// Events published by engines and the registry.
///
/// # Examples
///
/// ```
/// use hubsync::event::{DeviceId, SyncEvent};
///
/// let device_id = DeviceId::new();
/// let event = SyncEvent::AvailabilityChanged { device_id, available: false };
///
/// assert_eq!(event.device_id(), device_id);
/// assert!(!event.is_lifecycle());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A device was added to the registry.
    DeviceAdded {
        /// Registry identifier.
        device_id: DeviceId,
    },

    /// A device was removed from the registry.
    DeviceRemoved {
        /// Registry identifier.
        device_id: DeviceId,
    },

    /// The availability flag flipped.
    AvailabilityChanged {
        /// Registry identifier.
        device_id: DeviceId,
        /// New availability.
        available: bool,
    },

    /// The stored snapshot was replaced, by a read or an optimistic write.
    SnapshotUpdated {
        /// Registry identifier.
        device_id: DeviceId,
        /// The new snapshot.
        snapshot: DeviceSnapshot,
    },

    /// A write exhausted its attempts.
    WriteFailed {
        /// Registry identifier.
        device_id: DeviceId,
        /// Number of attempts made.
        attempts: u32,
        /// Last adapter error.
        error: String,
    },
}

impl SyncEvent {
    /// Returns the device the event refers to.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::AvailabilityChanged { device_id, .. }
            | Self::SnapshotUpdated { device_id, .. }
            | Self::WriteFailed { device_id, .. } => *device_id,
        }
    }

    /// Returns `true` for registry add/remove events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    #[test]
    fn device_id_of_every_variant() {
        let id = DeviceId::new();
        let events = [
            SyncEvent::DeviceAdded { device_id: id },
            SyncEvent::DeviceRemoved { device_id: id },
            SyncEvent::AvailabilityChanged {
                device_id: id,
                available: true,
            },
            SyncEvent::SnapshotUpdated {
                device_id: id,
                snapshot: DeviceSnapshot::new(PowerState::On),
            },
            SyncEvent::WriteFailed {
                device_id: id,
                attempts: 2,
                error: "timeout".to_string(),
            },
        ];

        for event in &events {
            assert_eq!(event.device_id(), id);
        }
        assert_eq!(events.iter().filter(|e| e.is_lifecycle()).count(), 2);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = SyncEvent::WriteFailed {
            device_id: DeviceId::new(),
            attempts: 2,
            error: "timeout".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "write_failed");
        assert_eq!(json["attempts"], 2);
    }
}
