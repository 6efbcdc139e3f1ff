// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for synchronization events.

use tokio::sync::broadcast;

use super::SyncEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out channel for [`SyncEvent`]s.
///
/// Cloning shares the underlying channel. A subscriber that falls more than
/// the channel capacity behind receives `RecvError::Lagged` and loses the
/// oldest events; publishers are never blocked.
///
/// # Examples
///
/// ```
/// use hubsync::event::{DeviceId, EventBus, SyncEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(SyncEvent::DeviceAdded { device_id: DeviceId::new() });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity of 256 events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering at most `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Without subscribers the event is discarded.
    pub fn publish(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DeviceId;

    #[test]
    fn subscriber_count_follows_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(SyncEvent::DeviceRemoved {
            device_id: DeviceId::new(),
        });
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let mut rx1 = bus.subscribe();
        let mut rx2 = clone.subscribe();

        let device_id = DeviceId::new();
        clone.publish(SyncEvent::AvailabilityChanged {
            device_id,
            available: false,
        });

        assert_eq!(rx1.recv().await.unwrap().device_id(), device_id);
        assert_eq!(rx2.recv().await.unwrap().device_id(), device_id);
    }

    #[tokio::test]
    async fn slow_subscriber_lags() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();
        let device_id = DeviceId::new();

        for _ in 0..3 {
            bus.publish(SyncEvent::DeviceAdded { device_id });
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }
}
