// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of synchronized devices.
//!
//! The registry owns one [`SyncEngine`] per device and a shared
//! [`EventBus`]. The map is only locked to look up or clone an engine
//! handle; device I/O always runs outside the lock, so a slow device never
//! holds up another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinSet;

use crate::adapter::DeviceAdapter;
use crate::engine::{ApplyOutcome, RefreshOutcome, SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::event::{DeviceId, EventBus, SyncEvent};
use crate::scheduler::PollOutcome;
use crate::state::LightChange;

/// Devices keyed by [`DeviceId`], all driven by the same adapter type.
///
/// # Examples
///
/// ```no_run
/// use hubsync::adapter::{HttpAdapter, HttpConfig};
/// use hubsync::engine::SyncConfig;
/// use hubsync::registry::DeviceRegistry;
///
/// # async fn example() -> hubsync::Result<()> {
/// let registry = DeviceRegistry::new();
/// let mut events = registry.subscribe();
///
/// let adapter = HttpAdapter::new(HttpConfig::new("192.168.1.100"))?;
/// let id = registry.add_device(adapter, SyncConfig::default()).await;
///
/// for (device_id, outcome) in registry.poll_all().await {
///     println!("{device_id}: {outcome:?}");
/// }
/// # let _ = (id, events.try_recv());
/// # Ok(())
/// # }
/// ```
pub struct DeviceRegistry<A> {
    devices: RwLock<HashMap<DeviceId, Arc<SyncEngine<A>>>>,
    event_bus: EventBus,
}

impl<A: DeviceAdapter + 'static> DeviceRegistry<A> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Creates an empty registry publishing on an existing bus.
    #[must_use]
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            event_bus,
        }
    }

    /// Subscribes to events from every device.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_bus.subscribe()
    }

    /// Registers a device. Nothing is read until the first poll or write.
    pub async fn add_device(&self, adapter: A, config: SyncConfig) -> DeviceId {
        let device_id = DeviceId::new();
        let engine = SyncEngine::with_parts(
            device_id,
            Arc::new(adapter),
            config,
            self.event_bus.clone(),
        );

        tracing::debug!(
            device_id = %device_id.short(),
            host = %engine.adapter().host(),
            "Adding device"
        );

        self.devices
            .write()
            .await
            .insert(device_id, Arc::new(engine));
        self.event_bus.publish(SyncEvent::DeviceAdded { device_id });

        device_id
    }

    /// Removes a device and drops its state.
    ///
    /// Returns `false` if the id is unknown. An operation already running on
    /// the device finishes on its own handle.
    pub async fn remove_device(&self, device_id: DeviceId) -> bool {
        let removed = self.devices.write().await.remove(&device_id).is_some();

        if removed {
            tracing::debug!(device_id = %device_id.short(), "Removed device");
            self.event_bus.publish(SyncEvent::DeviceRemoved { device_id });
        }

        removed
    }

    /// Returns the engine of a device.
    pub async fn get(&self, device_id: DeviceId) -> Option<Arc<SyncEngine<A>>> {
        self.devices.read().await.get(&device_id).cloned()
    }

    /// Ids of every registered device.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Number of registered devices.
    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns `true` if no device is registered.
    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }

    /// Applies a change to one device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the id is unknown. Device
    /// failures are reported in the outcome, not as errors.
    pub async fn apply(&self, device_id: DeviceId, change: LightChange) -> Result<ApplyOutcome> {
        let engine = self.get(device_id).await.ok_or(Error::DeviceNotFound)?;
        Ok(engine.apply(change).await)
    }

    /// Polls every device concurrently, each under its own throttle.
    pub async fn poll_all(&self) -> Vec<(DeviceId, PollOutcome<RefreshOutcome>)> {
        let engines: Vec<_> = self
            .devices
            .read()
            .await
            .iter()
            .map(|(id, engine)| (*id, Arc::clone(engine)))
            .collect();

        let mut tasks = JoinSet::new();
        for (device_id, engine) in engines {
            tasks.spawn(async move { (device_id, engine.poll().await) });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(error = %e, "Poll task failed"),
            }
        }
        results
    }
}

impl<A> std::fmt::Debug for DeviceRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

impl<A: DeviceAdapter + 'static> Default for DeviceRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
