// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published by engines and the registry.
//!
//! Every [`SyncEngine`](crate::engine::SyncEngine) publishes availability
//! flips, snapshot replacements and exhausted writes on an [`EventBus`].
//! The [`DeviceRegistry`](crate::registry::DeviceRegistry) shares one bus
//! across its devices and adds lifecycle events.
//!
//! # Examples
//!
//! ```
//! use hubsync::event::{DeviceId, EventBus, SyncEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id = DeviceId::new();
//! bus.publish(SyncEvent::DeviceAdded { device_id });
//!
//! assert_eq!(rx.try_recv().unwrap().device_id(), device_id);
//! ```

mod device_id;
mod event_bus;
mod sync_event;

pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use sync_event::SyncEvent;
