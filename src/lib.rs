// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hubsync` - Device-state synchronization for home-automation hubs.
//!
//! This library keeps a hub's view of smart bulbs, plugs and energy
//! sensors consistent with the devices themselves, over unreliable local
//! networks and cloud APIs.
//!
//! # Features
//!
//! - **Optimistic writes**: the desired state is shown immediately and
//!   pushed to the device as a minimal command sequence
//! - **Bounded retry**: a failed sequence is re-sent whole, once by default
//! - **Availability tracking**: logged and published once per transition
//! - **Stale reads**: a failed poll keeps the last known state
//! - **Throttled polling**: at most one fetch per device and data class
//!   per interval
//! - **Energy sensors**: realtime and trend readings from an energy monitor
//!
//! # Quick Start
//!
//! ## One device
//!
//! ```no_run
//! use hubsync::adapter::{HttpAdapter, HttpConfig};
//! use hubsync::engine::{SyncConfig, SyncEngine};
//! use hubsync::state::LightChange;
//! use hubsync::types::{Brightness, Mired};
//!
//! #[tokio::main]
//! async fn main() -> hubsync::Result<()> {
//!     let adapter = HttpAdapter::new(HttpConfig::new("192.168.1.100"))?;
//!     let engine = SyncEngine::new(adapter, SyncConfig::default());
//!
//!     // First read fetches capabilities, then state
//!     engine.refresh().await;
//!
//!     engine
//!         .turn_on(
//!             LightChange::new()
//!                 .brightness(Brightness::new(200))
//!                 .color_temp(Mired::new(300)?),
//!         )
//!         .await;
//!
//!     if let Some(snapshot) = engine.snapshot() {
//!         println!("on: {}, brightness: {:?}", snapshot.is_on(), snapshot.brightness());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Many devices
//!
//! ```no_run
//! use hubsync::adapter::{HttpAdapter, HttpConfig};
//! use hubsync::engine::SyncConfig;
//! use hubsync::registry::DeviceRegistry;
//!
//! #[tokio::main]
//! async fn main() -> hubsync::Result<()> {
//!     let registry = DeviceRegistry::new();
//!     let mut events = registry.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {event:?}");
//!         }
//!     });
//!
//!     for host in ["192.168.1.100", "192.168.1.101"] {
//!         let adapter = HttpAdapter::new(HttpConfig::new(host))?;
//!         registry.add_device(adapter, SyncConfig::default()).await;
//!     }
//!
//!     // Call on the host's own cadence; throttled devices return at once
//!     registry.poll_all().await;
//!     Ok(())
//! }
//! ```

pub mod adapter;
mod capabilities;
pub mod command;
pub mod energy;
pub mod engine;
pub mod error;
pub mod event;
pub mod projection;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod types;

pub use adapter::DeviceAdapter;
#[cfg(feature = "http")]
pub use adapter::{HttpAdapter, HttpConfig};
pub use capabilities::{CapabilitiesBuilder, DeviceCapabilities, DeviceIdentity};
pub use command::{DeviceCommand, plan_commands};
pub use engine::{
    ApplyOutcome, RefreshOutcome, SyncConfig, SyncEngine, SyncState, WriteFailurePolicy,
};
pub use error::{AdapterError, AdapterErrorKind, Error, Result, ValueError};
pub use event::{DeviceId, EventBus, SyncEvent};
pub use registry::DeviceRegistry;
pub use scheduler::{DataClass, PollIntervals, PollOutcome, Throttle};
pub use state::{DeviceReading, DeviceSnapshot, LightChange, TelemetryValue};
pub use types::{
    Brightness, BrightnessPercent, HueSaturation, Kelvin, KelvinRange, Mired, PowerState,
};
