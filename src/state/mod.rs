// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! A [`DeviceSnapshot`] is the immutable record of a device's last-known
//! properties. Adapters report a [`DeviceReading`] in device-native units,
//! which the engine converts into a snapshot. A [`LightChange`] is a partial
//! update merged over the current snapshot.
//!
//! # Examples
//!
//! ```
//! use hubsync::state::{DeviceSnapshot, LightChange};
//! use hubsync::types::{Brightness, PowerState};
//! use hubsync::{DeviceCapabilities, DeviceIdentity};
//!
//! let caps = DeviceCapabilities::dimmable_light(DeviceIdentity::new("id", "Lamp", "KL110"));
//! let current = DeviceSnapshot::new(PowerState::Off).with_brightness(Brightness::new(40));
//!
//! let desired = current.merged(&LightChange::turn_on(), &caps);
//! assert!(desired.is_on());
//! assert_eq!(desired.brightness(), Some(Brightness::new(40)));
//! ```

mod change;
mod snapshot;

pub use change::LightChange;
pub use snapshot::{DeviceReading, DeviceSnapshot, Telemetry, TelemetryValue};
