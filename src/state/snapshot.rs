// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device snapshots and adapter readings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::DeviceCapabilities;
use crate::types::{Brightness, BrightnessPercent, HueSaturation, Kelvin, Mired, PowerState};

use super::LightChange;

/// Value of an auxiliary telemetry field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    /// A numeric reading.
    Number(f64),
    /// A preformatted or textual reading.
    Text(String),
}

impl TelemetryValue {
    /// Returns the numeric value, parsing text if needed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for TelemetryValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for TelemetryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for TelemetryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Telemetry fields keyed by name, in a stable order.
pub type Telemetry = BTreeMap<String, TelemetryValue>;

/// Immutable record of a device's observed properties at one point in time.
///
/// Brightness is held on the raw 0-255 scale and color temperature in
/// mireds. Fields the device does not support are always `None`.
///
/// # Examples
///
/// ```
/// use hubsync::state::DeviceSnapshot;
/// use hubsync::types::{Brightness, PowerState};
///
/// let snapshot = DeviceSnapshot::new(PowerState::On).with_brightness(Brightness::new(128));
/// assert!(snapshot.is_on());
/// assert_eq!(snapshot.brightness(), Some(Brightness::new(128)));
/// assert!(snapshot.color_temp().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    power: PowerState,
    brightness: Option<Brightness>,
    color_temp: Option<Mired>,
    hue_saturation: Option<HueSaturation>,
    telemetry: Telemetry,
}

impl DeviceSnapshot {
    /// Creates a snapshot carrying only a power state.
    #[must_use]
    pub fn new(power: PowerState) -> Self {
        Self {
            power,
            ..Self::default()
        }
    }

    /// Returns a copy with the given brightness.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Returns a copy with the given color temperature.
    #[must_use]
    pub fn with_color_temp(mut self, color_temp: Mired) -> Self {
        self.color_temp = Some(color_temp);
        self
    }

    /// Returns a copy with the given hue/saturation.
    #[must_use]
    pub fn with_hue_saturation(mut self, hs: HueSaturation) -> Self {
        self.hue_saturation = Some(hs);
        self
    }

    /// Returns a copy with an added telemetry field.
    #[must_use]
    pub fn with_telemetry(
        mut self,
        key: impl Into<String>,
        value: impl Into<TelemetryValue>,
    ) -> Self {
        self.telemetry.insert(key.into(), value.into());
        self
    }

    /// Power state.
    #[must_use]
    pub const fn power(&self) -> PowerState {
        self.power
    }

    /// Shorthand for `power().is_on()`.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.power.is_on()
    }

    /// Raw brightness (0-255).
    #[must_use]
    pub const fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    /// Color temperature in mireds.
    #[must_use]
    pub const fn color_temp(&self) -> Option<Mired> {
        self.color_temp
    }

    /// Hue/saturation pair.
    #[must_use]
    pub const fn hue_saturation(&self) -> Option<HueSaturation> {
        self.hue_saturation
    }

    /// Auxiliary telemetry.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Returns a copy with every field the device cannot carry removed.
    #[must_use]
    pub fn masked(mut self, caps: &DeviceCapabilities) -> Self {
        if !caps.dimming {
            self.brightness = None;
        }
        if !caps.color_temperature {
            self.color_temp = None;
        }
        if !caps.full_color {
            self.hue_saturation = None;
        }
        if !caps.metering {
            self.telemetry.clear();
        }
        self
    }

    /// Merges a partial change over this snapshot.
    ///
    /// Fields present in the change replace the current value, absent ones
    /// keep it. Attribute changes are merged whatever the power state is.
    /// Fields the device does not support are dropped.
    #[must_use]
    pub fn merged(&self, change: &LightChange, caps: &DeviceCapabilities) -> Self {
        let mut next = self.clone();

        if let Some(power) = change.power {
            next.power = power;
        }

        if let Some(brightness) = change.brightness {
            if caps.dimming {
                next.brightness = Some(brightness);
            } else {
                tracing::debug!(
                    device = %caps.identity.name,
                    "Dropping brightness change for non-dimmable device"
                );
            }
        }

        if let Some(color_temp) = change.color_temp {
            if caps.color_temperature {
                next.color_temp = Some(color_temp);
            } else {
                tracing::debug!(
                    device = %caps.identity.name,
                    "Dropping color temperature change for unsupported device"
                );
            }
        }

        if let Some(hs) = change.hue_saturation {
            if caps.full_color {
                next.hue_saturation = Some(hs);
            } else {
                tracing::debug!(
                    device = %caps.identity.name,
                    "Dropping color change for unsupported device"
                );
            }
        }

        next
    }
}

/// State as reported by an adapter, in device-native units.
///
/// Adapters fill what the device reports; the engine converts the reading
/// to a [`DeviceSnapshot`] and masks it against the device capabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceReading {
    /// Whether the device is on.
    pub is_on: bool,
    /// Brightness percentage.
    pub brightness: Option<BrightnessPercent>,
    /// Color temperature in Kelvin. Adapters report a device's "0 K" as `None`.
    pub color_temp: Option<Kelvin>,
    /// Hue/saturation pair.
    pub hue_saturation: Option<HueSaturation>,
    /// Energy and other auxiliary telemetry.
    pub telemetry: Telemetry,
}

impl DeviceReading {
    /// Converts to engine units and masks against the capabilities.
    #[must_use]
    pub fn into_snapshot(self, caps: &DeviceCapabilities) -> DeviceSnapshot {
        DeviceSnapshot {
            power: PowerState::from(self.is_on),
            brightness: self.brightness.map(BrightnessPercent::to_raw),
            color_temp: self.color_temp.map(Kelvin::to_mired),
            hue_saturation: self.hue_saturation,
            telemetry: self.telemetry,
        }
        .masked(caps)
    }
}
