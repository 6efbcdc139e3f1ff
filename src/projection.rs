// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing entity views.
//!
//! Projections are plain values computed from engine state; building one
//! never touches the device. A host framework maps them onto its own
//! entity model.

use std::fmt;

use serde::Serialize;

use crate::capabilities::DeviceCapabilities;
use crate::engine::SyncState;
use crate::state::Telemetry;
use crate::types::HueSaturation;

bitflags::bitflags! {
    /// Light features a device exposes, as a bit set.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubsync::projection::SupportedFeatures;
    ///
    /// let features = SupportedFeatures::BRIGHTNESS | SupportedFeatures::COLOR;
    /// assert!(features.contains(SupportedFeatures::COLOR));
    /// assert!(!features.contains(SupportedFeatures::COLOR_TEMP));
    /// assert_eq!(features.bits(), 0b101);
    /// ```
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct SupportedFeatures: u32 {
        /// Brightness can be set.
        const BRIGHTNESS = 1;
        /// Color temperature can be set.
        const COLOR_TEMP = 1 << 1;
        /// Hue and saturation can be set.
        const COLOR = 1 << 2;
    }
}

impl SupportedFeatures {
    /// Derives the feature set from capabilities.
    #[must_use]
    pub fn from_capabilities(caps: &DeviceCapabilities) -> Self {
        let mut features = Self::empty();
        features.set(Self::BRIGHTNESS, caps.dimming);
        features.set(Self::COLOR_TEMP, caps.color_temperature);
        features.set(Self::COLOR, caps.full_color);
        features
    }
}

/// Device registry entry for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Display name.
    pub name: String,
    /// Hardware model.
    pub model: String,
    /// Manufacturer, when the integration knows it.
    pub manufacturer: Option<String>,
    /// Connection identifiers, such as `("mac", "50:c7:bf:...")`.
    pub connections: Vec<(String, String)>,
    /// Firmware version.
    pub sw_version: Option<String>,
}

impl DeviceInfo {
    /// Builds the entry from capabilities.
    ///
    /// The unique id is listed as a MAC connection when it looks like one.
    #[must_use]
    pub fn from_capabilities(caps: &DeviceCapabilities) -> Self {
        let identity = &caps.identity;
        let connections = if looks_like_mac(&identity.unique_id) {
            vec![("mac".to_string(), identity.unique_id.to_ascii_lowercase())]
        } else {
            Vec::new()
        };

        Self {
            name: identity.name.clone(),
            model: identity.model.clone(),
            manufacturer: None,
            connections,
            sw_version: identity.firmware.clone(),
        }
    }

    /// Sets the manufacturer.
    #[must_use]
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }
}

fn looks_like_mac(value: &str) -> bool {
    let parts: Vec<&str> = value.split([':', '-']).collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Light entity view of a device.
///
/// # Examples
///
/// ```
/// use hubsync::projection::LightProjection;
/// use hubsync::{DeviceCapabilities, DeviceIdentity};
///
/// let caps = DeviceCapabilities::color_light(DeviceIdentity::new(
///     "50:C7:BF:00:00:01", "Desk", "LB130",
/// ));
/// let light = LightProjection::from_parts(&caps, None, true);
///
/// assert_eq!(light.unique_id, "50:C7:BF:00:00:01");
/// assert!(!light.is_on);
/// assert!(light.brightness.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightProjection {
    /// Stable unique id.
    pub unique_id: String,
    /// Display name.
    pub name: String,
    /// Registry entry.
    pub device_info: DeviceInfo,
    /// Whether the device answered recently.
    pub available: bool,
    /// Whether the device is on.
    pub is_on: bool,
    /// Raw brightness (0-255).
    pub brightness: Option<u8>,
    /// Brightness percentage.
    pub brightness_pct: Option<u8>,
    /// Color temperature in mireds.
    pub color_temp: Option<u16>,
    /// Coolest supported temperature in mireds.
    pub min_mireds: Option<u16>,
    /// Warmest supported temperature in mireds.
    pub max_mireds: Option<u16>,
    /// Hue and saturation.
    pub hs_color: Option<HueSaturation>,
    /// Supported features.
    pub supported_features: SupportedFeatures,
    /// Telemetry exposed as state attributes.
    pub attributes: Telemetry,
}

impl LightProjection {
    /// Projects an engine state; `None` until capabilities are known.
    #[must_use]
    pub fn from_state(state: &SyncState) -> Option<Self> {
        let caps = state.capabilities()?;
        Some(Self::from_parts(caps, state.snapshot(), state.is_available()))
    }

    /// Projects capabilities and an optional snapshot.
    #[must_use]
    pub fn from_parts(
        caps: &DeviceCapabilities,
        snapshot: Option<&crate::state::DeviceSnapshot>,
        available: bool,
    ) -> Self {
        let brightness = snapshot.and_then(|s| s.brightness());
        let range = caps.kelvin_range.filter(|_| caps.color_temperature);

        Self {
            unique_id: caps.identity.unique_id.clone(),
            name: caps.identity.name.clone(),
            device_info: DeviceInfo::from_capabilities(caps),
            available,
            is_on: snapshot.is_some_and(|s| s.is_on()),
            brightness: brightness.map(|b| b.value()),
            brightness_pct: brightness.map(|b| b.to_percent().value()),
            color_temp: snapshot.and_then(|s| s.color_temp()).map(|m| m.value()),
            min_mireds: range.map(|r| r.min_mireds().value()),
            max_mireds: range.map(|r| r.max_mireds().value()),
            hs_color: snapshot.and_then(|s| s.hue_saturation()),
            supported_features: SupportedFeatures::from_capabilities(caps),
            attributes: snapshot.map(|s| s.telemetry().clone()).unwrap_or_default(),
        }
    }
}

/// Generic sensor entity view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorProjection {
    /// Display name.
    pub name: String,
    /// Stable unique id.
    pub unique_id: String,
    /// Current value; `None` before the first update.
    pub state: Option<f64>,
    /// Unit of the state value.
    pub unit_of_measurement: &'static str,
    /// Icon name.
    pub icon: &'static str,
    /// Whether the host records every update even when the value is unchanged.
    pub force_update: bool,
    /// Extra attributes.
    pub attributes: Telemetry,
}

impl fmt::Display for SensorProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            Some(value) => write!(f, "{}: {value} {}", self.name, self.unit_of_measurement),
            None => write!(f, "{}: unknown", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilitiesBuilder, DeviceIdentity};
    use crate::state::DeviceSnapshot;
    use crate::types::{Brightness, Kelvin, KelvinRange, Mired, PowerState};

    fn cct_caps() -> DeviceCapabilities {
        CapabilitiesBuilder::new(
            DeviceIdentity::new("50:C7:BF:00:00:01", "Desk", "LB120").with_firmware("1.8.6"),
        )
        .with_dimming()
        .with_color_temperature(KelvinRange::new(
            Kelvin::new(2700).unwrap(),
            Kelvin::new(6500).unwrap(),
        ))
        .build()
    }

    #[test]
    fn features_from_capabilities() {
        let features = SupportedFeatures::from_capabilities(&cct_caps());
        assert!(features.contains(SupportedFeatures::BRIGHTNESS | SupportedFeatures::COLOR_TEMP));
        assert!(!features.contains(SupportedFeatures::COLOR));

        let plug = DeviceCapabilities::basic_switch(DeviceIdentity::new("x", "Plug", "HS100"));
        assert_eq!(SupportedFeatures::from_capabilities(&plug), SupportedFeatures::empty());
    }

    #[test]
    fn supported_features_serialize_by_name() {
        let features = SupportedFeatures::BRIGHTNESS | SupportedFeatures::COLOR;
        let json = serde_json::to_string(&features).unwrap();
        assert!(json.contains("BRIGHTNESS"));
        assert!(json.contains("COLOR"));
        assert!(!json.contains("COLOR_TEMP"));
    }

    #[test]
    fn device_info_lists_mac() {
        let info = DeviceInfo::from_capabilities(&cct_caps()).with_manufacturer("TP-Link");
        assert_eq!(
            info.connections,
            vec![("mac".to_string(), "50:c7:bf:00:00:01".to_string())]
        );
        assert_eq!(info.sw_version.as_deref(), Some("1.8.6"));
        assert_eq!(info.manufacturer.as_deref(), Some("TP-Link"));

        let caps =
            DeviceCapabilities::basic_switch(DeviceIdentity::new("kitchen", "Plug", "HS100"));
        assert!(DeviceInfo::from_capabilities(&caps).connections.is_empty());
    }

    #[test]
    fn light_projection_values() {
        let snapshot = DeviceSnapshot::new(PowerState::On)
            .with_brightness(Brightness::new(48))
            .with_color_temp(Mired::new(312).unwrap())
            .with_telemetry("current_power_w", "4.20");

        let light = LightProjection::from_parts(&cct_caps(), Some(&snapshot), true);

        assert!(light.is_on);
        assert_eq!(light.brightness, Some(48));
        assert_eq!(light.brightness_pct, Some(19));
        assert_eq!(light.color_temp, Some(312));
        assert_eq!(light.min_mireds, Some(153));
        assert_eq!(light.max_mireds, Some(370));
        assert!(light.hs_color.is_none());
        assert_eq!(light.attributes.len(), 1);
    }

    #[test]
    fn sensor_display() {
        let sensor = SensorProjection {
            name: "Energy Usage".to_string(),
            unique_id: "energy_usage".to_string(),
            state: Some(512.0),
            unit_of_measurement: "W",
            icon: "mdi:flash",
            force_update: true,
            attributes: Telemetry::new(),
        };
        assert_eq!(sensor.to_string(), "Energy Usage: 512 W");
    }
}
