// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities and identity.
//!
//! Capabilities are fetched once, on the first successful read of a
//! device, and never re-derived afterwards. They decide which snapshot
//! fields a device may carry: a field for an unsupported feature is always
//! absent, never a placeholder value.
//!
//! Adapters that cannot probe a device can construct capabilities from the
//! presets or the [`CapabilitiesBuilder`].

use serde::{Deserialize, Serialize};

use crate::types::KelvinRange;

/// Stable identity of a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Stable unique identifier (typically the MAC address).
    pub unique_id: String,
    /// Display name (the alias configured on the device).
    pub name: String,
    /// Hardware model.
    pub model: String,
    /// Firmware version, when the device reports one.
    pub firmware: Option<String>,
}

impl DeviceIdentity {
    /// Creates an identity without firmware information.
    #[must_use]
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            model: model.into(),
            firmware: None,
        }
    }

    /// Sets the firmware version.
    #[must_use]
    pub fn with_firmware(mut self, firmware: impl Into<String>) -> Self {
        self.firmware = Some(firmware.into());
        self
    }
}

/// Capabilities of a device.
///
/// # Examples
///
/// ```
/// use hubsync::{CapabilitiesBuilder, DeviceCapabilities, DeviceIdentity};
///
/// let identity = DeviceIdentity::new("50:c7:bf:00:00:01", "Desk lamp", "LB130");
/// let caps = DeviceCapabilities::color_light(identity);
/// assert!(caps.dimming);
/// assert!(caps.full_color);
///
/// let plug = CapabilitiesBuilder::new(DeviceIdentity::new("id", "Plug", "HS110"))
///     .with_metering()
///     .build();
/// assert!(!plug.is_light());
/// assert!(plug.metering);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
// Each boolean is an independent device feature flag.
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceCapabilities {
    /// Who the device is.
    pub identity: DeviceIdentity,

    /// Supports brightness control.
    pub dimming: bool,

    /// Supports color temperature control.
    pub color_temperature: bool,

    /// Supports hue/saturation control.
    pub full_color: bool,

    /// Reports energy telemetry.
    pub metering: bool,

    /// Valid color temperature range; only set with `color_temperature`.
    pub kelvin_range: Option<KelvinRange>,
}

impl DeviceCapabilities {
    /// On/off only (a plain switch or plug).
    #[must_use]
    pub fn basic_switch(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            dimming: false,
            color_temperature: false,
            full_color: false,
            metering: false,
            kelvin_range: None,
        }
    }

    /// Dimmable white light.
    #[must_use]
    pub fn dimmable_light(identity: DeviceIdentity) -> Self {
        Self {
            dimming: true,
            ..Self::basic_switch(identity)
        }
    }

    /// Tunable white light with the given color temperature range.
    #[must_use]
    pub fn cct_light(identity: DeviceIdentity, range: KelvinRange) -> Self {
        Self {
            color_temperature: true,
            kelvin_range: Some(range),
            ..Self::dimmable_light(identity)
        }
    }

    /// Full color light without tunable white.
    #[must_use]
    pub fn color_light(identity: DeviceIdentity) -> Self {
        Self {
            full_color: true,
            ..Self::dimmable_light(identity)
        }
    }

    /// Returns whether any light feature beyond on/off is supported.
    #[must_use]
    pub const fn is_light(&self) -> bool {
        self.dimming || self.color_temperature || self.full_color
    }
}

/// Builder for custom capabilities.
#[derive(Debug)]
pub struct CapabilitiesBuilder {
    inner: DeviceCapabilities,
}

impl CapabilitiesBuilder {
    /// Starts from an on/off-only device.
    #[must_use]
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            inner: DeviceCapabilities::basic_switch(identity),
        }
    }

    /// Enables brightness control.
    #[must_use]
    pub fn with_dimming(mut self) -> Self {
        self.inner.dimming = true;
        self
    }

    /// Enables color temperature control over the given range.
    #[must_use]
    pub fn with_color_temperature(mut self, range: KelvinRange) -> Self {
        self.inner.color_temperature = true;
        self.inner.kelvin_range = Some(range);
        self
    }

    /// Enables hue/saturation control.
    #[must_use]
    pub fn with_full_color(mut self) -> Self {
        self.inner.full_color = true;
        self
    }

    /// Enables energy telemetry.
    #[must_use]
    pub fn with_metering(mut self) -> Self {
        self.inner.metering = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> DeviceCapabilities {
        self.inner
    }
}
