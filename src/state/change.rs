// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partial state updates.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, HueSaturation, Mired, PowerState};

/// A partial update: any subset of power, brightness, color temperature and
/// hue/saturation.
///
/// # Examples
///
/// ```
/// use hubsync::state::LightChange;
/// use hubsync::types::{Brightness, HueSaturation, PowerState};
///
/// let change = LightChange::new()
///     .power(PowerState::On)
///     .brightness(Brightness::new(153))
///     .hue_saturation(HueSaturation::new(10, 50).unwrap());
///
/// assert!(!change.is_empty());
/// assert!(LightChange::turn_off().power.is_some());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightChange {
    /// Desired power state.
    pub power: Option<PowerState>,
    /// Desired raw brightness (0-255).
    pub brightness: Option<Brightness>,
    /// Desired color temperature.
    pub color_temp: Option<Mired>,
    /// Desired hue/saturation.
    pub hue_saturation: Option<HueSaturation>,
}

impl LightChange {
    /// Creates an empty change.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A change that only turns the device off.
    #[must_use]
    pub fn turn_off() -> Self {
        Self::new().power(PowerState::Off)
    }

    /// A change that only turns the device on.
    #[must_use]
    pub fn turn_on() -> Self {
        Self::new().power(PowerState::On)
    }

    /// Sets the desired power state.
    #[must_use]
    pub fn power(mut self, power: PowerState) -> Self {
        self.power = Some(power);
        self
    }

    /// Sets the desired brightness.
    #[must_use]
    pub fn brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Sets the desired color temperature.
    #[must_use]
    pub fn color_temp(mut self, color_temp: Mired) -> Self {
        self.color_temp = Some(color_temp);
        self
    }

    /// Sets the desired hue/saturation.
    #[must_use]
    pub fn hue_saturation(mut self, hs: HueSaturation) -> Self {
        self.hue_saturation = Some(hs);
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.brightness.is_none()
            && self.color_temp.is_none()
            && self.hue_saturation.is_none()
    }
}
