// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device commands and the planner that derives them from two snapshots.
//!
//! [`plan_commands`] computes the minimal command sequence that moves a
//! device from one snapshot to another, in a fixed order:
//!
//! 1. Power off, if the device is being switched off. Nothing else is
//!    sent: switching off invalidates brightness and color targets.
//! 2. Power on, if the device is being switched on.
//! 3. Color temperature, if it changed.
//! 4. Hue/saturation with brightness bundled in, if the color changed.
//! 5. Otherwise brightness alone, if it changed.
//!
//! Color and brightness never go out as separate commands in one plan:
//! the wire protocol couples them, so a color command always carries the
//! desired brightness.

use std::fmt;

use crate::state::DeviceSnapshot;
use crate::types::{BrightnessPercent, HueSaturation, Kelvin};

/// A single command sent to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Switch the device on.
    PowerOn,
    /// Switch the device off.
    PowerOff,
    /// Set the color temperature.
    ColorTemperature(Kelvin),
    /// Set hue, saturation and brightness in one command.
    HueSaturationBrightness {
        /// Hue and saturation.
        color: HueSaturation,
        /// Brightness to apply together with the color.
        brightness: BrightnessPercent,
    },
    /// Set brightness alone.
    Brightness(BrightnessPercent),
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerOn => f.write_str("power on"),
            Self::PowerOff => f.write_str("power off"),
            Self::ColorTemperature(k) => write!(f, "color temperature {k}"),
            Self::HueSaturationBrightness { color, brightness } => {
                write!(f, "hsb {color},{}", brightness.value())
            }
            Self::Brightness(b) => write!(f, "brightness {b}"),
        }
    }
}

/// Plans the commands that move a device from `old` to `new`.
///
/// Returns an empty plan when nothing relevant changed.
///
/// # Examples
///
/// ```
/// use hubsync::command::{DeviceCommand, plan_commands};
/// use hubsync::state::DeviceSnapshot;
/// use hubsync::types::{Brightness, PowerState};
///
/// let old = DeviceSnapshot::new(PowerState::On).with_brightness(Brightness::new(10));
/// let new = DeviceSnapshot::new(PowerState::Off).with_brightness(Brightness::new(200));
///
/// assert_eq!(plan_commands(&old, &new), vec![DeviceCommand::PowerOff]);
/// ```
#[must_use]
pub fn plan_commands(old: &DeviceSnapshot, new: &DeviceSnapshot) -> Vec<DeviceCommand> {
    let mut plan = Vec::new();

    if new.power() != old.power() {
        if !new.is_on() {
            plan.push(DeviceCommand::PowerOff);
            return plan;
        }
        plan.push(DeviceCommand::PowerOn);
    }

    if new.color_temp() != old.color_temp()
        && let Some(mired) = new.color_temp()
    {
        plan.push(DeviceCommand::ColorTemperature(mired.to_kelvin()));
    }

    let brightness = new
        .brightness()
        .map_or(BrightnessPercent::MAX, |b| b.to_percent());

    if new.hue_saturation() != old.hue_saturation()
        && let Some(color) = new.hue_saturation()
    {
        plan.push(DeviceCommand::HueSaturationBrightness { color, brightness });
    } else if new.brightness() != old.brightness() && new.brightness().is_some() {
        plan.push(DeviceCommand::Brightness(brightness));
    }

    plan
}
