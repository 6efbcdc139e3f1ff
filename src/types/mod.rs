// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device state and commands.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so conversions between the engine's internal units and the units
//! devices are commanded in cannot produce invalid values.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off
//! - [`Brightness`] - Raw brightness (0-255), the engine's internal scale
//! - [`BrightnessPercent`] - Brightness percentage (0-100), the device scale
//! - [`Mired`] / [`Kelvin`] - Color temperature in both units
//! - [`KelvinRange`] - Supported color temperature range
//! - [`HueSaturation`] - Hue (0-360) and saturation (0-100)

mod brightness;
mod color;
mod power;

pub use brightness::{Brightness, BrightnessPercent};
pub use color::{HueSaturation, Kelvin, KelvinRange, Mired};
pub use power::PowerState;
