// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device client adapters.
//!
//! A [`DeviceAdapter`] wraps the handle of one remote device and exposes
//! read and write operations that may fail transiently. The engine calls it
//! but does not own the device behind it.
//!
//! # Adapters
//!
//! - [`HttpAdapter`]: local JSON command API over HTTP (`GET /cm?cmnd=...`)
//!
//! Other transports implement the trait directly. Methods return
//! `Send` futures so engines can be polled from spawned tasks.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpAdapter, HttpConfig};

use std::future::Future;

use crate::capabilities::DeviceCapabilities;
use crate::command::DeviceCommand;
use crate::error::AdapterError;
use crate::state::DeviceReading;
use crate::types::{BrightnessPercent, HueSaturation, Kelvin};

/// Contract every device client must fulfil.
pub trait DeviceAdapter: Send + Sync {
    /// Human-readable address of the device, used in log lines.
    fn host(&self) -> &str;

    /// Fetches identity and supported features.
    fn fetch_capabilities(
        &self,
    ) -> impl Future<Output = Result<DeviceCapabilities, AdapterError>> + Send;

    /// Fetches the current state in device-native units.
    ///
    /// `capabilities` are the ones returned by an earlier
    /// [`fetch_capabilities`](Self::fetch_capabilities) call; adapters use
    /// them to skip reads the device cannot answer.
    fn fetch_state(
        &self,
        capabilities: &DeviceCapabilities,
    ) -> impl Future<Output = Result<DeviceReading, AdapterError>> + Send;

    /// Switches the device on.
    fn send_power_on(&self) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Switches the device off.
    fn send_power_off(&self) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Sets the color temperature.
    fn send_color_temperature(
        &self,
        kelvin: Kelvin,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Sets hue, saturation and brightness in one command.
    fn send_hue_saturation_brightness(
        &self,
        color: HueSaturation,
        brightness: BrightnessPercent,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Sets brightness alone.
    fn send_brightness(
        &self,
        brightness: BrightnessPercent,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Dispatches a planned command to the matching `send_*` method.
    fn execute(
        &self,
        command: DeviceCommand,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        async move {
            match command {
                DeviceCommand::PowerOn => self.send_power_on().await,
                DeviceCommand::PowerOff => self.send_power_off().await,
                DeviceCommand::ColorTemperature(kelvin) => {
                    self.send_color_temperature(kelvin).await
                }
                DeviceCommand::HueSaturationBrightness { color, brightness } => {
                    self.send_hue_saturation_brightness(color, brightness).await
                }
                DeviceCommand::Brightness(brightness) => self.send_brightness(brightness).await,
            }
        }
    }
}
