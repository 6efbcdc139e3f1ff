// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-home energy monitoring.
//!
//! An [`EnergyMonitor`] polls a cloud energy service through an
//! [`EnergyAdapter`] and feeds a set of [`EnergySensor`]s:
//!
//! - active power, for consumption and production (fast data)
//! - daily, weekly, monthly and yearly totals for both flows (slow data)
//! - optionally, one power sensor per appliance the service detected
//!
//! Realtime and trend fetches are throttled independently. A failed fetch
//! is logged and leaves every sensor at its previous value.
//!
//! # Examples
//!
//! ```no_run
//! use hubsync::energy::{EnergyAdapter, EnergyConfig, EnergyMonitor};
//!
//! # async fn example<A: EnergyAdapter>(adapter: A) -> hubsync::Result<()> {
//! let monitor = EnergyMonitor::new(adapter, EnergyConfig::default().with_devices(true));
//! let mut sensors = monitor.sensors().await?;
//!
//! for sensor in &mut sensors {
//!     monitor.update_sensor(sensor).await;
//!     println!("{}", sensor.projection());
//! }
//! # Ok(())
//! # }
//! ```

mod sensor;

pub use sensor::{EnergySensor, Flow, SensorKind, TrendPeriod};

use std::collections::BTreeMap;
use std::future::Future;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::scheduler::{DataClass, PollIntervals, PollOutcome, Throttle};

/// Realtime power of one detected appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceUsage {
    /// Appliance id.
    pub id: String,
    /// Appliance name.
    pub name: String,
    /// Power draw in Watts.
    #[serde(rename = "w")]
    pub watts: f64,
    /// Current in Amperes.
    #[serde(rename = "c", default)]
    pub current: f64,
}

/// Realtime reading of the whole home.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeUsage {
    /// Consumed power in Watts.
    pub active_power: f64,
    /// Produced power in Watts.
    pub active_solar_power: f64,
    /// Appliances currently drawing power.
    #[serde(default)]
    pub devices: Vec<DeviceUsage>,
}

/// Accumulated energy in kWh per period and flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendReport {
    values: BTreeMap<(TrendPeriod, Flow), f64>,
}

impl TrendReport {
    /// Records a value.
    pub fn insert(&mut self, period: TrendPeriod, flow: Flow, kwh: f64) {
        self.values.insert((period, flow), kwh);
    }

    /// Returns a value.
    #[must_use]
    pub fn get(&self, period: TrendPeriod, flow: Flow) -> Option<f64> {
        self.values.get(&(period, flow)).copied()
    }
}

/// An appliance known to the energy service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Appliance id.
    pub id: String,
    /// Appliance name.
    pub name: String,
}

/// Contract of an energy monitoring service client.
pub trait EnergyAdapter: Send + Sync {
    /// Fetches the current power readings.
    fn fetch_realtime(&self) -> impl Future<Output = Result<RealtimeUsage, AdapterError>> + Send;

    /// Fetches accumulated totals for every period.
    fn fetch_trends(&self) -> impl Future<Output = Result<TrendReport, AdapterError>> + Send;

    /// Lists the appliances the service has detected.
    fn discovered_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<DiscoveredDevice>, AdapterError>> + Send;
}

/// Configuration for an [`EnergyMonitor`].
#[derive(Debug, Clone)]
pub struct EnergyConfig {
    /// Create one sensor per detected appliance.
    pub include_devices: bool,
    /// Prefix of sensor unique ids.
    pub id_prefix: String,
    /// Realtime (fast) and trend (slow) intervals.
    pub poll_intervals: PollIntervals,
}

impl EnergyConfig {
    /// Default unique id prefix.
    pub const DEFAULT_ID_PREFIX: &'static str = "energy";

    /// Enables or disables per-appliance sensors.
    #[must_use]
    pub fn with_devices(mut self, include: bool) -> Self {
        self.include_devices = include;
        self
    }

    /// Sets the unique id prefix.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Sets the polling intervals.
    #[must_use]
    pub fn with_poll_intervals(mut self, intervals: PollIntervals) -> Self {
        self.poll_intervals = intervals;
        self
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            include_devices: false,
            id_prefix: Self::DEFAULT_ID_PREFIX.to_string(),
            poll_intervals: PollIntervals::default(),
        }
    }
}

/// Shared data source of the energy sensors.
pub struct EnergyMonitor<A> {
    adapter: A,
    config: EnergyConfig,
    realtime: Mutex<Option<RealtimeUsage>>,
    trends: Mutex<Option<TrendReport>>,
    realtime_throttle: Throttle,
    trend_throttle: Throttle,
}

impl<A: EnergyAdapter> EnergyMonitor<A> {
    /// Creates a monitor; nothing is fetched until the first update.
    #[must_use]
    pub fn new(adapter: A, config: EnergyConfig) -> Self {
        let realtime_throttle = config.poll_intervals.throttle(DataClass::Fast);
        let trend_throttle = config.poll_intervals.throttle(DataClass::Slow);
        Self {
            adapter,
            config,
            realtime: Mutex::new(None),
            trends: Mutex::new(None),
            realtime_throttle,
            trend_throttle,
        }
    }

    /// The service client.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Last realtime reading.
    #[must_use]
    pub fn realtime(&self) -> Option<RealtimeUsage> {
        self.realtime.lock().clone()
    }

    /// Last trend report.
    #[must_use]
    pub fn trends(&self) -> Option<TrendReport> {
        self.trends.lock().clone()
    }

    /// Builds the sensor set.
    ///
    /// # Errors
    ///
    /// Returns an error if per-appliance sensors are enabled and the
    /// appliance list cannot be fetched.
    pub async fn sensors(&self) -> crate::Result<Vec<EnergySensor>> {
        let prefix = &self.config.id_prefix;
        let mut sensors = Vec::new();

        for flow in Flow::ALL {
            sensors.push(EnergySensor::new(prefix, SensorKind::Active(flow)));
        }
        for period in TrendPeriod::ALL {
            for flow in Flow::ALL {
                sensors.push(EnergySensor::new(prefix, SensorKind::Trend(period, flow)));
            }
        }

        if self.config.include_devices {
            for device in self.adapter.discovered_devices().await? {
                sensors.push(EnergySensor::device(prefix, device.id, device.name));
            }
        }

        Ok(sensors)
    }

    /// Fetches realtime data unless throttled.
    pub async fn update_realtime(&self) -> PollOutcome<Result<(), AdapterError>> {
        if !self.realtime_throttle.try_acquire() {
            return PollOutcome::Throttled;
        }
        let result = self.adapter.fetch_realtime().await.map(|usage| {
            *self.realtime.lock() = Some(usage);
        });
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to retrieve realtime energy data");
        }
        PollOutcome::Ran(result)
    }

    /// Fetches trend data unless throttled.
    pub async fn update_trends(&self) -> PollOutcome<Result<(), AdapterError>> {
        if !self.trend_throttle.try_acquire() {
            return PollOutcome::Throttled;
        }
        let result = self.adapter.fetch_trends().await.map(|report| {
            *self.trends.lock() = Some(report);
        });
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to retrieve energy trend data");
        }
        PollOutcome::Ran(result)
    }

    /// Refreshes the data a sensor depends on and recomputes its state.
    ///
    /// A throttled fetch recomputes from cached data. A failed fetch leaves
    /// the sensor untouched.
    pub async fn update_sensor(&self, sensor: &mut EnergySensor) {
        if sensor.kind().is_realtime() {
            if let PollOutcome::Ran(Err(_)) = self.update_realtime().await {
                return;
            }
            if let Some(usage) = self.realtime.lock().as_ref() {
                sensor.update_realtime(usage);
            }
        } else {
            if let PollOutcome::Ran(Err(_)) = self.update_trends().await {
                return;
            }
            if let Some(report) = self.trends.lock().as_ref() {
                sensor.update_trends(report);
            }
        }
    }
}

impl<A> std::fmt::Debug for EnergyMonitor<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnergyMonitor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_usage_from_service_json() {
        let json = r#"{
            "active_power": 812.4,
            "active_solar_power": 0.0,
            "devices": [{"id": "abc", "name": "Dryer", "w": 512.2, "c": 2.1}]
        }"#;
        let usage: RealtimeUsage = serde_json::from_str(json).unwrap();
        assert_eq!(usage.devices.len(), 1);
        assert_eq!(usage.devices[0].watts, 512.2);
    }

    #[test]
    fn trend_report_lookup() {
        let mut report = TrendReport::default();
        report.insert(TrendPeriod::Week, Flow::Production, 40.0);
        assert_eq!(report.get(TrendPeriod::Week, Flow::Production), Some(40.0));
        assert_eq!(report.get(TrendPeriod::Week, Flow::Consumption), None);
    }

    #[test]
    fn config_defaults() {
        let config = EnergyConfig::default();
        assert!(!config.include_devices);
        assert_eq!(config.id_prefix, "energy");
    }
}
