// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy sensor entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::projection::SensorProjection;
use crate::state::{Telemetry, TelemetryValue};

use super::{RealtimeUsage, TrendReport};

const ICON: &str = "mdi:flash";
const UNIT_POWER: &str = "W";
const UNIT_ENERGY: &str = "kWh";

/// Direction of an energy flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Flow {
    /// Energy drawn by the home.
    Consumption,
    /// Energy produced, typically by solar panels.
    Production,
}

impl Flow {
    /// Both flows, production first.
    pub const ALL: [Self; 2] = [Self::Production, Self::Consumption];

    /// Suffix used in sensor names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Consumption => "Usage",
            Self::Production => "Production",
        }
    }
}

/// Aggregation window of a trend value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrendPeriod {
    /// Since midnight.
    Day,
    /// Current week.
    Week,
    /// Current month.
    Month,
    /// Current year.
    Year,
}

impl TrendPeriod {
    /// Every period, shortest first.
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Prefix used in sensor names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
            Self::Year => "Yearly",
        }
    }
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        };
        f.write_str(s)
    }
}

/// What an energy sensor measures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Instantaneous whole-home power.
    Active(Flow),
    /// Accumulated energy over a period.
    Trend(TrendPeriod, Flow),
    /// Instantaneous power of one detected appliance.
    Device {
        /// Appliance id reported by the service.
        id: String,
    },
}

impl SensorKind {
    /// Whether the value comes from realtime data (as opposed to trends).
    #[must_use]
    pub fn is_realtime(&self) -> bool {
        !matches!(self, Self::Trend(..))
    }
}

/// One energy sensor and its last computed value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergySensor {
    kind: SensorKind,
    name: String,
    unique_id: String,
    state: Option<f64>,
    current: Option<f64>,
}

impl EnergySensor {
    /// Creates a whole-home sensor named after its kind, e.g. "Energy Usage"
    /// or "Daily Production".
    ///
    /// # Examples
    ///
    /// ```
    /// use hubsync::energy::{EnergySensor, Flow, SensorKind, TrendPeriod};
    ///
    /// let kind = SensorKind::Trend(TrendPeriod::Day, Flow::Production);
    /// let sensor = EnergySensor::new("home", kind);
    /// assert_eq!(sensor.name(), "Daily Production");
    /// assert_eq!(sensor.unique_id(), "home_daily_production");
    /// ```
    #[must_use]
    pub fn new(id_prefix: &str, kind: SensorKind) -> Self {
        let name = match &kind {
            SensorKind::Active(flow) => format!("Energy {}", flow.label()),
            SensorKind::Trend(period, flow) => format!("{} {}", period.label(), flow.label()),
            SensorKind::Device { id } => id.clone(),
        };
        let unique_id = match &kind {
            SensorKind::Device { id } => slugify(&format!("{id_prefix} {id}")),
            _ => slugify(&format!("{id_prefix} {name}")),
        };

        Self {
            kind,
            name,
            unique_id,
            state: None,
            current: None,
        }
    }

    /// Creates a sensor for a detected appliance.
    #[must_use]
    pub fn device(id_prefix: &str, id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut sensor = Self::new(id_prefix, SensorKind::Device { id: id.into() });
        sensor.name = name.into();
        sensor
    }

    /// What the sensor measures.
    #[must_use]
    pub fn kind(&self) -> &SensorKind {
        &self.kind
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable unique id.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Last computed value.
    #[must_use]
    pub fn state(&self) -> Option<f64> {
        self.state
    }

    /// Watts for realtime sensors, kWh for trends.
    #[must_use]
    pub fn unit_of_measurement(&self) -> &'static str {
        if self.kind.is_realtime() {
            UNIT_POWER
        } else {
            UNIT_ENERGY
        }
    }

    /// Realtime values are recorded on every update.
    #[must_use]
    pub fn force_update(&self) -> bool {
        self.kind.is_realtime()
    }

    /// Recomputes the state of a realtime sensor.
    ///
    /// An appliance missing from the realtime list reads 0 W and 0 A.
    pub fn update_realtime(&mut self, usage: &RealtimeUsage) {
        match &self.kind {
            SensorKind::Active(Flow::Consumption) => self.state = Some(usage.active_power.round()),
            SensorKind::Active(Flow::Production) => {
                self.state = Some(usage.active_solar_power.round());
            }
            SensorKind::Device { id } => {
                let device = usage.devices.iter().find(|d| &d.id == id);
                self.state = Some(device.map_or(0.0, |d| d.watts.round()));
                self.current = Some(device.map_or(0.0, |d| d.current.round()));
            }
            SensorKind::Trend(..) => {}
        }
    }

    /// Recomputes the state of a trend sensor, to one decimal.
    pub fn update_trends(&mut self, report: &TrendReport) {
        if let SensorKind::Trend(period, flow) = self.kind
            && let Some(value) = report.get(period, flow)
        {
            self.state = Some((value * 10.0).round() / 10.0);
        }
    }

    /// Host-facing view of the sensor.
    #[must_use]
    pub fn projection(&self) -> SensorProjection {
        let mut attributes = Telemetry::new();
        // Zero current is reported as no attribute at all.
        if let Some(current) = self.current.filter(|c| c.abs() > f64::EPSILON) {
            attributes.insert("current".to_string(), TelemetryValue::Number(current));
        }

        SensorProjection {
            name: self.name.clone(),
            unique_id: self.unique_id.clone(),
            state: self.state,
            unit_of_measurement: self.unit_of_measurement(),
            icon: ICON,
            force_update: self.force_update(),
            attributes,
        }
    }
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::DeviceUsage;

    fn usage() -> RealtimeUsage {
        RealtimeUsage {
            active_power: 512.6,
            active_solar_power: 1203.4,
            devices: vec![DeviceUsage {
                id: "abc123".to_string(),
                name: "Dryer".to_string(),
                watts: 2400.5,
                current: 10.4,
            }],
        }
    }

    #[test]
    fn names_and_ids() {
        let active = EnergySensor::new("sense", SensorKind::Active(Flow::Consumption));
        assert_eq!(active.name(), "Energy Usage");
        assert_eq!(active.unique_id(), "sense_energy_usage");

        let weekly_kind = SensorKind::Trend(TrendPeriod::Week, Flow::Consumption);
        let weekly = EnergySensor::new("sense", weekly_kind);
        assert_eq!(weekly.name(), "Weekly Usage");

        let dryer = EnergySensor::device("sense", "abc123", "Dryer");
        assert_eq!(dryer.name(), "Dryer");
        assert_eq!(dryer.unique_id(), "sense_abc123");
    }

    #[test]
    fn units_follow_kind() {
        let active = EnergySensor::new("x", SensorKind::Active(Flow::Production));
        assert_eq!(active.unit_of_measurement(), "W");
        assert!(active.force_update());

        let trend = EnergySensor::new("x", SensorKind::Trend(TrendPeriod::Year, Flow::Production));
        assert_eq!(trend.unit_of_measurement(), "kWh");
        assert!(!trend.force_update());

        let device = EnergySensor::device("x", "id", "Fridge");
        assert_eq!(device.unit_of_measurement(), "W");
        assert!(device.force_update());
    }

    #[test]
    fn active_rounds_to_watts() {
        let mut usage_sensor = EnergySensor::new("x", SensorKind::Active(Flow::Consumption));
        let mut solar = EnergySensor::new("x", SensorKind::Active(Flow::Production));
        usage_sensor.update_realtime(&usage());
        solar.update_realtime(&usage());

        assert_eq!(usage_sensor.state(), Some(513.0));
        assert_eq!(solar.state(), Some(1203.0));
    }

    #[test]
    fn device_reads_its_entry_or_zero() {
        let mut dryer = EnergySensor::device("x", "abc123", "Dryer");
        dryer.update_realtime(&usage());
        assert_eq!(dryer.state(), Some(2401.0));
        assert_eq!(
            dryer.projection().attributes.get("current"),
            Some(&TelemetryValue::Number(10.0))
        );

        let mut missing = EnergySensor::device("x", "gone", "Kettle");
        missing.update_realtime(&usage());
        assert_eq!(missing.state(), Some(0.0));
        assert!(missing.projection().attributes.is_empty());
    }

    #[test]
    fn trend_rounds_to_one_decimal() {
        let mut report = TrendReport::default();
        report.insert(TrendPeriod::Day, Flow::Consumption, 12.345);

        let mut daily =
            EnergySensor::new("x", SensorKind::Trend(TrendPeriod::Day, Flow::Consumption));
        daily.update_trends(&report);
        assert_eq!(daily.state(), Some(12.3));

        let mut monthly =
            EnergySensor::new("x", SensorKind::Trend(TrendPeriod::Month, Flow::Consumption));
        monthly.update_trends(&report);
        assert_eq!(monthly.state(), None);
    }

    #[test]
    fn projection_carries_icon() {
        let sensor = EnergySensor::new("x", SensorKind::Active(Flow::Consumption));
        let view = sensor.projection();
        assert_eq!(view.icon, "mdi:flash");
        assert_eq!(view.state, None);
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Sense  Daily Usage"), "sense_daily_usage");
        assert_eq!(slugify("a-b--c "), "a_b_c");
    }
}
