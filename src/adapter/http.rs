// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP adapter for devices exposing a JSON command endpoint.
//!
//! Commands are sent as `GET {base}/cm?cmnd=<command>` and answered with a
//! JSON object. Status queries used:
//!
//! - `Status 0`: identity, network, firmware and current light state
//! - `Status 11`: current power/light state (`StatusSTS`)
//! - `Status 8`: energy readings (`StatusSNS.ENERGY`)

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::DeviceAdapter;
use crate::capabilities::{DeviceCapabilities, DeviceIdentity};
use crate::error::AdapterError;
use crate::state::{DeviceReading, Telemetry, TelemetryValue};
use crate::types::{BrightnessPercent, HueSaturation, Kelvin, KelvinRange, Mired};

/// Color temperature range of the command protocol, in mireds.
const MIRED_RANGE: (u16, u16) = (153, 500);

/// Telemetry key for instantaneous power draw in Watts.
pub const ATTR_CURRENT_POWER_W: &str = "current_power_w";
/// Telemetry key for today's consumption in kWh.
pub const ATTR_TODAY_ENERGY_KWH: &str = "today_energy_kwh";
/// Telemetry key for total consumption in kWh.
pub const ATTR_TOTAL_ENERGY_KWH: &str = "total_energy_kwh";
/// Telemetry key for line voltage.
pub const ATTR_VOLTAGE: &str = "voltage";
/// Telemetry key for current draw in Amperes.
pub const ATTR_CURRENT_A: &str = "current_a";

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for an HTTP device.
///
/// # Examples
///
/// ```
/// use hubsync::adapter::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.100")
///     .with_port(8080)
///     .with_credentials("admin", "password")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "http://192.168.1.100:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    ///
    /// A `host:port` value is split so that test servers and devices on
    /// non-standard ports can be passed as-is. An `https://` scheme enables
    /// HTTPS.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        let (host, use_https) = if let Some(rest) = host.strip_prefix("https://") {
            (rest.to_string(), true)
        } else if let Some(rest) = host.strip_prefix("http://") {
            (rest.to_string(), false)
        } else {
            (host, false)
        };
        let host = host.trim_end_matches('/').to_string();
        let default_port = if use_https {
            Self::DEFAULT_HTTPS_PORT
        } else {
            Self::DEFAULT_PORT
        };

        let split = host
            .rsplit_once(':')
            .and_then(|(h, p)| p.parse::<u16>().ok().map(|port| (h.to_string(), port)));
        let (host, port) = match split {
            Some(pair) => pair,
            None => (host, default_port),
        };

        Self {
            host,
            port,
            use_https,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If the port is still the HTTP default it becomes 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct StatusReply {
    #[serde(rename = "Status")]
    status: Option<DeviceStatus>,
    #[serde(rename = "StatusFWR")]
    firmware: Option<FirmwareStatus>,
    #[serde(rename = "StatusNET")]
    network: Option<NetworkStatus>,
    #[serde(rename = "StatusSTS")]
    state: Option<LightStatus>,
    #[serde(rename = "StatusSNS")]
    sensors: Option<SensorStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceStatus {
    #[serde(rename = "DeviceName")]
    device_name: Option<String>,
    #[serde(rename = "FriendlyName", default)]
    friendly_name: Vec<String>,
    #[serde(rename = "Topic")]
    topic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FirmwareStatus {
    #[serde(rename = "Version")]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NetworkStatus {
    #[serde(rename = "Mac")]
    mac: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LightStatus {
    #[serde(rename = "POWER")]
    power: Option<String>,
    #[serde(rename = "POWER1")]
    power1: Option<String>,
    #[serde(rename = "Dimmer")]
    dimmer: Option<u8>,
    #[serde(rename = "CT")]
    ct: Option<u16>,
    #[serde(rename = "HSBColor")]
    hsb_color: Option<String>,
}

impl LightStatus {
    fn is_on(&self) -> Result<bool, AdapterError> {
        let raw = self
            .power
            .as_deref()
            .or(self.power1.as_deref())
            .ok_or_else(|| AdapterError::protocol("missing POWER in state reply"))?;
        match raw.to_ascii_uppercase().as_str() {
            "ON" | "1" => Ok(true),
            "OFF" | "0" => Ok(false),
            other => Err(AdapterError::protocol(format!("invalid POWER value: {other}"))),
        }
    }

    fn hue_saturation(&self) -> Result<Option<HueSaturation>, AdapterError> {
        let Some(raw) = self.hsb_color.as_deref() else {
            return Ok(None);
        };
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [hue, sat, _] = parts.as_slice() else {
            return Err(AdapterError::protocol(format!("invalid HSBColor: {raw}")));
        };
        let hue = hue
            .parse()
            .map_err(|_| AdapterError::protocol(format!("invalid hue: {hue}")))?;
        let sat = sat
            .parse()
            .map_err(|_| AdapterError::protocol(format!("invalid saturation: {sat}")))?;
        HueSaturation::new(hue, sat)
            .map(Some)
            .map_err(|e| AdapterError::protocol(e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SensorStatus {
    #[serde(rename = "ENERGY")]
    energy: Option<EnergyStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct EnergyStatus {
    #[serde(rename = "Total")]
    total: Option<f64>,
    #[serde(rename = "Today")]
    today: Option<f64>,
    #[serde(rename = "Power")]
    power: Option<f64>,
    #[serde(rename = "Voltage")]
    voltage: Option<f64>,
    #[serde(rename = "Current")]
    current: Option<f64>,
}

impl EnergyStatus {
    fn to_telemetry(&self) -> Telemetry {
        let mut telemetry = Telemetry::new();
        let mut put = |key: &str, value: Option<f64>, precision: usize| {
            if let Some(v) = value {
                telemetry.insert(key.to_string(), TelemetryValue::Text(format!("{v:.precision$}")));
            }
        };
        put(ATTR_CURRENT_POWER_W, self.power, 2);
        put(ATTR_TOTAL_ENERGY_KWH, self.total, 3);
        put(ATTR_VOLTAGE, self.voltage, 1);
        put(ATTR_CURRENT_A, self.current, 2);
        put(ATTR_TODAY_ENERGY_KWH, self.today, 3);
        telemetry
    }
}

// ============================================================================
// HttpAdapter
// ============================================================================

/// Adapter for a device reachable over the HTTP command endpoint.
///
/// # Examples
///
/// ```no_run
/// use hubsync::adapter::{DeviceAdapter, HttpAdapter, HttpConfig};
///
/// # async fn example() -> hubsync::Result<()> {
/// let adapter = HttpAdapter::new(HttpConfig::new("192.168.1.100"))?;
/// let caps = adapter.fetch_capabilities().await?;
/// let reading = adapter.fetch_state(&caps).await?;
/// println!("{} is on: {}", caps.identity.name, reading.is_on);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    host: String,
    base_url: String,
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpAdapter {
    /// Creates an adapter from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the HTTP client cannot be created.
    pub fn new(config: HttpConfig) -> Result<Self, AdapterError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            host: config.host.clone(),
            base_url: config.base_url(),
            client,
            credentials: config.credentials,
        })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, command: &str) -> String {
        let encoded_command = urlencoding::encode(command);

        match &self.credentials {
            Some((username, password)) => format!(
                "{}/cm?user={}&password={}&cmnd={}",
                self.base_url,
                urlencoding::encode(username),
                urlencoding::encode(password),
                encoded_command
            ),
            None => format!("{}/cm?cmnd={}", self.base_url, encoded_command),
        }
    }

    /// Sends a raw command and returns the decoded JSON reply.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the device cannot be reached and a protocol
    /// error when it answers with an error status, an error reply or
    /// malformed JSON.
    pub async fn send_raw(&self, command: &str) -> Result<Value, AdapterError> {
        let url = self.build_url(command);

        tracing::debug!(host = %self.host, command = %command, "Sending HTTP command");

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdapterError::protocol("authentication failed"));
        }

        if !response.status().is_success() {
            return Err(AdapterError::protocol(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await?;

        tracing::debug!(host = %self.host, body = %body, "Received HTTP response");

        let value: Value = serde_json::from_str(&body)?;
        check_command_reply(&value)?;
        Ok(value)
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        command: &str,
    ) -> Result<T, AdapterError> {
        let value = self.send_raw(command).await?;
        serde_json::from_value(value).map_err(AdapterError::from)
    }

    async fn command(&self, command: String) -> Result<(), AdapterError> {
        self.send_raw(&command).await.map(drop)
    }
}

/// Rejects replies such as `{"Command":"Unknown"}` or `{"Command":"Error"}`.
fn check_command_reply(value: &Value) -> Result<(), AdapterError> {
    if let Some(reply) = value.get("Command").and_then(Value::as_str) {
        return Err(AdapterError::protocol(format!("device rejected command: {reply}")));
    }
    if !value.is_object() {
        return Err(AdapterError::protocol("expected a JSON object"));
    }
    Ok(())
}

fn protocol_kelvin_range() -> Option<KelvinRange> {
    let (cool, warm) = MIRED_RANGE;
    let cool = Mired::new(cool).ok()?.to_kelvin();
    let warm = Mired::new(warm).ok()?.to_kelvin();
    Some(KelvinRange::new(warm, cool))
}

fn capabilities_from_status(host: &str, reply: &StatusReply) -> DeviceCapabilities {
    let status = reply.status.as_ref();
    let mac = reply.network.as_ref().and_then(|n| n.mac.clone());
    let topic = status.and_then(|s| s.topic.clone());
    let device_name = status.and_then(|s| s.device_name.clone());
    let name = status
        .and_then(|s| s.friendly_name.first().cloned())
        .or_else(|| device_name.clone())
        .unwrap_or_else(|| host.to_string());

    let mut identity = DeviceIdentity::new(
        mac.or(topic).unwrap_or_else(|| host.to_string()),
        name,
        device_name.unwrap_or_else(|| "Generic".to_string()),
    );
    if let Some(version) = reply.firmware.as_ref().and_then(|f| f.version.clone()) {
        identity = identity.with_firmware(version);
    }

    let state = reply.state.as_ref();
    let color_temperature = state.is_some_and(|s| s.ct.is_some());

    DeviceCapabilities {
        identity,
        dimming: state.is_some_and(|s| s.dimmer.is_some()),
        color_temperature,
        full_color: state.is_some_and(|s| s.hsb_color.is_some()),
        metering: reply.sensors.as_ref().is_some_and(|s| s.energy.is_some()),
        kelvin_range: if color_temperature {
            protocol_kelvin_range()
        } else {
            None
        },
    }
}

fn reading_from_status(status: &LightStatus) -> Result<DeviceReading, AdapterError> {
    let brightness = status.dimmer.map(BrightnessPercent::clamped);
    let color_temp = match status.ct {
        Some(0) | None => None,
        Some(ct) => Mired::new(ct).ok().map(Mired::to_kelvin),
    };

    Ok(DeviceReading {
        is_on: status.is_on()?,
        brightness,
        color_temp,
        hue_saturation: status.hue_saturation()?,
        telemetry: Telemetry::new(),
    })
}

impl DeviceAdapter for HttpAdapter {
    fn host(&self) -> &str {
        &self.host
    }

    async fn fetch_capabilities(&self) -> Result<DeviceCapabilities, AdapterError> {
        let reply: StatusReply = self.query("Status 0").await?;
        if reply.status.is_none() {
            return Err(AdapterError::protocol("missing Status block in reply"));
        }
        Ok(capabilities_from_status(&self.host, &reply))
    }

    async fn fetch_state(
        &self,
        capabilities: &DeviceCapabilities,
    ) -> Result<DeviceReading, AdapterError> {
        let reply: StatusReply = self.query("Status 11").await?;
        let status = reply
            .state
            .ok_or_else(|| AdapterError::protocol("missing StatusSTS block in reply"))?;
        let mut reading = reading_from_status(&status)?;

        if capabilities.metering {
            let reply: StatusReply = self.query("Status 8").await?;
            if let Some(energy) = reply.sensors.and_then(|s| s.energy) {
                reading.telemetry = energy.to_telemetry();
            }
        }

        Ok(reading)
    }

    async fn send_power_on(&self) -> Result<(), AdapterError> {
        self.command("Power ON".to_string()).await
    }

    async fn send_power_off(&self) -> Result<(), AdapterError> {
        self.command("Power OFF".to_string()).await
    }

    async fn send_color_temperature(&self, kelvin: Kelvin) -> Result<(), AdapterError> {
        let (min, max) = MIRED_RANGE;
        let ct = kelvin.to_mired().value().clamp(min, max);
        self.command(format!("CT {ct}")).await
    }

    async fn send_hue_saturation_brightness(
        &self,
        color: HueSaturation,
        brightness: BrightnessPercent,
    ) -> Result<(), AdapterError> {
        self.command(format!(
            "HSBColor {},{},{}",
            color.hue(),
            color.saturation(),
            brightness.value()
        ))
        .await
    }

    async fn send_brightness(&self, brightness: BrightnessPercent) -> Result<(), AdapterError> {
        self.command(format!("Dimmer {}", brightness.value())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = HttpConfig::new("192.168.1.100");
        assert_eq!(config.host(), "192.168.1.100");
        assert_eq!(config.port(), 80);
        assert_eq!(config.timeout(), HttpConfig::DEFAULT_TIMEOUT);
        assert_eq!(config.base_url(), "http://192.168.1.100");
    }

    #[test]
    fn config_splits_host_and_port() {
        let config = HttpConfig::new("http://127.0.0.1:8123");
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 8123);
        assert_eq!(config.base_url(), "http://127.0.0.1:8123");
    }

    #[test]
    fn config_https_switches_default_port() {
        let config = HttpConfig::new("bulb.local").with_https();
        assert_eq!(config.port(), 443);
        assert_eq!(config.base_url(), "https://bulb.local");
    }

    #[test]
    fn config_accepts_https_scheme() {
        let config = HttpConfig::new("https://bulb.local");
        assert_eq!(config.host(), "bulb.local");
        assert_eq!(config.port(), 443);
        assert_eq!(config.base_url(), "https://bulb.local");

        let config = HttpConfig::new("https://bulb.local:8443/");
        assert_eq!(config.port(), 8443);
        assert_eq!(config.base_url(), "https://bulb.local:8443");
    }

    #[test]
    fn build_url_encodes_command_and_credentials() {
        let adapter = HttpAdapter::new(
            HttpConfig::new("10.0.0.2").with_credentials("admin", "p&ss"),
        )
        .unwrap();
        assert_eq!(
            adapter.build_url("Power ON"),
            "http://10.0.0.2/cm?user=admin&password=p%26ss&cmnd=Power%20ON"
        );
    }

    #[test]
    fn rejects_unknown_command_reply() {
        let value = serde_json::json!({"Command": "Unknown"});
        let err = check_command_reply(&value).unwrap_err();
        assert_eq!(err.kind(), crate::error::AdapterErrorKind::Protocol);
    }

    #[test]
    fn capabilities_from_full_status() {
        let json = r#"{
            "Status": {"DeviceName": "RGBCCT Bulb", "FriendlyName": ["Desk"], "Topic": "desk"},
            "StatusFWR": {"Version": "13.1.0"},
            "StatusNET": {"Mac": "AA:BB:CC:DD:EE:FF"},
            "StatusSTS": {"POWER": "ON", "Dimmer": 100, "CT": 300, "HSBColor": "20,75,100"},
            "StatusSNS": {"ENERGY": {"Power": 5}}
        }"#;
        let reply: StatusReply = serde_json::from_str(json).unwrap();
        let caps = capabilities_from_status("10.0.0.2", &reply);

        assert_eq!(caps.identity.unique_id, "AA:BB:CC:DD:EE:FF");
        assert_eq!(caps.identity.name, "Desk");
        assert_eq!(caps.identity.model, "RGBCCT Bulb");
        assert_eq!(caps.identity.firmware.as_deref(), Some("13.1.0"));
        assert!(caps.dimming && caps.color_temperature && caps.full_color && caps.metering);

        let range = caps.kelvin_range.unwrap();
        assert_eq!(range.min().value(), 2000);
        assert_eq!(range.max().value(), 6535);
    }

    #[test]
    fn capabilities_of_plain_switch() {
        let json = r#"{"Status": {"DeviceName": "Switch"}, "StatusSTS": {"POWER": "OFF"}}"#;
        let reply: StatusReply = serde_json::from_str(json).unwrap();
        let caps = capabilities_from_status("10.0.0.3", &reply);

        assert_eq!(caps.identity.unique_id, "10.0.0.3");
        assert!(!caps.is_light());
        assert!(!caps.metering);
        assert!(caps.kelvin_range.is_none());
    }

    #[test]
    fn reading_from_light_status() {
        let status: LightStatus = serde_json::from_str(
            r#"{"POWER": "ON", "Dimmer": 19, "CT": 312, "HSBColor": "110,21,19"}"#,
        )
        .unwrap();
        let reading = reading_from_status(&status).unwrap();

        assert!(reading.is_on);
        assert_eq!(reading.brightness.map(|b| b.value()), Some(19));
        assert_eq!(reading.color_temp.map(|k| k.value()), Some(3205));
        assert_eq!(reading.hue_saturation, HueSaturation::new(110, 21).ok());
    }

    #[test]
    fn zero_color_temperature_is_absent() {
        let status: LightStatus = serde_json::from_str(r#"{"POWER1": "OFF", "CT": 0}"#).unwrap();
        let reading = reading_from_status(&status).unwrap();
        assert!(!reading.is_on);
        assert!(reading.color_temp.is_none());
    }

    #[test]
    fn invalid_power_is_protocol_error() {
        let status: LightStatus = serde_json::from_str(r#"{"POWER": "MAYBE"}"#).unwrap();
        assert!(reading_from_status(&status).is_err());
    }

    #[test]
    fn energy_telemetry_formatting() {
        let energy: EnergyStatus = serde_json::from_str(
            r#"{"Total": 3.185, "Today": 0.127, "Power": 45, "Voltage": 230, "Current": 0.195}"#,
        )
        .unwrap();
        let telemetry = energy.to_telemetry();

        assert_eq!(telemetry[ATTR_CURRENT_POWER_W], TelemetryValue::from("45.00"));
        assert_eq!(telemetry[ATTR_TOTAL_ENERGY_KWH], TelemetryValue::from("3.185"));
        assert_eq!(telemetry[ATTR_VOLTAGE], TelemetryValue::from("230.0"));
        assert_eq!(telemetry[ATTR_TODAY_ENERGY_KWH], TelemetryValue::from("0.127"));
    }
}
