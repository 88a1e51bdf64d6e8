//! Thermostat readings and the telemetry schema pushed to the device
//! platform.

use serde::{Deserialize, Serialize};

/// One raw measurement fetched from the sensor platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThermostatReading {
    /// Station (relay) identifier reported by the sensor platform.
    pub device_id: String,
    /// MAC of the thermostat module the measurement came from.
    pub module_mac: String,
    /// Human-readable station name.
    pub station_name: String,
    /// Currently configured target temperature, °C.
    pub setpoint_temp: f64,
    /// Measured ambient temperature, °C.
    pub temperature: f64,
}

/// Telemetry message in the device-platform attribute schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryUpdate {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "moduleMac")]
    pub module_mac: String,
    #[serde(rename = "moduleName")]
    pub module_name: String,
    #[serde(rename = "setpointTemp")]
    pub setpoint_temp: f64,
    pub temperature: f64,
}

impl TelemetryUpdate {
    /// Map a raw reading into the upstream telemetry schema.
    #[must_use]
    pub fn from_reading(reading: &ThermostatReading) -> Self {
        Self {
            device_id: reading.device_id.clone(),
            module_mac: reading.module_mac.clone(),
            module_name: reading.station_name.clone(),
            setpoint_temp: reading.setpoint_temp,
            temperature: reading.temperature,
        }
    }
}
