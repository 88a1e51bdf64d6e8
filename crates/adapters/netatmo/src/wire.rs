//! Netatmo API payload shapes.

use serde::Deserialize;

use thermobridge_domain::telemetry::ThermostatReading;

use crate::error::NetatmoError;

/// `POST /oauth2/token` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// `GET /api/getthermostatsdata` response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ThermostatsResponse {
    pub body: ThermostatsBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThermostatsBody {
    #[serde(default)]
    pub devices: Vec<Station>,
}

/// One relay station with its attached thermostat modules.
#[derive(Debug, Deserialize)]
pub(crate) struct Station {
    #[serde(rename = "_id")]
    pub id: String,
    pub station_name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Module {
    #[serde(rename = "_id")]
    pub id: String,
    pub measured: Measured,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Measured {
    pub temperature: f64,
    pub setpoint_temp: f64,
}

impl ThermostatsResponse {
    /// Extract the reading for the given thermostat module from the first
    /// station in the response.
    pub(crate) fn into_reading(self, module_id: &str) -> Result<ThermostatReading, NetatmoError> {
        let station = self
            .body
            .devices
            .into_iter()
            .next()
            .ok_or_else(|| NetatmoError::Payload("no devices in response".to_string()))?;
        let Station {
            id,
            station_name,
            modules,
        } = station;
        let module = modules
            .into_iter()
            .find(|module| module.id == module_id)
            .ok_or_else(|| NetatmoError::ModuleNotFound {
                device_id: id.clone(),
                module_id: module_id.to_string(),
            })?;
        Ok(ThermostatReading {
            device_id: id,
            module_mac: module.id,
            station_name,
            setpoint_temp: module.measured.setpoint_temp,
            temperature: module.measured.temperature,
        })
    }
}
