//! Sensor platform port — thermostat reads and set-point writes.

use std::future::Future;

use thermobridge_domain::error::BridgeError;
use thermobridge_domain::telemetry::ThermostatReading;
use thermobridge_domain::time::Timestamp;
use thermobridge_domain::zone::SensorIdentity;

/// Entry point into the home-automation sensor collaborator.
///
/// One authenticated [`SensorSession`] is created per zone; the session is
/// exclusively owned by that zone and cleared on reset.
pub trait SensorPlatform: Send + Sync {
    /// The per-zone session type produced by authentication.
    type Session: SensorSession + Send + Sync + 'static;

    /// Authenticate the zone's account and bind the session to its
    /// thermostat identity.
    fn authenticate(
        &self,
        identity: &SensorIdentity,
    ) -> impl Future<Output = Result<Self::Session, BridgeError>> + Send;
}

/// An authenticated, zone-bound sensor session.
pub trait SensorSession: Send + Sync {
    /// Fetch the current measurement from the zone's thermostat.
    fn read_thermostat(
        &self,
    ) -> impl Future<Output = Result<ThermostatReading, BridgeError>> + Send;

    /// Push a manual-mode target temperature to the thermostat.
    fn set_target(
        &self,
        request: SetPointRequest,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// A manual-mode set-point write.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPointRequest {
    /// Station identifier on the sensor platform.
    pub device_id: String,
    /// Thermostat module identifier.
    pub module_id: String,
    /// Requested target temperature, °C.
    pub target_temp: f64,
    /// When manual mode expires and the schedule resumes.
    pub valid_until: Timestamp,
}
