//! Setup store port — the external configuration endpoint that owns the
//! zone roster and persists accepted target temperatures.

use std::future::Future;

use serde::Deserialize;

use thermobridge_domain::error::BridgeError;
use thermobridge_domain::zone::{SensorCredentials, SensorIdentity, Zone, ZoneId};

/// One roster entry as served by the setup endpoint.
///
/// Field names follow the upstream record layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneSetup {
    pub demozone: String,
    #[serde(rename = "deviceid")]
    pub device_id: String,
    #[serde(rename = "moduleid")]
    pub module_id: String,
    #[serde(rename = "clientid")]
    pub client_id: String,
    #[serde(rename = "clientsecret")]
    pub client_secret: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "iotappid")]
    pub iot_app_id: String,
    #[serde(rename = "iotdeviceid")]
    pub iot_device_id: String,
    #[serde(rename = "ioturn")]
    pub iot_urn: String,
    #[serde(rename = "iotactioncall")]
    pub iot_action: String,
}

impl ZoneSetup {
    /// The normalized zone identifier for this entry.
    #[must_use]
    pub fn zone_id(&self) -> ZoneId {
        ZoneId::new(&self.demozone)
    }

    /// Build the domain zone record, starting stopped with the given poll
    /// period.
    #[must_use]
    pub fn into_zone(self, poll_period_secs: u32) -> Zone {
        let id = self.zone_id();
        Zone::new(
            id,
            poll_period_secs,
            SensorIdentity {
                device_id: self.device_id,
                module_id: self.module_id,
                credentials: SensorCredentials {
                    client_id: self.client_id,
                    client_secret: self.client_secret,
                    username: self.username,
                    password: self.password,
                },
            },
        )
    }
}

/// External configuration store reached over the setup endpoint.
pub trait SetupStore: Send + Sync {
    /// Fetch the full zone roster. An empty roster is a fatal startup
    /// condition, enforced by the caller.
    fn fetch_zones(&self) -> impl Future<Output = Result<Vec<ZoneSetup>, BridgeError>> + Send;

    /// Persist an accepted target temperature for the zone.
    /// Fire-and-forget from the caller's perspective.
    fn persist_target_temp(
        &self,
        zone: &ZoneId,
        target_temp: f64,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
