//! # thermobridge-adapter-netatmo
//!
//! Sensor-platform adapter backed by the Netatmo thermostat API.
//!
//! Authentication uses the OAuth2 password grant with each zone's own
//! client credentials; one access token and session is held per zone.
//! Readings come from `GET /api/getthermostatsdata`; manual-mode target
//! temperatures go through `POST /api/setthermpoint`.

pub mod error;
mod wire;

pub use error::NetatmoError;

use thermobridge_app::ports::{SensorPlatform, SensorSession, SetPointRequest};
use thermobridge_domain::error::BridgeError;
use thermobridge_domain::telemetry::ThermostatReading;
use thermobridge_domain::zone::{SensorCredentials, SensorIdentity};

/// Netatmo adapter configuration.
#[derive(Debug, Clone)]
pub struct NetatmoConfig {
    /// API base URL, overridable for tests and proxies.
    pub base_url: String,
}

impl Default for NetatmoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.netatmo.net".to_string(),
        }
    }
}

/// Entry point that authenticates zone accounts against the Netatmo API.
pub struct NetatmoPlatform {
    client: reqwest::Client,
    base_url: String,
}

impl NetatmoPlatform {
    #[must_use]
    pub fn new(config: NetatmoConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url,
        }
    }

    async fn request_token(&self, credentials: &SensorCredentials) -> Result<String, NetatmoError> {
        let params = [
            ("grant_type", "password"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("scope", "read_thermostat write_thermostat"),
        ];
        let response = self
            .client
            .post(format!("{}/oauth2/token", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(NetatmoError::Transport)?;
        let response = check(response).await?;
        let token: wire::TokenResponse = response.json().await.map_err(NetatmoError::Transport)?;
        Ok(token.access_token)
    }
}

impl SensorPlatform for NetatmoPlatform {
    type Session = NetatmoSession;

    async fn authenticate(&self, identity: &SensorIdentity) -> Result<Self::Session, BridgeError> {
        let access_token = self.request_token(&identity.credentials).await?;
        tracing::info!(device_id = identity.device_id, "netatmo account authenticated");
        Ok(NetatmoSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            access_token,
            device_id: identity.device_id.clone(),
            module_id: identity.module_id.clone(),
        })
    }
}

/// An authenticated session bound to one zone's station and module.
pub struct NetatmoSession {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    device_id: String,
    module_id: String,
}

impl SensorSession for NetatmoSession {
    async fn read_thermostat(&self) -> Result<ThermostatReading, BridgeError> {
        let response = self
            .client
            .get(format!("{}/api/getthermostatsdata", self.base_url))
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("device_id", self.device_id.as_str()),
            ])
            .send()
            .await
            .map_err(NetatmoError::Transport)?;
        let response = check(response).await?;
        let payload: wire::ThermostatsResponse =
            response.json().await.map_err(NetatmoError::Transport)?;
        Ok(payload.into_reading(&self.module_id)?)
    }

    async fn set_target(&self, request: SetPointRequest) -> Result<(), BridgeError> {
        let setpoint_temp = request.target_temp.to_string();
        let setpoint_endtime = request.valid_until.timestamp().to_string();
        let params = [
            ("access_token", self.access_token.as_str()),
            ("device_id", request.device_id.as_str()),
            ("module_id", request.module_id.as_str()),
            ("setpoint_mode", "manual"),
            ("setpoint_temp", setpoint_temp.as_str()),
            ("setpoint_endtime", setpoint_endtime.as_str()),
        ];
        let response = self
            .client
            .post(format!("{}/api/setthermpoint", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(NetatmoError::Transport)?;
        check(response).await?;
        tracing::debug!(
            device_id = request.device_id,
            target_temp = request.target_temp,
            "manual set-point accepted"
        );
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, NetatmoError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(NetatmoError::Api { status, body })
}
