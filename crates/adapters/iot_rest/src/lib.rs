//! # thermobridge-adapter-iot-rest
//!
//! Device-platform adapter backed by the cloud IoT management REST API.
//!
//! Each zone provisions its managed device through a `<ZONE>.conf`
//! credential store; a missing store gates the zone out of scheduling.
//! Telemetry is POSTed as data messages with the device's own endpoint
//! credentials, while the administrative set-point relay invokes the
//! zone's device-model action with the operator account. Inbound
//! set-point commands are surfaced through [`commands::CommandFeed`].

pub mod commands;
pub mod credentials;
pub mod error;

pub use credentials::DeviceCredentials;
pub use error::IotError;

use std::collections::HashMap;
use std::path::PathBuf;

use thermobridge_app::ports::{ActivationOutcome, DevicePlatform, DeviceSession, ZoneSetup};
use thermobridge_domain::error::BridgeError;
use thermobridge_domain::telemetry::TelemetryUpdate;
use thermobridge_domain::zone::ZoneId;

/// IoT adapter configuration.
#[derive(Debug, Clone)]
pub struct IotRestConfig {
    /// Platform base URL.
    pub base_url: String,
    /// Operator account for action invocations and command polling.
    pub username: String,
    pub password: String,
    /// Directory holding the per-zone `<ZONE>.conf` credential stores.
    pub credential_dir: PathBuf,
}

/// Action-relay coordinates for one zone, taken from the setup roster.
#[derive(Debug, Clone)]
pub struct IotTarget {
    pub app_id: String,
    pub device_id: String,
    pub urn: String,
    pub action: String,
}

impl IotTarget {
    /// Extract the relay coordinates from a roster entry.
    #[must_use]
    pub fn from_setup(setup: &ZoneSetup) -> Self {
        Self {
            app_id: setup.iot_app_id.clone(),
            device_id: setup.iot_device_id.clone(),
            urn: setup.iot_urn.clone(),
            action: setup.iot_action.clone(),
        }
    }
}

/// Entry point into the cloud device-management platform.
pub struct IotRestPlatform {
    client: reqwest::Client,
    config: IotRestConfig,
    targets: HashMap<ZoneId, IotTarget>,
}

impl IotRestPlatform {
    /// Build the platform from the roster's relay coordinates.
    #[must_use]
    pub fn from_roster(config: IotRestConfig, setups: &[ZoneSetup]) -> Self {
        let targets = setups
            .iter()
            .map(|setup| (setup.zone_id(), IotTarget::from_setup(setup)))
            .collect();
        Self {
            client: reqwest::Client::new(),
            config,
            targets,
        }
    }

    fn target(&self, zone: &ZoneId) -> Result<&IotTarget, IotError> {
        self.targets
            .get(zone)
            .ok_or_else(|| IotError::UnknownZone(zone.to_string()))
    }

    /// The relay coordinates the command feed polls.
    #[must_use]
    pub fn targets(&self) -> Vec<IotTarget> {
        self.targets.values().cloned().collect()
    }
}

impl DevicePlatform for IotRestPlatform {
    type Session = IotRestSession;

    async fn activate(
        &self,
        zone: &ZoneId,
    ) -> Result<ActivationOutcome<Self::Session>, BridgeError> {
        let Some(device_credentials) =
            credentials::load(&self.config.credential_dir, zone).await?
        else {
            return Ok(ActivationOutcome::MissingCredentials);
        };
        let target = self.target(zone)?;
        tracing::info!(
            zone = %zone,
            endpoint_id = device_credentials.endpoint_id,
            "device session activated"
        );
        Ok(ActivationOutcome::Activated(IotRestSession {
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            message_format: format!("{}:attributes", target.urn),
            credentials: device_credentials,
            zone: zone.clone(),
        }))
    }

    async fn invoke_set_action(&self, zone: &ZoneId, value: &str) -> Result<(), BridgeError> {
        let target = self.target(zone)?;
        let uri = format!(
            "{}/iot/api/v2/apps/{}/devices/{}/deviceModels/{}/actions/{}",
            self.config.base_url, target.app_id, target.device_id, target.urn, target.action
        );
        tracing::debug!(zone = %zone, uri, value, "invoking device-model action");
        let response = self
            .client
            .post(uri)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&serde_json::json!({ "value": value }))
            .send()
            .await
            .map_err(IotError::Transport)?;
        check(response).await?;
        Ok(())
    }
}

/// An activated device session bound to one zone's endpoint.
pub struct IotRestSession {
    client: reqwest::Client,
    base_url: String,
    message_format: String,
    credentials: DeviceCredentials,
    zone: ZoneId,
}

impl DeviceSession for IotRestSession {
    async fn push_telemetry(&self, update: TelemetryUpdate) -> Result<(), BridgeError> {
        let message = serde_json::json!([{
            "type": "DATA",
            "source": self.credentials.endpoint_id,
            "payload": {
                "format": self.message_format,
                "data": update,
            },
        }]);
        let response = self
            .client
            .post(format!("{}/iot/api/v2/messages", self.base_url))
            .basic_auth(
                &self.credentials.endpoint_id,
                Some(&self.credentials.shared_secret),
            )
            .json(&message)
            .send()
            .await
            .map_err(IotError::Transport)?;
        check(response).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), BridgeError> {
        tracing::debug!(zone = %self.zone, "device session closed");
        Ok(())
    }
}

pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, IotError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(IotError::Api { status, body })
}
