//! # thermobridge-adapter-setup-rest
//!
//! Setup-store adapter backed by the external configuration REST service.
//!
//! Serves the zone roster at startup and persists accepted target
//! temperatures back to the store.

pub mod error;

pub use error::SetupError;

use serde::Deserialize;

use thermobridge_app::ports::{SetupStore, ZoneSetup};
use thermobridge_domain::error::BridgeError;
use thermobridge_domain::zone::ZoneId;

/// Setup adapter configuration.
#[derive(Debug, Clone)]
pub struct SetupRestConfig {
    /// Store base URL.
    pub base_url: String,
    /// Path of the roster resource.
    pub setup_path: String,
    /// Path prefix for target-temperature persistence; zone and value are
    /// appended as path segments.
    pub target_path: String,
}

impl Default for SetupRestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            setup_path: "/ords/pdb1/smarthospitality/netatmo/setup".to_string(),
            target_path: "/ords/pdb1/smarthospitality/netatmo/target/set".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Roster {
    #[serde(default)]
    items: Vec<ZoneSetup>,
}

/// REST client for the external setup store.
pub struct SetupRestStore {
    client: reqwest::Client,
    config: SetupRestConfig,
}

impl SetupRestStore {
    #[must_use]
    pub fn new(config: SetupRestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl SetupStore for SetupRestStore {
    async fn fetch_zones(&self) -> Result<Vec<ZoneSetup>, BridgeError> {
        let uri = format!("{}{}", self.config.base_url, self.config.setup_path);
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(SetupError::Transport)?;
        let response = check(response).await?;
        let roster: Roster = response.json().await.map_err(SetupError::Transport)?;
        tracing::info!(zones = roster.items.len(), "zone roster fetched");
        Ok(roster.items)
    }

    async fn persist_target_temp(&self, zone: &ZoneId, target_temp: f64) -> Result<(), BridgeError> {
        let uri = format!(
            "{}{}/{zone}/{target_temp}",
            self.config.base_url, self.config.target_path
        );
        let response = self
            .client
            .post(uri)
            .send()
            .await
            .map_err(SetupError::Transport)?;
        check(response).await?;
        tracing::debug!(zone = %zone, target_temp, "target temperature persisted");
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, SetupError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(SetupError::Api { status, body })
}
