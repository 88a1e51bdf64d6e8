//! IoT adapter error types.

use thermobridge_domain::error::{BridgeError, PlatformError};

/// Errors specific to the IoT REST adapter.
#[derive(Debug, thiserror::Error)]
pub enum IotError {
    /// Reading a device credential store failed for a reason other than
    /// the file being absent.
    #[error("failed to read device credential store")]
    Io(#[source] std::io::Error),

    /// The credential store exists but is not valid JSON.
    #[error("malformed device credential store")]
    CredentialParse(#[source] serde_json::Error),

    /// The HTTP transport failed.
    #[error("iot request failed")]
    Transport(#[source] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("iot platform rejected the request: {status} {body}")]
    Api { status: u16, body: String },

    /// No action target is registered for the zone.
    #[error("no IoT target registered for demozone {0}")]
    UnknownZone(String),
}

impl IotError {
    /// Flatten into a [`BridgeError::Platform`] for propagation across the
    /// port boundary.
    pub fn into_domain(self) -> BridgeError {
        PlatformError::new("iot", self).into()
    }
}

impl From<IotError> for BridgeError {
    fn from(err: IotError) -> Self {
        err.into_domain()
    }
}
