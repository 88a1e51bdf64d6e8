//! Netatmo adapter error types.

use thermobridge_domain::error::{BridgeError, PlatformError};

/// Errors specific to the Netatmo adapter.
#[derive(Debug, thiserror::Error)]
pub enum NetatmoError {
    /// The HTTP transport failed.
    #[error("netatmo request failed")]
    Transport(#[source] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("netatmo rejected the request: {status} {body}")]
    Api { status: u16, body: String },

    /// The API answered with a payload the adapter cannot interpret.
    #[error("unexpected netatmo payload: {0}")]
    Payload(String),

    /// The station has no thermostat module matching the configured id.
    #[error("no thermostat module {module_id} on station {device_id}")]
    ModuleNotFound {
        device_id: String,
        module_id: String,
    },
}

impl NetatmoError {
    /// Flatten into a [`BridgeError::Platform`] for propagation across the
    /// port boundary.
    pub fn into_domain(self) -> BridgeError {
        PlatformError::new("netatmo", self).into()
    }
}

impl From<NetatmoError> for BridgeError {
    fn from(err: NetatmoError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_module_not_found_with_both_ids() {
        let err = NetatmoError::ModuleNotFound {
            device_id: "70:ee:50:00:00:01".to_string(),
            module_id: "04:00:00:00:00:01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no thermostat module 04:00:00:00:00:01 on station 70:ee:50:00:00:01"
        );
    }

    #[test]
    fn should_flatten_into_platform_error() {
        let err: BridgeError = NetatmoError::Payload("no devices".to_string()).into();
        assert!(matches!(err, BridgeError::Platform(_)));
        assert!(err.to_string().contains("netatmo"));
    }
}
