//! Setup adapter error types.

use thermobridge_domain::error::{BridgeError, PlatformError};

/// Errors specific to the setup-store adapter.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The HTTP transport failed.
    #[error("setup store request failed")]
    Transport(#[source] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("setup store rejected the request: {status} {body}")]
    Api { status: u16, body: String },
}

impl SetupError {
    /// Flatten into a [`BridgeError::Platform`] for propagation across the
    /// port boundary.
    pub fn into_domain(self) -> BridgeError {
        PlatformError::new("setup", self).into()
    }
}

impl From<SetupError> for BridgeError {
    fn from(err: SetupError) -> Self {
        err.into_domain()
    }
}
