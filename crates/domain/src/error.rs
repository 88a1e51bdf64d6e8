//! Common error types used across the workspace.
//!
//! Hard failures only: conditions like "zone already running" are not errors
//! and are modelled as explicit outcome enums in the `app` crate so callers
//! can branch on intent-already-satisfied separately from real failures.

/// Top-level error for all thermobridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The requested demozone is not part of the schedulable set.
    #[error(transparent)]
    ZoneNotFound(#[from] ZoneNotFoundError),

    /// A caller-supplied parameter failed validation.
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),

    /// A collaborator platform call failed (sensor, device, or setup store).
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// The named demozone is unknown or permanently disabled.
#[derive(Debug, thiserror::Error)]
#[error("demozone {zone} not registered")]
pub struct ZoneNotFoundError {
    /// The identifier the caller asked for.
    pub zone: String,
}

/// A request parameter was missing, malformed, or out of range.
#[derive(Debug, thiserror::Error)]
#[error("missing or invalid '{name}' parameter: {reason}")]
pub struct InvalidParameterError {
    /// Parameter name as exposed on the admin surface.
    pub name: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl InvalidParameterError {
    /// Build an error for the given parameter.
    #[must_use]
    pub fn new(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            reason: reason.into(),
        }
    }
}

/// A call to an external collaborator failed.
///
/// Adapter crates keep their own typed error enums and flatten them into
/// this at the port boundary.
#[derive(Debug, thiserror::Error)]
#[error("{platform} platform error: {message}")]
pub struct PlatformError {
    /// Which collaborator failed (`"netatmo"`, `"iot"`, `"setup"`).
    pub platform: &'static str,
    /// Flattened failure description.
    pub message: String,
}

impl PlatformError {
    /// Build a platform error from any displayable failure.
    #[must_use]
    pub fn new(platform: &'static str, message: impl ToString) -> Self {
        Self {
            platform,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_zone_not_found_with_zone_name() {
        let err = BridgeError::from(ZoneNotFoundError {
            zone: "LOBBY".to_string(),
        });
        assert_eq!(err.to_string(), "demozone LOBBY not registered");
    }

    #[test]
    fn should_display_invalid_parameter_with_name_and_reason() {
        let err = InvalidParameterError::new("minutes", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "missing or invalid 'minutes' parameter: must be greater than zero"
        );
    }

    #[test]
    fn should_display_platform_error_with_platform_name() {
        let err = PlatformError::new("netatmo", "connection refused");
        assert_eq!(
            err.to_string(),
            "netatmo platform error: connection refused"
        );
    }

    #[test]
    fn should_convert_platform_error_into_bridge_error() {
        let err: BridgeError = PlatformError::new("iot", "boom").into();
        assert!(matches!(err, BridgeError::Platform(_)));
    }
}
