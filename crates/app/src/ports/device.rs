//! Device platform port — managed-device activation, telemetry push, and
//! the upstream set-point action relay.

use std::future::Future;

use thermobridge_domain::error::BridgeError;
use thermobridge_domain::telemetry::TelemetryUpdate;
use thermobridge_domain::zone::ZoneId;

/// Result of attempting to activate a zone's managed device.
#[derive(Debug)]
pub enum ActivationOutcome<S> {
    /// Activation succeeded; the session is ready for telemetry.
    Activated(S),
    /// No credential material exists for the zone — the zone must be
    /// excluded from scheduling.
    MissingCredentials,
}

/// Entry point into the cloud device-management collaborator.
pub trait DevicePlatform: Send + Sync {
    /// The per-zone session type produced by activation.
    type Session: DeviceSession + Send + Sync + 'static;

    /// Load the zone's credential material and activate its managed
    /// device.
    ///
    /// Missing credentials are reported through
    /// [`ActivationOutcome::MissingCredentials`], not as an error: they
    /// gate the zone into the `Disabled` state rather than aborting the
    /// whole initialization.
    fn activate(
        &self,
        zone: &ZoneId,
    ) -> impl Future<Output = Result<ActivationOutcome<Self::Session>, BridgeError>> + Send;

    /// Relay a set-point value upstream by invoking the zone's
    /// device-model action on the platform. The platform delivers the
    /// value back through the inbound command channel.
    fn invoke_set_action(
        &self,
        zone: &ZoneId,
        value: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// An activated managed-device session.
pub trait DeviceSession: Send + Sync {
    /// Push one telemetry update through the outbound channel.
    fn push_telemetry(
        &self,
        update: TelemetryUpdate,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Close the session. Called during device-platform resets.
    fn close(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
