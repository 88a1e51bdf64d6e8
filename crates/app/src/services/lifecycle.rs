//! Session lifecycle: activate managed devices at startup, authenticate
//! sensor sessions, and handle the two reset operations.

use std::sync::Arc;

use thermobridge_domain::error::BridgeError;
use thermobridge_domain::zone::SensorHealth;

use crate::ports::{ActivationOutcome, DevicePlatform, DeviceSession, SensorPlatform};
use crate::registry::ZoneRegistry;
use crate::scheduler::ZoneScheduler;

/// Brings device and sensor sessions up and tears them down on resets.
pub struct LifecycleService<DP: DevicePlatform, SP: SensorPlatform> {
    device_platform: Arc<DP>,
    sensor_platform: Arc<SP>,
    registry: Arc<ZoneRegistry<DP::Session, SP::Session>>,
    scheduler: Arc<ZoneScheduler<DP::Session, SP::Session>>,
}

impl<DP, SP> LifecycleService<DP, SP>
where
    DP: DevicePlatform,
    SP: SensorPlatform,
{
    #[must_use]
    pub fn new(
        device_platform: Arc<DP>,
        sensor_platform: Arc<SP>,
        registry: Arc<ZoneRegistry<DP::Session, SP::Session>>,
        scheduler: Arc<ZoneScheduler<DP::Session, SP::Session>>,
    ) -> Self {
        Self {
            device_platform,
            sensor_platform,
            registry,
            scheduler,
        }
    }

    /// Activate a managed-device session for every enabled zone.
    ///
    /// A zone without credential material is stopped if running and then
    /// permanently disabled; the remaining zones keep initializing.
    ///
    /// # Errors
    ///
    /// Propagates the first activation failure that is not a
    /// missing-credential condition.
    pub async fn init_devices(&self) -> Result<(), BridgeError> {
        for zone in self.registry.enabled_zones() {
            match self.device_platform.activate(&zone.id).await? {
                ActivationOutcome::Activated(session) => {
                    self.registry.set_device_session(&zone.id, session);
                    tracing::info!(zone = %zone.id, "device session activated");
                }
                ActivationOutcome::MissingCredentials => {
                    tracing::error!(
                        zone = %zone.id,
                        "no device credential material, disabling zone"
                    );
                    // a running zone can lose its credentials between resets
                    self.scheduler.disable(&zone.id);
                }
            }
        }
        Ok(())
    }

    /// Close every device session and re-run device initialization.
    ///
    /// # Errors
    ///
    /// Propagates activation failures from the re-initialization pass.
    /// Close failures are logged only.
    pub async fn reset_devices(&self) -> Result<(), BridgeError> {
        tracing::info!("closing all device sessions for reset");
        for session in self.registry.take_device_sessions() {
            if let Err(err) = session.close().await {
                tracing::warn!(error = %err, "device session close failed");
            }
        }
        self.init_devices().await
    }

    /// Authenticate a sensor session for every enabled zone.
    ///
    /// Authentication failures are per-zone and non-fatal: the zone stays
    /// schedulable with degraded sensor health and its poll cycles skip
    /// until the next reset.
    pub async fn init_sensors(&self) {
        for zone in self.registry.enabled_zones() {
            match self
                .sensor_platform
                .authenticate(&zone.sensor_identity)
                .await
            {
                Ok(session) => {
                    self.registry.set_sensor_session(&zone.id, session);
                    self.registry
                        .set_sensor_health(&zone.id, SensorHealth::connected());
                    tracing::info!(zone = %zone.id, "sensor session authenticated");
                }
                Err(err) => {
                    tracing::error!(zone = %zone.id, error = %err, "sensor authentication failed");
                    self.registry
                        .set_sensor_health(&zone.id, SensorHealth::error(err.to_string()));
                }
            }
        }
    }

    /// Drop every sensor session and re-run sensor initialization.
    pub async fn reset_sensors(&self) {
        tracing::info!("clearing all sensor sessions for reset");
        self.registry.clear_sensor_sessions();
        self.init_sensors().await;
    }
}
