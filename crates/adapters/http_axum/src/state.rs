//! Shared application state for axum handlers.

use std::sync::Arc;

use thermobridge_app::ports::{DevicePlatform, SensorPlatform};
use thermobridge_app::registry::ZoneRegistry;
use thermobridge_app::scheduler::ZoneScheduler;
use thermobridge_app::services::LifecycleService;

/// Application state shared across all axum handlers.
///
/// Generic over the device- and sensor-platform implementations to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone` — only the `Arc` wrappers
/// are cloned.
pub struct AppState<DP: DevicePlatform, SP: SensorPlatform> {
    /// Per-zone lifecycle and polling state machine.
    pub scheduler: Arc<ZoneScheduler<DP::Session, SP::Session>>,
    /// Canonical zone records.
    pub registry: Arc<ZoneRegistry<DP::Session, SP::Session>>,
    /// Session lifecycle driver for the reset operations.
    pub lifecycle: Arc<LifecycleService<DP, SP>>,
    /// Device platform, used for the upstream set-point relay.
    pub device_platform: Arc<DP>,
}

impl<DP: DevicePlatform, SP: SensorPlatform> Clone for AppState<DP, SP> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            registry: Arc::clone(&self.registry),
            lifecycle: Arc::clone(&self.lifecycle),
            device_platform: Arc::clone(&self.device_platform),
        }
    }
}

impl<DP, SP> AppState<DP, SP>
where
    DP: DevicePlatform + 'static,
    SP: SensorPlatform + 'static,
{
    /// Create the state from pre-wrapped `Arc` collaborators, which the
    /// binary shares with background tasks.
    pub fn new(
        scheduler: Arc<ZoneScheduler<DP::Session, SP::Session>>,
        registry: Arc<ZoneRegistry<DP::Session, SP::Session>>,
        lifecycle: Arc<LifecycleService<DP, SP>>,
        device_platform: Arc<DP>,
    ) -> Self {
        Self {
            scheduler,
            registry,
            lifecycle,
            device_platform,
        }
    }
}
