//! One fetch-and-forward poll cycle: read the thermostat from the sensor
//! platform, map the reading, push it through the device session.

use std::sync::Arc;

use thermobridge_domain::telemetry::TelemetryUpdate;
use thermobridge_domain::zone::{SensorHealth, ZoneId};

use crate::ports::{DeviceSession, SensorSession};
use crate::registry::ZoneRegistry;

/// Executes poll cycles on behalf of the scheduler's poll tasks.
pub struct TelemetryBridge<DS, SS> {
    registry: Arc<ZoneRegistry<DS, SS>>,
}

impl<DS, SS> TelemetryBridge<DS, SS>
where
    DS: DeviceSession + Send + Sync + 'static,
    SS: SensorSession + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(registry: Arc<ZoneRegistry<DS, SS>>) -> Self {
        Self { registry }
    }

    /// Run one poll cycle for the zone.
    ///
    /// Failures never propagate: a failed read degrades the zone's sensor
    /// health and the cycle ends, a failed push is logged and the next
    /// cycle retries. Session handles are cloned out of the registry
    /// before any await so no lock is held across I/O.
    #[tracing::instrument(skip(self))]
    pub async fn poll_once(&self, zone: &ZoneId) {
        let Some(sensor) = self.registry.sensor_session(zone) else {
            tracing::warn!(zone = %zone, "no sensor session, skipping poll cycle");
            return;
        };

        let reading = match sensor.read_thermostat().await {
            Ok(reading) => {
                self.registry
                    .set_sensor_health(zone, SensorHealth::connected());
                reading
            }
            Err(err) => {
                tracing::error!(zone = %zone, error = %err, "thermostat read failed");
                self.registry
                    .set_sensor_health(zone, SensorHealth::warning(err.to_string()));
                return;
            }
        };

        let Some(device) = self.registry.device_session(zone) else {
            tracing::error!(zone = %zone, "no device session to receive telemetry");
            return;
        };
        let update = TelemetryUpdate::from_reading(&reading);
        tracing::debug!(
            zone = %zone,
            temperature = update.temperature,
            setpoint = update.setpoint_temp,
            "pushing telemetry"
        );
        if let Err(err) = device.push_telemetry(update).await {
            tracing::error!(zone = %zone, error = %err, "telemetry push failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use thermobridge_domain::error::{BridgeError, PlatformError};
    use thermobridge_domain::telemetry::ThermostatReading;
    use thermobridge_domain::zone::SensorStatus;

    use crate::ports::{SetPointRequest, ZoneSetup};

    struct StubSensorSession {
        result: Result<ThermostatReading, String>,
    }

    impl SensorSession for StubSensorSession {
        async fn read_thermostat(&self) -> Result<ThermostatReading, BridgeError> {
            self.result
                .clone()
                .map_err(|msg| PlatformError::new("sensor", msg).into())
        }

        async fn set_target(&self, _request: SetPointRequest) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    struct StubDeviceSession {
        pushes: Arc<Mutex<Vec<TelemetryUpdate>>>,
    }

    impl DeviceSession for StubDeviceSession {
        async fn push_telemetry(&self, update: TelemetryUpdate) -> Result<(), BridgeError> {
            self.pushes.lock().unwrap().push(update);
            Ok(())
        }

        async fn close(&self) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    fn setup(zone: &str) -> ZoneSetup {
        serde_json::from_value(serde_json::json!({
            "demozone": zone,
            "deviceid": "70:ee:50:00:00:01",
            "moduleid": "04:00:00:00:00:01",
            "clientid": "cid",
            "clientsecret": "cs",
            "username": "user@example.com",
            "password": "pw",
            "iotappid": "APP1",
            "iotdeviceid": "IOT1",
            "ioturn": "urn:test:thermostat",
            "iotactioncall": "SetSetPointTemp"
        }))
        .unwrap()
    }

    fn reading() -> ThermostatReading {
        ThermostatReading {
            device_id: "70:ee:50:00:00:01".to_string(),
            module_mac: "04:00:00:00:00:01".to_string(),
            station_name: "Lobby Thermostat".to_string(),
            setpoint_temp: 21.0,
            temperature: 19.4,
        }
    }

    fn harness() -> (
        TelemetryBridge<StubDeviceSession, StubSensorSession>,
        Arc<ZoneRegistry<StubDeviceSession, StubSensorSession>>,
    ) {
        let registry = Arc::new(ZoneRegistry::from_setups(vec![setup("lobby")], 30));
        (TelemetryBridge::new(Arc::clone(&registry)), registry)
    }

    #[tokio::test]
    async fn should_forward_reading_and_mark_sensor_connected() {
        let (bridge, registry) = harness();
        let id = ZoneId::new("LOBBY");
        let pushes = Arc::new(Mutex::new(Vec::new()));
        registry.set_sensor_session(
            &id,
            StubSensorSession {
                result: Ok(reading()),
            },
        );
        registry.set_device_session(
            &id,
            StubDeviceSession {
                pushes: Arc::clone(&pushes),
            },
        );

        bridge.poll_once(&id).await;

        let pushed = pushes.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].module_name, "Lobby Thermostat");
        assert_eq!(
            registry.sensor_health(&id).unwrap().status,
            SensorStatus::Connected
        );
    }

    #[tokio::test]
    async fn should_degrade_health_to_warning_on_read_failure() {
        let (bridge, registry) = harness();
        let id = ZoneId::new("LOBBY");
        let pushes = Arc::new(Mutex::new(Vec::new()));
        registry.set_sensor_session(
            &id,
            StubSensorSession {
                result: Err("token expired".to_string()),
            },
        );
        registry.set_device_session(
            &id,
            StubDeviceSession {
                pushes: Arc::clone(&pushes),
            },
        );

        bridge.poll_once(&id).await;

        assert!(pushes.lock().unwrap().is_empty());
        let health = registry.sensor_health(&id).unwrap();
        assert_eq!(health.status, SensorStatus::Warning);
        assert!(health.message.unwrap().contains("token expired"));
    }

    #[tokio::test]
    async fn should_skip_cycle_without_sensor_session() {
        let (bridge, registry) = harness();
        let id = ZoneId::new("LOBBY");
        bridge.poll_once(&id).await;
        assert_eq!(
            registry.sensor_health(&id).unwrap().status,
            SensorStatus::Disconnected
        );
    }

    #[tokio::test]
    async fn should_still_mark_connected_when_device_session_is_missing() {
        let (bridge, registry) = harness();
        let id = ZoneId::new("LOBBY");
        registry.set_sensor_session(
            &id,
            StubSensorSession {
                result: Ok(reading()),
            },
        );

        bridge.poll_once(&id).await;

        assert_eq!(
            registry.sensor_health(&id).unwrap().status,
            SensorStatus::Connected
        );
    }
}
