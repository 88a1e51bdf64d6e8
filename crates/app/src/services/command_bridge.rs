//! Inbound set-point dispatch: parse the platform's composite payload,
//! enforce temperature bounds, fan out to every matching zone's
//! thermostat, and persist the accepted value.

use std::sync::Arc;

use thermobridge_domain::command::{SetPointCommand, manual_mode_end};
use thermobridge_domain::time::now;

use crate::ports::{DeviceSession, SensorSession, SetPointRequest, SetupStore};
use crate::registry::ZoneRegistry;

/// Handles set-point commands delivered through the device platform's
/// inbound channel.
pub struct CommandBridge<DS, SS, ST> {
    registry: Arc<ZoneRegistry<DS, SS>>,
    setup_store: Arc<ST>,
}

impl<DS, SS, ST> CommandBridge<DS, SS, ST>
where
    DS: DeviceSession + Send + Sync + 'static,
    SS: SensorSession + Send + Sync + 'static,
    ST: SetupStore,
{
    #[must_use]
    pub fn new(registry: Arc<ZoneRegistry<DS, SS>>, setup_store: Arc<ST>) -> Self {
        Self {
            registry,
            setup_store,
        }
    }

    /// Dispatch one raw `<deviceId>/<temperature>` payload.
    ///
    /// Malformed and out-of-bounds payloads are dropped with a log entry;
    /// the inbound channel never errors back to the platform. An accepted
    /// value is applied in manual mode for thirty minutes and then
    /// persisted through the setup store, in that order. Persistence
    /// failures do not undo the applied set-point.
    #[tracing::instrument(skip(self))]
    pub async fn on_set_point(&self, raw: &str) {
        let command = match SetPointCommand::parse(raw) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(payload = raw, error = %err, "dropping malformed set-point");
                return;
            }
        };
        if !command.is_in_bounds() {
            tracing::warn!(
                device_id = command.device_id,
                target_temp = command.target_temp,
                "dropping out-of-bounds set-point"
            );
            return;
        }

        let matches = self.registry.zones_for_sensor_device(&command.device_id);
        if matches.is_empty() {
            tracing::warn!(
                device_id = command.device_id,
                "set-point targets no registered zone"
            );
            return;
        }

        for (zone, session) in matches {
            let Some(session) = session else {
                tracing::warn!(zone = %zone.id, "zone has no sensor session, skipping set-point");
                continue;
            };
            let request = SetPointRequest {
                device_id: command.device_id.clone(),
                module_id: zone.sensor_identity.module_id.clone(),
                target_temp: command.target_temp,
                valid_until: manual_mode_end(now()),
            };
            if let Err(err) = session.set_target(request).await {
                tracing::error!(zone = %zone.id, error = %err, "set-point apply failed");
                continue;
            }
            tracing::info!(
                zone = %zone.id,
                target_temp = command.target_temp,
                "set-point applied"
            );
            if let Err(err) = self
                .setup_store
                .persist_target_temp(&zone.id, command.target_temp)
                .await
            {
                tracing::error!(zone = %zone.id, error = %err, "target persistence failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use thermobridge_domain::error::{BridgeError, PlatformError};
    use thermobridge_domain::telemetry::{TelemetryUpdate, ThermostatReading};
    use thermobridge_domain::zone::ZoneId;

    use crate::ports::ZoneSetup;

    struct StubSensorSession {
        applied: Arc<Mutex<Vec<SetPointRequest>>>,
        fail: bool,
    }

    impl SensorSession for StubSensorSession {
        async fn read_thermostat(&self) -> Result<ThermostatReading, BridgeError> {
            Err(PlatformError::new("sensor", "not under test").into())
        }

        async fn set_target(&self, request: SetPointRequest) -> Result<(), BridgeError> {
            if self.fail {
                return Err(PlatformError::new("sensor", "setthermpoint failed").into());
            }
            self.applied.lock().unwrap().push(request);
            Ok(())
        }
    }

    struct StubDeviceSession;

    impl DeviceSession for StubDeviceSession {
        async fn push_telemetry(&self, _update: TelemetryUpdate) -> Result<(), BridgeError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), BridgeError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubSetupStore {
        persisted: Mutex<Vec<(ZoneId, f64)>>,
    }

    impl SetupStore for StubSetupStore {
        async fn fetch_zones(&self) -> Result<Vec<ZoneSetup>, BridgeError> {
            Ok(Vec::new())
        }

        async fn persist_target_temp(
            &self,
            zone: &ZoneId,
            target_temp: f64,
        ) -> Result<(), BridgeError> {
            self.persisted.lock().unwrap().push((zone.clone(), target_temp));
            Ok(())
        }
    }

    fn setup(zone: &str, device_id: &str) -> ZoneSetup {
        serde_json::from_value(serde_json::json!({
            "demozone": zone,
            "deviceid": device_id,
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

    type TestBridge = CommandBridge<StubDeviceSession, StubSensorSession, StubSetupStore>;

    fn harness() -> (
        TestBridge,
        Arc<ZoneRegistry<StubDeviceSession, StubSensorSession>>,
        Arc<StubSetupStore>,
    ) {
        let registry = Arc::new(ZoneRegistry::from_setups(
            vec![setup("lobby", "dev123"), setup("bar", "dev456")],
            30,
        ));
        let store = Arc::new(StubSetupStore::default());
        let bridge = CommandBridge::new(Arc::clone(&registry), Arc::clone(&store));
        (bridge, registry, store)
    }

    #[tokio::test]
    async fn should_apply_and_persist_in_bounds_set_point() {
        let (bridge, registry, store) = harness();
        let applied = Arc::new(Mutex::new(Vec::new()));
        registry.set_sensor_session(
            &ZoneId::new("LOBBY"),
            StubSensorSession {
                applied: Arc::clone(&applied),
                fail: false,
            },
        );

        bridge.on_set_point("dev123/21.5").await;

        let requests = applied.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].device_id, "dev123");
        assert_eq!(requests[0].module_id, "04:00:00:00:00:01");
        assert!((requests[0].target_temp - 21.5).abs() < f64::EPSILON);
        assert!(requests[0].valid_until > now());

        let persisted = store.persisted.lock().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].0.as_str(), "LOBBY");
    }

    #[tokio::test]
    async fn should_drop_out_of_bounds_set_point() {
        let (bridge, registry, store) = harness();
        let applied = Arc::new(Mutex::new(Vec::new()));
        registry.set_sensor_session(
            &ZoneId::new("LOBBY"),
            StubSensorSession {
                applied: Arc::clone(&applied),
                fail: false,
            },
        );

        bridge.on_set_point("dev123/42").await;

        assert!(applied.lock().unwrap().is_empty());
        assert!(store.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_drop_malformed_payload() {
        let (bridge, _registry, store) = harness();
        bridge.on_set_point("not-a-command").await;
        assert!(store.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_not_persist_when_apply_fails() {
        let (bridge, registry, store) = harness();
        registry.set_sensor_session(
            &ZoneId::new("LOBBY"),
            StubSensorSession {
                applied: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            },
        );

        bridge.on_set_point("dev123/18").await;

        assert!(store.persisted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_skip_zone_without_sensor_session() {
        let (bridge, _registry, store) = harness();
        bridge.on_set_point("dev123/18").await;
        assert!(store.persisted.lock().unwrap().is_empty());
    }
}
