//! Zone registry — canonical zone records, collaborator session slots, and
//! sensor health.
//!
//! The registry is the only shared mutable state in the system. All guards
//! are plain `std::sync::Mutex`es held strictly across synchronous
//! sections; no lock is ever held across an await point. Scheduling-state
//! mutations go through [`crate::scheduler::ZoneScheduler`] exclusively.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thermobridge_domain::error::{BridgeError, ZoneNotFoundError};
use thermobridge_domain::zone::{SensorHealth, Zone, ZoneId, ZoneStatus};

use crate::ports::ZoneSetup;

struct ZoneRecord<DS, SS> {
    zone: Zone,
    device_session: Option<Arc<DS>>,
    sensor_session: Option<Arc<SS>>,
    sensor_health: SensorHealth,
}

impl<DS, SS> ZoneRecord<DS, SS> {
    fn new(zone: Zone) -> Self {
        Self {
            zone,
            device_session: None,
            sensor_session: None,
            sensor_health: SensorHealth::default(),
        }
    }
}

/// Holds every demozone known to the process, keyed by normalized id.
///
/// Zones are created once at startup from the setup roster and never
/// destroyed; `Disabled` is the only irreversible transition.
pub struct ZoneRegistry<DS, SS> {
    inner: Mutex<BTreeMap<ZoneId, ZoneRecord<DS, SS>>>,
}

impl<DS, SS> ZoneRegistry<DS, SS> {
    /// Build the registry from the setup roster. Every zone starts
    /// `Stopped` with the given poll period.
    #[must_use]
    pub fn from_setups(setups: impl IntoIterator<Item = ZoneSetup>, poll_period_secs: u32) -> Self {
        let zones = setups
            .into_iter()
            .map(|setup| {
                let zone = setup.into_zone(poll_period_secs);
                (zone.id.clone(), ZoneRecord::new(zone))
            })
            .collect();
        Self {
            inner: Mutex::new(zones),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ZoneId, ZoneRecord<DS, SS>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered zones, disabled ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Look up a zone record by id, disabled ones included.
    #[must_use]
    pub fn get(&self, id: &ZoneId) -> Option<Zone> {
        self.lock().get(id).map(|record| record.zone.clone())
    }

    /// Look up a zone for a scheduling operation.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ZoneNotFound`] when the zone is unknown or
    /// `Disabled` — disabled zones are invisible to the scheduler.
    pub fn schedulable(&self, id: &ZoneId) -> Result<Zone, BridgeError> {
        match self.lock().get(id) {
            Some(record) if record.zone.status != ZoneStatus::Disabled => {
                Ok(record.zone.clone())
            }
            _ => Err(ZoneNotFoundError {
                zone: id.to_string(),
            }
            .into()),
        }
    }

    /// Snapshot of every zone that is not `Disabled`, in id order.
    #[must_use]
    pub fn enabled_zones(&self) -> Vec<Zone> {
        self.lock()
            .values()
            .filter(|record| record.zone.status != ZoneStatus::Disabled)
            .map(|record| record.zone.clone())
            .collect()
    }

    /// Permanently exclude a zone from scheduling. Clears any session
    /// slots it held.
    ///
    /// Timer cancellation is the scheduler's job: a zone that may hold
    /// live timers is disabled through
    /// [`crate::scheduler::ZoneScheduler::disable`], which wraps this
    /// under its timer lock.
    pub fn mark_disabled(&self, id: &ZoneId) {
        if let Some(record) = self.lock().get_mut(id) {
            record.zone.status = ZoneStatus::Disabled;
            record.device_session = None;
            record.sensor_session = None;
            record.sensor_health = SensorHealth::default();
        }
    }

    /// Flip a zone's scheduling status. No-op for `Disabled` zones.
    pub fn set_status(&self, id: &ZoneId, status: ZoneStatus) {
        if let Some(record) = self.lock().get_mut(id)
            && record.zone.status != ZoneStatus::Disabled
        {
            record.zone.status = status;
        }
    }

    /// Update a zone's poll period after a successful reconfigure.
    pub fn set_poll_period(&self, id: &ZoneId, poll_period_secs: u32) {
        if let Some(record) = self.lock().get_mut(id) {
            record.zone.poll_period_secs = poll_period_secs;
        }
    }

    /// Install a zone's managed-device session.
    pub fn set_device_session(&self, id: &ZoneId, session: DS) {
        if let Some(record) = self.lock().get_mut(id) {
            record.device_session = Some(Arc::new(session));
        }
    }

    /// Handle to a zone's managed-device session, if activated.
    #[must_use]
    pub fn device_session(&self, id: &ZoneId) -> Option<Arc<DS>> {
        self.lock().get(id).and_then(|r| r.device_session.clone())
    }

    /// Remove every device session and return the handles so the caller
    /// can close them outside the lock.
    #[must_use]
    pub fn take_device_sessions(&self) -> Vec<Arc<DS>> {
        self.lock()
            .values_mut()
            .filter_map(|record| record.device_session.take())
            .collect()
    }

    /// Install a zone's sensor session.
    pub fn set_sensor_session(&self, id: &ZoneId, session: SS) {
        if let Some(record) = self.lock().get_mut(id) {
            record.sensor_session = Some(Arc::new(session));
        }
    }

    /// Handle to a zone's sensor session, if authenticated.
    #[must_use]
    pub fn sensor_session(&self, id: &ZoneId) -> Option<Arc<SS>> {
        self.lock().get(id).and_then(|r| r.sensor_session.clone())
    }

    /// Drop every sensor session and reset health to disconnected.
    pub fn clear_sensor_sessions(&self) {
        for record in self.lock().values_mut() {
            record.sensor_session = None;
            record.sensor_health = SensorHealth::default();
        }
    }

    /// Record the health of a zone's sensor session.
    pub fn set_sensor_health(&self, id: &ZoneId, health: SensorHealth) {
        if let Some(record) = self.lock().get_mut(id) {
            record.sensor_health = health;
        }
    }

    /// Current sensor health for a zone.
    #[must_use]
    pub fn sensor_health(&self, id: &ZoneId) -> Option<SensorHealth> {
        self.lock().get(id).map(|r| r.sensor_health.clone())
    }

    /// Every enabled zone whose sensor identity targets the given station,
    /// paired with its sensor session if one is live.
    ///
    /// Multiple zones may share a station; set-point commands fan out to
    /// all of them.
    #[must_use]
    pub fn zones_for_sensor_device(&self, device_id: &str) -> Vec<(Zone, Option<Arc<SS>>)> {
        self.lock()
            .values()
            .filter(|record| {
                record.zone.status != ZoneStatus::Disabled
                    && record.zone.sensor_identity.device_id == device_id
            })
            .map(|record| (record.zone.clone(), record.sensor_session.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermobridge_domain::zone::SensorStatus;

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

    type TestRegistry = ZoneRegistry<(), ()>;

    fn registry() -> TestRegistry {
        ZoneRegistry::from_setups(
            vec![setup("lobby", "dev123"), setup("bar", "dev456")],
            30,
        )
    }

    #[test]
    fn should_register_zones_stopped_with_default_period() {
        let registry = registry();
        let zone = registry.get(&ZoneId::new("LOBBY")).unwrap();
        assert_eq!(zone.status, ZoneStatus::Stopped);
        assert_eq!(zone.poll_period_secs, 30);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn should_find_zone_regardless_of_request_casing() {
        let registry = registry();
        assert!(registry.get(&ZoneId::new("lobby")).is_some());
    }

    #[test]
    fn should_reject_unknown_zone_for_scheduling() {
        let registry = registry();
        let err = registry.schedulable(&ZoneId::new("POOL")).unwrap_err();
        assert!(matches!(err, BridgeError::ZoneNotFound(_)));
    }

    #[test]
    fn should_hide_disabled_zone_from_scheduling_and_snapshot() {
        let registry = registry();
        let id = ZoneId::new("LOBBY");
        registry.mark_disabled(&id);

        assert!(matches!(
            registry.schedulable(&id),
            Err(BridgeError::ZoneNotFound(_))
        ));
        let enabled = registry.enabled_zones();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id.as_str(), "BAR");
        // still visible through the raw lookup
        assert_eq!(
            registry.get(&id).unwrap().status,
            ZoneStatus::Disabled
        );
    }

    #[test]
    fn should_not_resurrect_disabled_zone_via_set_status() {
        let registry = registry();
        let id = ZoneId::new("LOBBY");
        registry.mark_disabled(&id);
        registry.set_status(&id, ZoneStatus::Running);
        assert_eq!(registry.get(&id).unwrap().status, ZoneStatus::Disabled);
    }

    #[test]
    fn should_match_zones_by_sensor_device_id() {
        let registry = registry();
        let matches = registry.zones_for_sensor_device("dev123");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.id.as_str(), "LOBBY");
        assert!(matches[0].1.is_none());
    }

    #[test]
    fn should_exclude_disabled_zones_from_sensor_matches() {
        let registry = registry();
        registry.mark_disabled(&ZoneId::new("LOBBY"));
        assert!(registry.zones_for_sensor_device("dev123").is_empty());
    }

    #[test]
    fn should_store_and_clear_sensor_sessions_and_health() {
        let registry = registry();
        let id = ZoneId::new("LOBBY");
        registry.set_sensor_session(&id, ());
        registry.set_sensor_health(&id, SensorHealth::connected());
        assert!(registry.sensor_session(&id).is_some());
        assert_eq!(
            registry.sensor_health(&id).unwrap().status,
            SensorStatus::Connected
        );

        registry.clear_sensor_sessions();
        assert!(registry.sensor_session(&id).is_none());
        assert_eq!(
            registry.sensor_health(&id).unwrap().status,
            SensorStatus::Disconnected
        );
    }

    #[test]
    fn should_drain_device_sessions_on_take() {
        let registry = registry();
        let id = ZoneId::new("LOBBY");
        registry.set_device_session(&id, ());
        let drained = registry.take_device_sessions();
        assert_eq!(drained.len(), 1);
        assert!(registry.device_session(&id).is_none());
    }

    #[test]
    fn should_update_poll_period() {
        let registry = registry();
        let id = ZoneId::new("BAR");
        registry.set_poll_period(&id, 120);
        assert_eq!(registry.get(&id).unwrap().poll_period_secs, 120);
    }
}
