//! Zone — one administratively controllable thermostat installation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Case-normalized demozone identifier.
///
/// Identifiers compare, hash, and display in uppercase regardless of the
/// casing used by callers: `ZoneId::new("lobby") == ZoneId::new("LOBBY")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(String);

impl ZoneId {
    /// Build a normalized identifier from any casing.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_uppercase())
    }

    /// Access the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Scheduling status of a zone.
///
/// `Disabled` is permanent for the process lifetime and replaces the
/// legacy convention of invalidating a zone by mangling its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneStatus {
    /// No valid device configuration was found; excluded from scheduling.
    Disabled,
    /// Registered, polling inactive.
    Stopped,
    /// Polling active.
    Running,
}

impl ZoneStatus {
    /// Whether a poll loop is currently active.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("DISABLED"),
            Self::Stopped => f.write_str("STOPPED"),
            Self::Running => f.write_str("RUNNING"),
        }
    }
}

/// Credentials used to authenticate against the sensor platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// Opaque identifiers used to reach a zone's thermostat on the sensor
/// platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorIdentity {
    /// Station (relay) identifier on the sensor platform.
    pub device_id: String,
    /// Thermostat module identifier attached to the station.
    pub module_id: String,
    /// API credentials for this zone's account.
    pub credentials: SensorCredentials,
}

/// Canonical record for one demozone.
///
/// Created at startup from the external setup roster and mutated only
/// through the registry/scheduler; never destroyed during the process
/// lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub status: ZoneStatus,
    /// Current polling interval in seconds; always positive.
    pub poll_period_secs: u32,
    pub sensor_identity: SensorIdentity,
}

impl Zone {
    /// Build a zone in the `Stopped` state with the given poll period.
    #[must_use]
    pub fn new(id: ZoneId, poll_period_secs: u32, sensor_identity: SensorIdentity) -> Self {
        Self {
            id,
            status: ZoneStatus::Stopped,
            poll_period_secs,
            sensor_identity,
        }
    }
}

/// Connection health of a zone's sensor session, tracked separately from
/// the scheduling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorStatus {
    Disconnected,
    Connected,
    Warning,
    Error,
}

/// Sensor status plus the message that produced it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorHealth {
    pub status: SensorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SensorHealth {
    /// Session established and responsive.
    #[must_use]
    pub fn connected() -> Self {
        Self {
            status: SensorStatus::Connected,
            message: None,
        }
    }

    /// Session established but the last interaction failed.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: SensorStatus::Warning,
            message: Some(message.into()),
        }
    }

    /// Authentication or session setup failed.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SensorStatus::Error,
            message: Some(message.into()),
        }
    }
}

impl Default for SensorHealth {
    fn default() -> Self {
        Self {
            status: SensorStatus::Disconnected,
            message: None,
        }
    }
}
