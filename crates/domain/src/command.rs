//! Set-point commands delivered by the device platform.
//!
//! The platform invokes the thermostat's set-point action with a composite
//! string of the form `<deviceId>/<temperature>`.

use crate::time::Timestamp;

/// Lowest accepted target temperature, °C (inclusive).
pub const SETPOINT_MIN: f64 = 5.0;
/// Highest accepted target temperature, °C (inclusive).
pub const SETPOINT_MAX: f64 = 30.0;
/// How long a manual set-point stays in effect.
pub const MANUAL_MODE_MINUTES: i64 = 30;

/// A parsed set-point command.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPointCommand {
    /// Sensor-platform station identifier the command targets.
    pub device_id: String,
    /// Requested target temperature, °C.
    pub target_temp: f64,
}

impl SetPointCommand {
    /// Parse the composite `<deviceId>/<temperature>` payload.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError`] when the separator is missing, the
    /// device id is empty, or the temperature is not a number.
    pub fn parse(raw: &str) -> Result<Self, CommandParseError> {
        let (device_id, temp) = raw
            .split_once('/')
            .ok_or_else(|| CommandParseError::MissingSeparator(raw.to_string()))?;
        if device_id.is_empty() {
            return Err(CommandParseError::EmptyDeviceId(raw.to_string()));
        }
        let target_temp: f64 = temp
            .trim()
            .parse()
            .map_err(|_| CommandParseError::InvalidTemperature(temp.to_string()))?;
        Ok(Self {
            device_id: device_id.to_string(),
            target_temp,
        })
    }

    /// Whether the requested temperature satisfies
    /// `SETPOINT_MIN <= t <= SETPOINT_MAX`.
    #[must_use]
    pub fn is_in_bounds(&self) -> bool {
        (SETPOINT_MIN..=SETPOINT_MAX).contains(&self.target_temp)
    }
}

/// Compute the end of the manual-mode validity window starting at `from`.
#[must_use]
pub fn manual_mode_end(from: Timestamp) -> Timestamp {
    from + chrono::Duration::minutes(MANUAL_MODE_MINUTES)
}

/// Malformed set-point command payloads.
#[derive(Debug, thiserror::Error)]
pub enum CommandParseError {
    /// No `/` separator in the payload.
    #[error("set-point payload '{0}' has no '/' separator")]
    MissingSeparator(String),
    /// Nothing before the separator.
    #[error("set-point payload '{0}' has an empty device id")]
    EmptyDeviceId(String),
    /// The temperature part is not a number.
    #[error("set-point temperature '{0}' is not a number")]
    InvalidTemperature(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_device_id_and_temperature() {
        let cmd = SetPointCommand::parse("70:ee:50:00:00:01/18").unwrap();
        assert_eq!(cmd.device_id, "70:ee:50:00:00:01");
        assert!((cmd.target_temp - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_parse_fractional_temperature() {
        let cmd = SetPointCommand::parse("dev123/21.5").unwrap();
        assert!((cmd.target_temp - 21.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_payload_without_separator() {
        let err = SetPointCommand::parse("dev123").unwrap_err();
        assert!(matches!(err, CommandParseError::MissingSeparator(_)));
    }

    #[test]
    fn should_reject_empty_device_id() {
        let err = SetPointCommand::parse("/18").unwrap_err();
        assert!(matches!(err, CommandParseError::EmptyDeviceId(_)));
    }

    #[test]
    fn should_reject_non_numeric_temperature() {
        let err = SetPointCommand::parse("dev123/warm").unwrap_err();
        assert!(matches!(err, CommandParseError::InvalidTemperature(_)));
    }

    #[test]
    fn should_accept_bounds_inclusively() {
        assert!(SetPointCommand::parse("d/5").unwrap().is_in_bounds());
        assert!(SetPointCommand::parse("d/30").unwrap().is_in_bounds());
        assert!(SetPointCommand::parse("d/18").unwrap().is_in_bounds());
    }

    #[test]
    fn should_reject_out_of_bounds_temperatures() {
        assert!(!SetPointCommand::parse("d/3").unwrap().is_in_bounds());
        assert!(!SetPointCommand::parse("d/4.9").unwrap().is_in_bounds());
        assert!(!SetPointCommand::parse("d/30.1").unwrap().is_in_bounds());
    }

    #[test]
    fn should_extend_manual_mode_by_thirty_minutes() {
        let start = crate::time::now();
        let end = manual_mode_end(start);
        assert_eq!(end - start, chrono::Duration::minutes(30));
    }
}
