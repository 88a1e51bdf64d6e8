//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `thermobridge.toml` in the working directory. Every field has
//! a default so the file is optional, but the setup and IoT endpoints must
//! be configured for the daemon to do anything useful. Environment
//! variables take precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Scheduler defaults.
    pub scheduler: SchedulerConfig,
    /// Setup-store endpoint.
    pub setup: SetupConfig,
    /// IoT platform endpoint and credentials.
    pub iot: IotConfig,
    /// Netatmo API endpoint.
    pub netatmo: NetatmoApiConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Path prefix the admin surface is nested under.
    pub context_root: String,
}

/// Scheduler defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Poll period zones start with, in seconds.
    pub default_poll_secs: u32,
}

/// Setup-store endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Store base URL.
    pub base_url: String,
    /// Path of the roster resource.
    pub setup_path: String,
    /// Path prefix for target-temperature persistence.
    pub target_path: String,
}

/// IoT platform configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IotConfig {
    /// Platform base URL.
    pub base_url: String,
    /// Operator account for action invocations and command polling.
    pub username: String,
    pub password: String,
    /// Directory holding the per-zone `<ZONE>.conf` credential stores.
    pub credential_dir: PathBuf,
    /// How often the inbound command feed polls, in seconds.
    pub command_poll_secs: u64,
}

/// Netatmo API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NetatmoApiConfig {
    /// API base URL.
    pub base_url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `thermobridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration is semantically invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("thermobridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("THERMOBRIDGE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_CONTEXT_ROOT") {
            self.server.context_root = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_SETUP_URL") {
            self.setup.base_url = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_IOT_URL") {
            self.iot.base_url = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_IOT_USERNAME") {
            self.iot.username = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_IOT_PASSWORD") {
            self.iot.password = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_CREDENTIAL_DIR") {
            self.iot.credential_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_NETATMO_URL") {
            self.netatmo.base_url = val;
        }
        if let Ok(val) = std::env::var("THERMOBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if !self.server.context_root.starts_with('/') {
            return Err(ConfigError::Validation(
                "context_root must start with '/'".to_string(),
            ));
        }
        if self.scheduler.default_poll_secs == 0 {
            return Err(ConfigError::Validation(
                "default_poll_secs must be positive".to_string(),
            ));
        }
        if self.setup.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "setup base_url must be configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 11000,
            context_root: "/ngw".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_poll_secs: 30,
        }
    }
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            setup_path: "/ords/pdb1/smarthospitality/netatmo/setup".to_string(),
            target_path: "/ords/pdb1/smarthospitality/netatmo/target/set".to_string(),
        }
    }
}

impl Default for IotConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            credential_dir: PathBuf::from("."),
            command_poll_secs: 5,
        }
    }
}

impl Default for NetatmoApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.netatmo.net".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "thermobridged=info,thermobridge=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 11000);
        assert_eq!(config.server.context_root, "/ngw");
        assert_eq!(config.scheduler.default_poll_secs, 30);
        assert_eq!(config.iot.command_poll_secs, 5);
        assert_eq!(config.netatmo.base_url, "https://api.netatmo.net");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 11000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090
            context_root = '/bridge'

            [scheduler]
            default_poll_secs = 60

            [setup]
            base_url = 'https://db.example.com'

            [iot]
            base_url = 'https://iot.example.com'
            username = 'operator'
            password = 'pw'
            credential_dir = '/etc/thermobridge'
            command_poll_secs = 10

            [netatmo]
            base_url = 'https://netatmo.example.com'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.context_root, "/bridge");
        assert_eq!(config.scheduler.default_poll_secs, 60);
        assert_eq!(config.setup.base_url, "https://db.example.com");
        assert_eq!(config.iot.credential_dir, PathBuf::from("/etc/thermobridge"));
        assert_eq!(config.iot.command_poll_secs, 10);
        assert_eq!(config.netatmo.base_url, "https://netatmo.example.com");
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [setup]
            base_url = 'https://db.example.com'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 11000);
        assert_eq!(
            config.setup.setup_path,
            "/ords/pdb1/smarthospitality/netatmo/setup"
        );
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 11000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.setup.base_url = "https://db.example.com".to_string();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_relative_context_root() {
        let mut config = Config::default();
        config.setup.base_url = "https://db.example.com".to_string();
        config.server.context_root = "ngw".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_default_poll() {
        let mut config = Config::default();
        config.setup.base_url = "https://db.example.com".to_string();
        config.scheduler.default_poll_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_require_setup_base_url() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_configured_setup_url() {
        let mut config = Config::default();
        config.setup.base_url = "https://db.example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:11000");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
