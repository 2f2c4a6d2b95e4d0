//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `iotbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use iotbridge_adapter_mqtt::MqttConfig;
use iotbridge_app::runtime::RuntimeOptions;

/// Name of the optional configuration file.
pub const CONFIG_FILE: &str = "iotbridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bus session settings.
    pub mqtt: MqttConfig,
    /// Runtime settings.
    pub runtime: RuntimeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Runtime and file locations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Orchestrator file listing the known integrations and their schemas.
    pub definitions_path: PathBuf,
    /// Directory receiving `{integrationName}.json` schema files.
    pub schema_dir: PathBuf,
    /// Delay between the offline announcement and the disconnect.
    pub shutdown_grace_ms: u64,
    pub resubscribe_on_reconnect: bool,
    pub publish_initial_state: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `iotbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(CONFIG_FILE)?;
        config.apply_overrides(|key| std::env::var(key).ok());
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

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("IOTBRIDGE_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(port) = var("IOTBRIDGE_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.broker_port = port;
        }
        if let Some(val) = var("IOTBRIDGE_DEFINITIONS") {
            self.runtime.definitions_path = val.into();
        }
        if let Some(val) = var("IOTBRIDGE_SCHEMA_DIR") {
            self.runtime.schema_dir = val.into();
        }
        if let Some(val) = var("IOTBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.mqtt.reconnect_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "reconnect interval must be non-zero".to_string(),
            ));
        }
        if self.mqtt.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channel capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl RuntimeConfig {
    /// Runtime tunables derived from this section.
    #[must_use]
    pub fn options(&self) -> RuntimeOptions {
        RuntimeOptions {
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
            resubscribe_on_reconnect: self.resubscribe_on_reconnect,
            publish_initial_state: self.publish_initial_state,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            definitions_path: PathBuf::from("config.json"),
            schema_dir: PathBuf::from("schemas"),
            shutdown_grace_ms: 100,
            resubscribe_on_reconnect: true,
            publish_initial_state: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "iotbridged=info,iotbridge=info".to_string(),
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
