//! MQTT session configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration of the bus session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Delay between two connection attempts, in milliseconds.
    pub reconnect_interval_ms: u64,
    /// Ask the broker for a fresh session on every connection.
    pub clean_session: bool,
    /// Bound of the request and event queues.
    pub channel_capacity: usize,
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }

    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1883,
            keep_alive_secs: 30,
            reconnect_interval_ms: 1000,
            clean_session: true,
            channel_capacity: 64,
        }
    }
}
