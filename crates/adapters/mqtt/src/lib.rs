//! # iotbridge-adapter-mqtt
//!
//! MQTT transport for the integration runtime.
//!
//! ## Responsibilities
//! - Own the single client connection of an adapter process
//! - Retry the connection forever on a fixed interval
//! - Report acknowledgements, drops and inbound publishes as session events
//! - Carry subscribe, unsubscribe and publish requests (QoS 0, not retained)
//!
//! ## Dependency rule
//! Depends on `iotbridge-app` (for the [`Transport`](iotbridge_app::ports::Transport)
//! port) and `iotbridge-domain`.

pub mod config;
pub mod error;
pub mod session;

pub use config::MqttConfig;
pub use session::MqttSession;
