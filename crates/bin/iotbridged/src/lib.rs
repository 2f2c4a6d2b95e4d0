//! # iotbridged
//!
//! Composition root of an adapter process.
//!
//! ## Responsibilities
//! - Load `iotbridge.toml` and environment overrides
//! - Install the tracing subscriber
//! - Parse the orchestrator's launch argument and integration definitions
//! - Wire the MQTT session, schema file store and virtual integration into a
//!   runtime, then run it until SIGTERM or Ctrl-C
//! - Exit with the status the orchestrator expects
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no routing logic belongs here.

pub mod config;
pub mod launch;
pub mod logging;
