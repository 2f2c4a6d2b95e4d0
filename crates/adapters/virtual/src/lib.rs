//! # iotbridge-adapter-virtual
//!
//! Virtual/demo integration: one simulated light, wired to the runtime the
//! same way a real device adapter would be.
//!
//! ## Routes
//!
//! | Kind | Path | Behaviour |
//! |------|------|-----------|
//! | data | `/name` | Name from the `name` launch parameter, or `Virtual Light` |
//! | data | `/powerState` | `on` / `off` |
//! | data | `/lightState` | `{ "on": bool, "brightness": 0..=100 }` |
//! | command | `/power/on`, `/power/off`, `/power/toggle` | Responds on `/powerState` |
//! | command | `/light/brightness` | Number 0–100, responds on `/lightState` or `/error` |
//! | command | `/greet` | `{ "name": ... }`, responds on `/greeting` |
//!
//! ## Dependency rule
//!
//! Depends on `iotbridge-app` (runtime handle) and `iotbridge-domain` only.

mod light;

use std::sync::Arc;

use serde_json::Value;

use iotbridge_app::ports::Transport;
use iotbridge_app::route_table::{CommandHandlers, Fetchers, fetcher, handler};
use iotbridge_app::runtime::RuntimeHandle;

pub use light::{DEFAULT_NAME, VirtualLight};

/// Create the light and register its routes on `handle`.
///
/// The light's name is read from the `name` launch parameter.
pub fn register<T: Transport>(handle: &RuntimeHandle<T>) -> Arc<VirtualLight> {
    let name = handle
        .params()
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_NAME);
    let light = Arc::new(VirtualLight::new(name));
    handle.set_fetchers(fetchers(&light));
    handle.set_command_handlers(commands(&light));
    tracing::info!(name = light.name(), "virtual light registered");
    light
}

fn fetchers(light: &Arc<VirtualLight>) -> Fetchers {
    let mut fetchers = Fetchers::new();

    let l = Arc::clone(light);
    fetchers.insert(
        "/name".to_string(),
        fetcher(move || {
            let name = l.name().to_string();
            async move { Ok(Some(Value::from(name))) }
        }),
    );

    let l = Arc::clone(light);
    fetchers.insert(
        "/powerState".to_string(),
        fetcher(move || {
            let state = l.power_state();
            async move { Ok(Some(Value::from(state))) }
        }),
    );

    let l = Arc::clone(light);
    fetchers.insert(
        "/lightState".to_string(),
        fetcher(move || {
            let state = l.light_state();
            async move { Ok(Some(state)) }
        }),
    );

    fetchers
}

fn commands(light: &Arc<VirtualLight>) -> CommandHandlers {
    let mut commands = CommandHandlers::new();

    let l = Arc::clone(light);
    commands.insert(
        "/power/on".to_string(),
        handler(move |_topic, _payload| {
            let response = l.set_power(true);
            async move { Ok(Some(response)) }
        }),
    );

    let l = Arc::clone(light);
    commands.insert(
        "/power/off".to_string(),
        handler(move |_topic, _payload| {
            let response = l.set_power(false);
            async move { Ok(Some(response)) }
        }),
    );

    let l = Arc::clone(light);
    commands.insert(
        "/power/toggle".to_string(),
        handler(move |_topic, _payload| {
            let response = l.toggle();
            async move { Ok(Some(response)) }
        }),
    );

    let l = Arc::clone(light);
    commands.insert(
        "/light/brightness".to_string(),
        handler(move |_topic, payload| {
            let response = l.set_brightness(&payload);
            async move { Ok(Some(response)) }
        }),
    );

    let l = Arc::clone(light);
    commands.insert(
        "/greet".to_string(),
        handler(move |_topic, payload| {
            let response = l.greet(&payload);
            async move { Ok(Some(response)) }
        }),
    );

    commands
}
