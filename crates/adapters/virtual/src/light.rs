//! Virtual light — power and brightness held in memory.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use iotbridge_domain::payload::Payload;
use iotbridge_domain::response::Response;

/// Name reported when the launch parameters carry none.
pub const DEFAULT_NAME: &str = "Virtual Light";

const MAX_BRIGHTNESS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LightState {
    on: bool,
    brightness: u8,
}

/// A simulated dimmable light.
#[derive(Debug)]
pub struct VirtualLight {
    name: String,
    state: Mutex<LightState>,
}

impl Default for VirtualLight {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl VirtualLight {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(LightState {
                on: false,
                brightness: 100,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"on"` or `"off"`.
    #[must_use]
    pub fn power_state(&self) -> &'static str {
        if self.lock_state().on { "on" } else { "off" }
    }

    /// `{ "on": bool, "brightness": 0..=100 }`.
    #[must_use]
    pub fn light_state(&self) -> Value {
        let state = *self.lock_state();
        json!({ "on": state.on, "brightness": state.brightness })
    }

    /// Switch the light on or off and report the new power state.
    pub fn set_power(&self, on: bool) -> Response {
        self.lock_state().on = on;
        Response::new("/powerState", self.power_state())
    }

    /// Invert the power state and report it.
    pub fn toggle(&self) -> Response {
        {
            let mut state = self.lock_state();
            state.on = !state.on;
        }
        Response::new("/powerState", self.power_state())
    }

    /// Set the brightness from a payload holding a number between 0 and 100.
    ///
    /// Anything else is answered on the error channel and leaves the light
    /// untouched.
    pub fn set_brightness(&self, payload: &Payload) -> Response {
        let level = payload
            .as_json()
            .and_then(Value::as_u64)
            .filter(|level| *level <= MAX_BRIGHTNESS)
            .and_then(|level| u8::try_from(level).ok());
        let Some(level) = level else {
            return Response::error(format!(
                "brightness must be a number between 0 and {MAX_BRIGHTNESS}"
            ));
        };
        self.lock_state().brightness = level;
        Response::new("/lightState", self.light_state())
    }

    /// Answer `{ "name": ... }` with a greeting.
    #[must_use]
    pub fn greet(&self, payload: &Payload) -> Response {
        match payload
            .as_json()
            .and_then(|value| value.get("name"))
            .and_then(Value::as_str)
        {
            Some(name) => Response::new("/greeting", format!("Hello {name}, I am {}", self.name)),
            None => Response::error("greet expects an object with a name"),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
