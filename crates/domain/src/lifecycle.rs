//! Lifecycle — the runtime's connection state machine.
//!
//! ```text
//! Unconnected ──connect──▶ Connecting ──ack──▶ Connected ──signal──▶ Terminating ──exit──▶ Terminated
//! ```
//!
//! A repeated `connect` or a repeated acknowledgement (transport-level
//! reconnect) leaves the state unchanged. There is no way back to
//! `Connecting` once connected.

/// Where the runtime currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unconnected,
    Connecting,
    Connected,
    Terminating,
    Terminated,
}

/// Inputs that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Adapter code called `connect`.
    ConnectRequested,
    /// The transport acknowledged a connection.
    ConnectionAcknowledged,
    /// The hosting process received a termination signal.
    TerminationSignal,
    /// The offline announcement went out and the process is exiting.
    Exited,
}

/// An event that has no meaning in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot handle {event:?} while {state:?}")]
pub struct InvalidTransition {
    /// State the machine was in.
    pub state: LifecycleState,
    /// Rejected event.
    pub event: LifecycleEvent,
}

impl LifecycleState {
    /// Apply `event`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `event` is not accepted in this state.
    pub fn on(self, event: LifecycleEvent) -> Result<Self, InvalidTransition> {
        use LifecycleEvent as E;
        use LifecycleState as S;

        match (self, event) {
            (S::Unconnected | S::Connecting, E::ConnectRequested) => Ok(S::Connecting),
            (S::Connected, E::ConnectRequested)
            | (S::Connecting | S::Connected, E::ConnectionAcknowledged) => Ok(S::Connected),
            (S::Connecting | S::Connected, E::TerminationSignal) => Ok(S::Terminating),
            (S::Terminating, E::Exited) => Ok(S::Terminated),
            (state, event) => Err(InvalidTransition { state, event }),
        }
    }

    /// Whether the runtime is past the point of handling messages.
    #[must_use]
    pub fn is_shutting_down(self) -> bool {
        matches!(self, Self::Terminating | Self::Terminated)
    }
}
