//! Presence — adapter liveness as seen by the orchestrator.

/// Binary liveness published on `/orchestrator/integration/{id}/online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    /// Text payload: `"true"` when online, `"false"` otherwise.
    #[must_use]
    pub fn as_payload(self) -> &'static str {
        match self {
            Self::Online => "true",
            Self::Offline => "false",
        }
    }
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}
