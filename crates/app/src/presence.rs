//! Presence reporter — tells the orchestrator whether the adapter is alive.

use iotbridge_domain::error::BridgeError;
use iotbridge_domain::presence::Presence;
use iotbridge_domain::topic;

use crate::ports::Transport;

/// Publishes presence on `/orchestrator/integration/{id}/online`.
pub struct PresenceReporter<T> {
    topic: String,
    transport: T,
}

impl<T: Transport> PresenceReporter<T> {
    pub fn new(id: &str, transport: T) -> Self {
        Self {
            topic: topic::presence(id),
            transport,
        }
    }

    /// Publish `presence`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the publish could not be handed over.
    pub async fn announce(&self, presence: Presence) -> Result<(), BridgeError> {
        tracing::info!(%presence, topic = %self.topic, "announcing presence");
        self.transport
            .publish(&self.topic, presence.as_payload().to_string())
            .await
    }
}
