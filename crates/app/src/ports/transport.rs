//! Transport port — the single bus session owned by the runtime.
//!
//! The session is always reconnecting: once [`connect`](Transport::connect)
//! has been called, the adapter keeps retrying on a fixed interval and
//! reports what happens as [`SessionEvent`]s on a channel handed to the
//! runtime at construction.

use std::future::Future;

use iotbridge_domain::error::BridgeError;
use iotbridge_domain::payload::InboundMessage;

/// What the session reports to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The broker acknowledged a connection (initial or after a drop).
    Connected,
    /// The connection dropped; the session will retry on its own.
    Disconnected {
        /// Human readable cause.
        reason: String,
    },
    /// A message arrived on a subscribed topic.
    Message(InboundMessage),
}

/// Outbound side of the bus session.
///
/// Publishing is fire-and-forget: `Ok` means the request was handed to the
/// session, not that the broker received it.
pub trait Transport: Send + Sync {
    /// Start the session. Calling it again once started is a no-op.
    fn connect(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Subscribe to a full topic.
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Unsubscribe from a full topic.
    fn unsubscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Publish a text payload on a full topic.
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Close the session.
    fn disconnect(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn connect(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).connect()
    }

    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).subscribe(topic)
    }

    fn unsubscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).unsubscribe(topic)
    }

    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(topic, payload)
    }

    fn disconnect(&self) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).disconnect()
    }
}
