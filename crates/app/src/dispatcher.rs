//! Dispatcher — routes every inbound message to exactly one handler.
//!
//! Classification, in priority order:
//!
//! 1. the raw topic matches an out-of-scope **listener** exactly;
//! 2. the path after `/{id}/` starts with `getdata/`: a **fetch**;
//! 3. anything else is a **command** keyed by `/{stripped path}`.
//!
//! Handler failures are logged and never leave [`Dispatcher::dispatch`].
//! Handlers run on their own task so that a panicking handler is reported
//! like any other failure; the dispatcher still awaits it before returning.

use serde_json::Value;
use tracing::{debug, error, warn};

use iotbridge_domain::payload::{self, InboundMessage, Payload};
use iotbridge_domain::response::Response;
use iotbridge_domain::topic::{self, InScopeRoute};

use crate::ports::Transport;
use crate::route_table::{BoxFuture, HandlerError, SharedRoutes};

/// How a message was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// An out-of-scope listener handled it.
    Listener {
        /// Whether a response was published.
        responded: bool,
    },
    /// A fetch was answered.
    Fetched,
    /// A fetch found nothing to report; no response was published.
    FetchMissing,
    /// A command handler handled it.
    Command {
        /// Whether a response was published.
        responded: bool,
    },
    /// A listener, fetcher or command handler failed; nothing was published.
    HandlerFailed,
    /// No command handler is registered; an error notice was published.
    UnknownCommand,
}

/// Routes inbound messages for one adapter.
pub struct Dispatcher<T> {
    id: String,
    transport: T,
    routes: SharedRoutes,
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher for adapter `id`.
    pub fn new(id: impl Into<String>, transport: T, routes: SharedRoutes) -> Self {
        Self {
            id: id.into(),
            transport,
            routes,
        }
    }

    /// Handle one inbound message to completion.
    #[tracing::instrument(skip_all, fields(topic = %message.topic))]
    pub async fn dispatch(&self, message: InboundMessage) -> Dispatched {
        let InboundMessage { topic, raw_payload } = message;
        let payload = Payload::decode(&raw_payload).unwrap_or_else(|err| {
            debug!(text = err.text(), "payload is not JSON, passing it on as text");
            err.into_payload()
        });

        let listener = self.routes.read().listener(&topic);
        if let Some(listener) = listener {
            debug!("routing to out-of-scope listener");
            return match run_handler(listener.handle(topic, payload)).await {
                Ok(response) => Dispatched::Listener {
                    responded: self.respond(response).await,
                },
                Err(err) => {
                    error!(%err, "listener failed");
                    Dispatched::HandlerFailed
                }
            };
        }

        match topic::classify(&topic) {
            InScopeRoute::Fetch {
                lookup_path,
                response_path,
            } => self.fetch(&lookup_path, &response_path).await,
            InScopeRoute::Command { key } => self.command(&key, topic, payload).await,
        }
    }

    async fn fetch(&self, lookup_path: &str, response_path: &str) -> Dispatched {
        debug!(path = lookup_path, "data requested");
        let routes = self.routes.clone();
        let path = lookup_path.to_string();
        let fetched = run_handler(Box::pin(async move { routes.get_data(&path).await })).await;
        match fetched {
            Ok(Some(value)) => {
                self.publish(&topic::in_scope(&self.id, response_path), &value)
                    .await;
                Dispatched::Fetched
            }
            Ok(None) => {
                debug!(path = lookup_path, "data path not found");
                Dispatched::FetchMissing
            }
            Err(err) => {
                error!(%err, path = lookup_path, "fetcher failed");
                Dispatched::HandlerFailed
            }
        }
    }

    async fn command(&self, key: &str, topic: String, payload: Payload) -> Dispatched {
        let handler = self.routes.read().command(key);
        let Some(handler) = handler else {
            warn!(path = key, "unknown command");
            let notice = Value::String(format!("Unknown command \"{topic}\""));
            self.publish(&topic::error(&self.id), &notice).await;
            return Dispatched::UnknownCommand;
        };

        match run_handler(handler.handle(topic, payload)).await {
            Ok(response) => Dispatched::Command {
                responded: self.respond(response).await,
            },
            Err(err) => {
                error!(%err, path = key, "command handler failed");
                Dispatched::HandlerFailed
            }
        }
    }

    /// Publish a handler response under the adapter namespace.
    async fn respond(&self, response: Option<Response>) -> bool {
        let Some(response) = response else {
            return false;
        };
        self.publish(&topic::in_scope(&self.id, &response.path), &response.data)
            .await;
        true
    }

    /// Fire-and-forget publish; failures are logged.
    async fn publish(&self, topic: &str, value: &Value) {
        if let Err(err) = self.transport.publish(topic, payload::encode(value)).await {
            warn!(%err, topic, "failed to publish");
        }
    }
}

/// Run a handler future on its own task and wait for it.
pub(crate) async fn run_handler<O: Send + 'static>(
    future: BoxFuture<Result<O, HandlerError>>,
) -> Result<O, HandlerError> {
    match tokio::spawn(future).await {
        Ok(outcome) => outcome,
        Err(join) => Err(Box::new(join)),
    }
}
