//! Route table — the handlers an adapter registers.
//!
//! Three independent mappings:
//!
//! | Mapping | Key | Handler |
//! |---------|-----|---------|
//! | fetchers | relative path (`/powerState`) | [`Fetcher`] |
//! | command handlers | relative path (`/power/on`) | [`MessageHandler`] |
//! | listeners | full topic outside the adapter namespace | [`MessageHandler`] |
//!
//! Each key holds at most one handler; registering again replaces it.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use iotbridge_domain::error::BoxError;
use iotbridge_domain::payload::Payload;
use iotbridge_domain::response::Response;

/// Error raised by adapter handlers. Never leaves the dispatcher.
pub type HandlerError = BoxError;

/// Owned, sendable future returned by handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// What a fetcher produces: a value, or `None` for "nothing to report".
pub type FetchOutcome = Result<Option<Value>, HandlerError>;

/// What a command handler or listener produces: an optional response.
pub type HandlerOutcome = Result<Option<Response>, HandlerError>;

/// Zero-argument producer of the current value of a data path.
pub trait Fetcher: Send + Sync {
    /// Produce the current value.
    fn fetch(&self) -> BoxFuture<FetchOutcome>;
}

impl<F, Fut> Fetcher for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
{
    fn fetch(&self) -> BoxFuture<FetchOutcome> {
        Box::pin(self())
    }
}

/// Consumer of an inbound message (`topic`, decoded payload).
pub trait MessageHandler: Send + Sync {
    /// Handle the message, optionally producing a response.
    fn handle(&self, topic: String, payload: Payload) -> BoxFuture<HandlerOutcome>;
}

impl<F, Fut> MessageHandler for F
where
    F: Fn(String, Payload) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    fn handle(&self, topic: String, payload: Payload) -> BoxFuture<HandlerOutcome> {
        Box::pin(self(topic, payload))
    }
}

/// Shared fetcher.
pub type SharedFetcher = Arc<dyn Fetcher>;

/// Shared command handler or listener.
pub type SharedHandler = Arc<dyn MessageHandler>;

/// Fetchers keyed by relative path.
pub type Fetchers = HashMap<String, SharedFetcher>;

/// Command handlers keyed by relative path.
pub type CommandHandlers = HashMap<String, SharedHandler>;

/// Wrap an async closure as a [`SharedFetcher`].
pub fn fetcher<F, Fut>(f: F) -> SharedFetcher
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
{
    Arc::new(f)
}

/// Wrap an async closure as a [`SharedHandler`].
pub fn handler<F, Fut>(h: F) -> SharedHandler
where
    F: Fn(String, Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    Arc::new(h)
}

/// The three handler mappings of one adapter.
#[derive(Default)]
pub struct RouteTable {
    fetchers: Fetchers,
    commands: CommandHandlers,
    listeners: HashMap<String, SharedHandler>,
}

impl RouteTable {
    /// Replace every fetcher.
    pub fn set_fetchers(&mut self, fetchers: Fetchers) {
        self.fetchers = fetchers;
    }

    /// Replace every command handler.
    pub fn set_command_handlers(&mut self, commands: CommandHandlers) {
        self.commands = commands;
    }

    /// Register a fetcher for one path.
    pub fn insert_fetcher(&mut self, path: impl Into<String>, fetcher: SharedFetcher) {
        self.fetchers.insert(path.into(), fetcher);
    }

    /// Register a command handler for one path.
    pub fn insert_command(&mut self, path: impl Into<String>, handler: SharedHandler) {
        self.commands.insert(path.into(), handler);
    }

    /// Remove a command handler. Returns whether one was registered.
    pub fn remove_command(&mut self, path: &str) -> bool {
        self.commands.remove(path).is_some()
    }

    /// Register a listener for a full topic.
    pub fn insert_listener(&mut self, topic: impl Into<String>, handler: SharedHandler) {
        self.listeners.insert(topic.into(), handler);
    }

    /// Remove a listener. Returns whether one was registered.
    pub fn remove_listener(&mut self, topic: &str) -> bool {
        self.listeners.remove(topic).is_some()
    }

    #[must_use]
    pub fn fetcher(&self, path: &str) -> Option<SharedFetcher> {
        self.fetchers.get(path).cloned()
    }

    #[must_use]
    pub fn command(&self, path: &str) -> Option<SharedHandler> {
        self.commands.get(path).cloned()
    }

    /// The listener registered for exactly `topic`.
    #[must_use]
    pub fn listener(&self, topic: &str) -> Option<SharedHandler> {
        self.listeners.get(topic).cloned()
    }

    /// Registered fetcher paths, sorted.
    #[must_use]
    pub fn fetch_paths(&self) -> Vec<String> {
        sorted_keys(&self.fetchers)
    }

    /// Registered command paths, sorted.
    #[must_use]
    pub fn command_paths(&self) -> Vec<String> {
        sorted_keys(&self.commands)
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// A [`RouteTable`] shared between the runtime and adapter code.
///
/// Locks are only held to look handlers up, never while a handler runs.
#[derive(Clone, Default)]
pub struct SharedRoutes(Arc<RwLock<RouteTable>>);

impl SharedRoutes {
    pub fn read(&self) -> RwLockReadGuard<'_, RouteTable> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, RouteTable> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke the fetcher registered for `path`.
    ///
    /// Returns `Ok(None)` when no fetcher is registered or the fetcher
    /// produced nothing (JSON `null` counts as nothing).
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's own failure.
    pub async fn get_data(&self, path: &str) -> FetchOutcome {
        let fetcher = self.read().fetcher(path);
        let Some(fetcher) = fetcher else {
            return Ok(None);
        };
        let value = fetcher.fetch().await?;
        Ok(value.filter(|v| !v.is_null()))
    }
}
