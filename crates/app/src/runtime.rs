//! Runtime — lifecycle controller and adapter-facing API.
//!
//! The binary crate drives a [`Runtime`] in order:
//!
//! 1. adapter code registers routes through a [`RuntimeHandle`]
//! 2. [`Runtime::connect`] persists the computed schema and starts the session
//! 3. [`Runtime::run`] processes session events one at a time until the
//!    shutdown future resolves
//! 4. on shutdown the runtime announces itself offline, waits a short grace
//!    period so the message can leave the process, and returns the exit status
//!
//! On the first connection acknowledgement the runtime subscribes to every
//! topic the schema declares, then announces itself online. A later
//! acknowledgement (the transport reconnected on its own) re-runs the
//! subscriptions without announcing presence again.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use iotbridge_domain::error::BridgeError;
use iotbridge_domain::exit::ExitStatus;
use iotbridge_domain::identity::AdapterIdentity;
use iotbridge_domain::lifecycle::{LifecycleEvent, LifecycleState};
use iotbridge_domain::payload;
use iotbridge_domain::presence::Presence;
use iotbridge_domain::schema;
use iotbridge_domain::topic;

use crate::dispatcher::{Dispatched, Dispatcher, run_handler};
use crate::ports::{SchemaStore, SessionEvent, Transport};
use crate::presence::PresenceReporter;
use crate::route_table::{CommandHandlers, FetchOutcome, Fetchers, SharedHandler, SharedRoutes};
use crate::schema_registry::SchemaRegistry;

/// Tunables of the lifecycle controller.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Time left to the offline announcement before the session is closed.
    pub shutdown_grace: Duration,
    /// Re-run subscriptions when the transport reconnects on its own.
    pub resubscribe_on_reconnect: bool,
    /// Publish every fetcher's value once after going online.
    pub publish_initial_state: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            shutdown_grace: Duration::from_millis(100),
            resubscribe_on_reconnect: true,
            publish_initial_state: true,
        }
    }
}

/// Outcome of waiting for the next session event.
enum Next {
    Shutdown,
    Event(Option<SessionEvent>),
}

/// What adapter code uses to register handlers and publish data.
///
/// Cheap to clone; every clone shares the same route table.
#[derive(Clone)]
pub struct RuntimeHandle<T> {
    identity: Arc<AdapterIdentity>,
    params: Arc<Value>,
    transport: T,
    routes: SharedRoutes,
    /// Topics subscribed through `listen` / `add_command`, renewed on reconnect.
    dynamic_topics: Arc<Mutex<BTreeSet<String>>>,
}

impl<T: Transport> RuntimeHandle<T> {
    #[must_use]
    pub fn identity(&self) -> &AdapterIdentity {
        &self.identity
    }

    /// Free-form parameters the adapter was launched with.
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Replace every fetcher.
    pub fn set_fetchers(&self, fetchers: Fetchers) {
        self.routes.write().set_fetchers(fetchers);
    }

    /// Replace every command handler.
    pub fn set_command_handlers(&self, commands: CommandHandlers) {
        self.routes.write().set_command_handlers(commands);
    }

    /// Listen on a full topic outside the adapter namespace.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the subscription fails; the listener
    /// stays registered.
    pub async fn listen(&self, topic: &str, handler: SharedHandler) -> Result<(), BridgeError> {
        self.routes.write().insert_listener(topic, handler);
        self.track(topic.to_string());
        self.transport.subscribe(topic).await
    }

    /// Stop listening on a full topic.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the unsubscription fails.
    pub async fn unlisten(&self, topic: &str) -> Result<(), BridgeError> {
        self.routes.write().remove_listener(topic);
        self.untrack(topic);
        self.transport.unsubscribe(topic).await
    }

    /// Register a command handler and subscribe to `/{id}{path}`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the subscription fails; the handler
    /// stays registered.
    pub async fn add_command(&self, path: &str, handler: SharedHandler) -> Result<(), BridgeError> {
        self.routes.write().insert_command(path, handler);
        let topic = topic::in_scope(&self.identity.id, path);
        self.track(topic.clone());
        self.transport.subscribe(&topic).await
    }

    /// Remove a command handler and unsubscribe from `/{id}{path}`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the unsubscription fails.
    pub async fn remove_command(&self, path: &str) -> Result<(), BridgeError> {
        self.routes.write().remove_command(path);
        let topic = topic::in_scope(&self.identity.id, path);
        self.untrack(&topic);
        self.transport.unsubscribe(&topic).await
    }

    /// Current value of a data path, or `None` when nothing is registered.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's own failure.
    pub async fn get_data(&self, path: &str) -> FetchOutcome {
        self.routes.get_data(path).await
    }

    /// Publish `value` on `/{id}{path}`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the publish could not be handed over.
    pub async fn publish_data(&self, path: &str, value: impl Into<Value>) -> Result<(), BridgeError> {
        let topic = topic::in_scope(&self.identity.id, path);
        self.transport
            .publish(&topic, payload::encode(&value.into()))
            .await
    }

    fn track(&self, topic: String) {
        self.dynamic_topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic);
    }

    fn untrack(&self, topic: &str) {
        self.dynamic_topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(topic);
    }

    fn dynamic_topics(&self) -> Vec<String> {
        self.dynamic_topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// The integration runtime of one adapter process.
pub struct Runtime<T, S> {
    handle: RuntimeHandle<T>,
    registry: SchemaRegistry,
    store: S,
    options: RuntimeOptions,
    state: LifecycleState,
    dispatcher: Dispatcher<T>,
    presence: PresenceReporter<T>,
}

impl<T, S> Runtime<T, S>
where
    T: Transport + Clone + 'static,
    S: SchemaStore,
{
    /// Create a runtime. Nothing touches the bus until [`connect`](Self::connect).
    pub fn new(
        identity: AdapterIdentity,
        params: Value,
        transport: T,
        registry: SchemaRegistry,
        store: S,
        options: RuntimeOptions,
    ) -> Self {
        let routes = SharedRoutes::default();
        let dispatcher = Dispatcher::new(identity.id.clone(), transport.clone(), routes.clone());
        let presence = PresenceReporter::new(&identity.id, transport.clone());
        let handle = RuntimeHandle {
            identity: Arc::new(identity),
            params: Arc::new(params),
            transport,
            routes,
            dynamic_topics: Arc::default(),
        };
        Self {
            handle,
            registry,
            store,
            options,
            state: LifecycleState::default(),
            dispatcher,
            presence,
        }
    }

    /// A handle for adapter code.
    #[must_use]
    pub fn handle(&self) -> RuntimeHandle<T> {
        self.handle.clone()
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Finalize routes and start the bus session.
    ///
    /// Persists the schema computed from the registered routes and declares
    /// it when no schema was declared for this integration beforehand.
    /// Calling it again once started does nothing.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a registered route path is not a valid
    /// schema path, or the transport error if the session cannot start.
    pub async fn connect(&mut self) -> Result<(), BridgeError> {
        if self.state != LifecycleState::Unconnected {
            debug!(state = ?self.state, "connect already called, ignoring");
            return Ok(());
        }

        let (fetch_paths, command_paths) = {
            let routes = self.handle.routes.read();
            (routes.fetch_paths(), routes.command_paths())
        };
        let computed = schema::from_routes(
            fetch_paths.iter().map(String::as_str),
            command_paths.iter().map(String::as_str),
        );
        schema::validate(&computed)?;

        let integration_name = self.handle.identity.integration_name.clone();
        if let Err(err) = self.store.save(&integration_name, &computed).await {
            warn!(%err, integration = %integration_name, "failed to persist schema");
        }
        if !self.registry.contains(&integration_name) {
            info!(integration = %integration_name, "no declared schema, using the routes");
            self.registry.declare(integration_name, computed)?;
        }

        self.handle.transport.connect().await?;
        self.advance(LifecycleEvent::ConnectRequested);
        info!(id = %self.handle.identity.id, "connecting to bus");
        Ok(())
    }

    /// Process session events until `shutdown` resolves, then shut down.
    ///
    /// Events are handled strictly one after the other. The shutdown future
    /// is also raced against the event being handled, so a handler that never
    /// completes cannot hold back termination. If the session channel closes
    /// the runtime gives up with [`ExitStatus::Unknown`].
    pub async fn run<F>(&mut self, mut events: mpsc::Receiver<SessionEvent>, shutdown: F) -> ExitStatus
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let next = tokio::select! {
                biased;
                () = &mut shutdown => Next::Shutdown,
                event = events.recv() => Next::Event(event),
            };
            let event = match next {
                Next::Shutdown => {
                    info!("termination signal received");
                    return self.shutdown().await;
                }
                Next::Event(Some(event)) => event,
                Next::Event(None) => {
                    error!("bus session ended unexpectedly");
                    return ExitStatus::Unknown;
                }
            };

            let interrupted = tokio::select! {
                biased;
                () = &mut shutdown => true,
                _ = self.handle_event(event) => false,
            };
            if interrupted {
                warn!("termination signal received while handling an event, abandoning it");
                return self.shutdown().await;
            }
        }
    }

    /// Handle one session event. Returns how a message was dispatched, if
    /// the event was a message.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Option<Dispatched> {
        match event {
            SessionEvent::Connected => {
                self.on_connected().await;
                None
            }
            SessionEvent::Disconnected { reason } => {
                warn!(%reason, "disconnected from bus, waiting for the transport to reconnect");
                None
            }
            SessionEvent::Message(message) => {
                if self.state.is_shutting_down() {
                    debug!(topic = %message.topic, "shutting down, dropping message");
                    return None;
                }
                Some(self.dispatcher.dispatch(message).await)
            }
        }
    }

    /// Announce offline, give the message time to leave, close the session.
    ///
    /// Returns the status reserved for a clean shutdown via signal.
    pub async fn shutdown(&mut self) -> ExitStatus {
        match self.state {
            LifecycleState::Connecting | LifecycleState::Connected => {
                self.advance(LifecycleEvent::TerminationSignal);
                if let Err(err) = self.presence.announce(Presence::Offline).await {
                    warn!(%err, "failed to announce offline");
                }
                tokio::time::sleep(self.options.shutdown_grace).await;
                if let Err(err) = self.handle.transport.disconnect().await {
                    debug!(%err, "failed to close bus session");
                }
                self.advance(LifecycleEvent::Exited);
            }
            state => debug!(?state, "nothing to announce on shutdown"),
        }
        ExitStatus::ManualIntervention
    }

    async fn on_connected(&mut self) {
        match self.state {
            LifecycleState::Connecting => {
                info!("connected to bus");
                self.subscribe_schema().await;
                if let Err(err) = self.presence.announce(Presence::Online).await {
                    warn!(%err, "failed to announce online");
                }
                self.advance(LifecycleEvent::ConnectionAcknowledged);
                if self.options.publish_initial_state {
                    self.publish_initial_state().await;
                }
            }
            LifecycleState::Connected if self.options.resubscribe_on_reconnect => {
                info!("reconnected to bus, renewing subscriptions");
                self.subscribe_schema().await;
                for topic in self.handle.dynamic_topics() {
                    self.subscribe(&topic).await;
                }
            }
            LifecycleState::Connected => {
                warn!("reconnected to bus, subscriptions are not renewed");
            }
            state => debug!(?state, "ignoring connection acknowledgement"),
        }
    }

    /// Subscribe to every topic the declared schema asks for.
    async fn subscribe_schema(&self) {
        let identity = &self.handle.identity;
        let topics = self
            .registry
            .subscription_topics(&identity.integration_name, &identity.id);
        for topic in topics {
            self.subscribe(&topic).await;
        }
    }

    async fn subscribe(&self, topic: &str) {
        match self.handle.transport.subscribe(topic).await {
            Ok(()) => debug!(topic, "subscribed"),
            Err(err) => warn!(%err, topic, "failed to subscribe"),
        }
    }

    async fn publish_initial_state(&self) {
        let paths = self.handle.routes.read().fetch_paths();
        for path in paths {
            let handle = self.handle.clone();
            let lookup = path.clone();
            let fetched = run_handler(Box::pin(async move { handle.get_data(&lookup).await })).await;
            match fetched {
                Ok(Some(value)) => {
                    if let Err(err) = self.handle.publish_data(&path, value).await {
                        warn!(%err, %path, "failed to publish initial state");
                    }
                }
                Ok(None) => debug!(%path, "no initial state"),
                Err(err) => warn!(%err, %path, "fetcher failed while publishing initial state"),
            }
        }
    }

    fn advance(&mut self, event: LifecycleEvent) {
        match self.state.on(event) {
            Ok(next) => self.state = next,
            Err(err) => warn!(%err, "ignoring lifecycle event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotbridge_domain::payload::InboundMessage;
    use iotbridge_domain::response::Response;
    use iotbridge_domain::schema::{SchemaEntry, SchemaKind};
    use serde_json::json;

    use crate::route_table::{HandlerOutcome, fetcher, handler};
    use crate::testing::{InMemorySchemaStore, Op, RecordingTransport};

    type TestRuntime = Runtime<RecordingTransport, InMemorySchemaStore>;

    fn options() -> RuntimeOptions {
        RuntimeOptions {
            shutdown_grace: Duration::ZERO,
            resubscribe_on_reconnect: true,
            publish_initial_state: false,
        }
    }

    fn declared_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::default();
        registry
            .declare(
                "kasa",
                vec![
                    SchemaEntry::fetchable_data("/powerState"),
                    SchemaEntry::fetchable_data("/name"),
                    SchemaEntry {
                        path: "/lightState".to_string(),
                        kind: SchemaKind::Data,
                        fetchable: false,
                    },
                    SchemaEntry::command("/power/on"),
                    SchemaEntry::command("/power/off"),
                ],
            )
            .unwrap();
        registry
    }

    fn runtime_with(
        registry: SchemaRegistry,
        options: RuntimeOptions,
    ) -> (TestRuntime, RecordingTransport, InMemorySchemaStore) {
        let transport = RecordingTransport::default();
        let store = InMemorySchemaStore::default();
        let identity = AdapterIdentity::new("lamp", "kasa").unwrap();
        let runtime = Runtime::new(
            identity,
            json!({"ip": "10.0.0.4"}),
            transport.clone(),
            registry,
            store.clone(),
            options,
        );
        (runtime, transport, store)
    }

    fn runtime() -> (TestRuntime, RecordingTransport, InMemorySchemaStore) {
        runtime_with(declared_registry(), options())
    }

    fn register_lamp(handle: &RuntimeHandle<RecordingTransport>) {
        let mut fetchers = Fetchers::new();
        fetchers.insert(
            "/name".to_string(),
            fetcher(|| async { Ok(Some(json!("desk-light"))) }),
        );
        fetchers.insert(
            "/powerState".to_string(),
            fetcher(|| async { Ok(Some(json!("off"))) }),
        );
        handle.set_fetchers(fetchers);

        let mut commands = CommandHandlers::new();
        commands.insert(
            "/power/on".to_string(),
            handler(|_topic, _payload| async { Ok(Some(Response::new("/powerState", "on"))) }),
        );
        handle.set_command_handlers(commands);
    }

    async fn connected() -> (TestRuntime, RecordingTransport, InMemorySchemaStore) {
        let (mut runtime, transport, store) = runtime();
        register_lamp(&runtime.handle());
        runtime.connect().await.unwrap();
        runtime.handle_event(SessionEvent::Connected).await;
        (runtime, transport, store)
    }

    #[tokio::test]
    async fn should_subscribe_exactly_to_schema_topics_on_connect() {
        let (runtime, transport, _store) = connected().await;

        assert_eq!(runtime.state(), LifecycleState::Connected);
        assert_eq!(
            transport.subscriptions(),
            vec![
                "/lamp/getdata/powerState".to_string(),
                "/lamp/getdata/name".to_string(),
                "/lamp/power/on".to_string(),
                "/lamp/power/off".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn should_announce_online_after_subscribing() {
        let (_runtime, transport, _store) = connected().await;

        let ops = transport.ops();
        let online = Op::Publish(
            "/orchestrator/integration/lamp/online".to_string(),
            "true".to_string(),
        );
        assert_eq!(ops.last(), Some(&online));
        assert_eq!(ops.iter().filter(|op| **op == online).count(), 1);
    }

    #[tokio::test]
    async fn should_not_touch_bus_before_connection_acknowledged() {
        let (mut runtime, transport, _store) = runtime();
        runtime.connect().await.unwrap();

        assert_eq!(runtime.state(), LifecycleState::Connecting);
        assert_eq!(transport.ops(), vec![Op::Connect]);
    }

    #[tokio::test]
    async fn should_ignore_second_connect() {
        let (mut runtime, transport, _store) = connected().await;
        let before = transport.ops();

        runtime.connect().await.unwrap();

        assert_eq!(transport.ops(), before);
        assert_eq!(runtime.state(), LifecycleState::Connected);
    }

    #[tokio::test]
    async fn should_persist_schema_computed_from_routes() {
        let (_runtime, _transport, store) = connected().await;

        assert_eq!(
            store.get("kasa").unwrap(),
            vec![
                SchemaEntry::fetchable_data("/name"),
                SchemaEntry::fetchable_data("/powerState"),
                SchemaEntry::command("/power/on"),
            ]
        );
    }

    #[tokio::test]
    async fn should_declare_route_schema_when_none_was_declared() {
        let (mut runtime, transport, _store) = runtime_with(SchemaRegistry::default(), options());
        register_lamp(&runtime.handle());

        runtime.connect().await.unwrap();
        runtime.handle_event(SessionEvent::Connected).await;

        assert!(runtime.registry().contains("kasa"));
        assert_eq!(
            transport.subscriptions(),
            vec![
                "/lamp/getdata/name".to_string(),
                "/lamp/getdata/powerState".to_string(),
                "/lamp/power/on".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn should_reject_route_without_leading_slash() {
        let (mut runtime, transport, _store) = runtime();
        let mut fetchers = Fetchers::new();
        fetchers.insert("name".to_string(), fetcher(|| async { Ok(None) }));
        runtime.handle().set_fetchers(fetchers);

        let result = runtime.connect().await;

        assert!(matches!(result, Err(BridgeError::Validation(_))));
        assert!(transport.ops().is_empty());
        assert_eq!(runtime.state(), LifecycleState::Unconnected);
    }

    #[tokio::test]
    async fn should_continue_schema_walk_when_a_subscription_fails() {
        let (mut runtime, transport, _store) = runtime();
        transport.fail_subscription("/lamp/getdata/name");

        runtime.connect().await.unwrap();
        runtime.handle_event(SessionEvent::Connected).await;

        assert_eq!(transport.subscriptions().len(), 4);
        assert_eq!(runtime.state(), LifecycleState::Connected);
    }

    #[tokio::test]
    async fn should_publish_initial_state_when_enabled() {
        let mut opts = options();
        opts.publish_initial_state = true;
        let (mut runtime, transport, _store) = runtime_with(declared_registry(), opts);
        register_lamp(&runtime.handle());

        runtime.connect().await.unwrap();
        runtime.handle_event(SessionEvent::Connected).await;

        let published = transport.published();
        assert!(published.contains(&("/lamp/name".to_string(), "desk-light".to_string())));
        assert!(published.contains(&("/lamp/powerState".to_string(), "off".to_string())));
    }

    #[tokio::test]
    async fn should_renew_subscriptions_on_reconnect_without_presence() {
        let (mut runtime, transport, _store) = connected().await;
        runtime
            .handle()
            .listen(
                "/other/powerState",
                handler(|_topic, _payload| async { Ok(None) }),
            )
            .await
            .unwrap();
        transport.clear();

        runtime
            .handle_event(SessionEvent::Disconnected {
                reason: "broker restarted".to_string(),
            })
            .await;
        runtime.handle_event(SessionEvent::Connected).await;

        let subscriptions = transport.subscriptions();
        assert_eq!(subscriptions.len(), 5);
        assert!(subscriptions.contains(&"/other/powerState".to_string()));
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn should_not_renew_subscriptions_when_disabled() {
        let mut opts = options();
        opts.resubscribe_on_reconnect = false;
        let (mut runtime, transport, _store) = runtime_with(declared_registry(), opts);
        runtime.connect().await.unwrap();
        runtime.handle_event(SessionEvent::Connected).await;
        transport.clear();

        runtime.handle_event(SessionEvent::Connected).await;

        assert!(transport.ops().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_messages_once_connected() {
        let (mut runtime, transport, _store) = connected().await;
        transport.clear();

        let outcome = runtime
            .handle_event(SessionEvent::Message(InboundMessage::new(
                "/lamp/getdata/name",
                "",
            )))
            .await;

        assert_eq!(outcome, Some(Dispatched::Fetched));
        assert_eq!(
            transport.published(),
            vec![("/lamp/name".to_string(), "desk-light".to_string())]
        );
    }

    #[tokio::test]
    async fn should_announce_offline_on_shutdown() {
        let (mut runtime, transport, _store) = connected().await;
        transport.clear();

        let status = runtime.shutdown().await;

        assert_eq!(status, ExitStatus::ManualIntervention);
        assert_eq!(runtime.state(), LifecycleState::Terminated);
        assert_eq!(
            transport.ops(),
            vec![
                Op::Publish(
                    "/orchestrator/integration/lamp/online".to_string(),
                    "false".to_string()
                ),
                Op::Disconnect,
            ]
        );
    }

    #[tokio::test]
    async fn should_drop_messages_after_shutdown() {
        let (mut runtime, transport, _store) = connected().await;
        runtime.shutdown().await;
        transport.clear();

        let outcome = runtime
            .handle_event(SessionEvent::Message(InboundMessage::new(
                "/lamp/power/on",
                "",
            )))
            .await;

        assert_eq!(outcome, None);
        assert!(transport.ops().is_empty());
    }

    #[tokio::test]
    async fn should_run_until_shutdown_signal() {
        let (mut runtime, transport, _store) = runtime();
        register_lamp(&runtime.handle());
        runtime.connect().await.unwrap();

        let (events_tx, events_rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        events_tx.send(SessionEvent::Connected).await.unwrap();
        events_tx
            .send(SessionEvent::Message(InboundMessage::new(
                "/lamp/power/on",
                "",
            )))
            .await
            .unwrap();

        let task = tokio::spawn(async move {
            let status = runtime
                .run(events_rx, async {
                    let _ = stop_rx.await;
                })
                .await;
            (status, runtime.state())
        });

        // let the runtime drain both events before signalling
        while !transport
            .published()
            .contains(&("/lamp/powerState".to_string(), "on".to_string()))
        {
            tokio::task::yield_now().await;
        }
        stop_tx.send(()).unwrap();

        let (status, state) = task.await.unwrap();
        assert_eq!(status, ExitStatus::ManualIntervention);
        assert_eq!(state, LifecycleState::Terminated);
        assert_eq!(
            transport.published().last(),
            Some(&(
                "/orchestrator/integration/lamp/online".to_string(),
                "false".to_string()
            ))
        );
        drop(events_tx);
    }

    #[tokio::test]
    async fn should_shut_down_while_a_handler_never_completes() {
        let (mut runtime, transport, _store) = runtime();
        register_lamp(&runtime.handle());
        runtime
            .handle()
            .add_command(
                "/hang",
                handler(|_topic, _payload| std::future::pending::<HandlerOutcome>()),
            )
            .await
            .unwrap();
        runtime.connect().await.unwrap();

        let (events_tx, events_rx) = mpsc::channel(8);
        events_tx.send(SessionEvent::Connected).await.unwrap();
        events_tx
            .send(SessionEvent::Message(InboundMessage::new("/lamp/hang", "")))
            .await
            .unwrap();

        let status = tokio::time::timeout(
            Duration::from_secs(2),
            runtime.run(events_rx, tokio::time::sleep(Duration::from_millis(50))),
        )
        .await
        .expect("run should return once the shutdown signal fires");

        assert_eq!(status, ExitStatus::ManualIntervention);
        assert_eq!(runtime.state(), LifecycleState::Terminated);
        assert_eq!(
            transport.published().last(),
            Some(&(
                "/orchestrator/integration/lamp/online".to_string(),
                "false".to_string()
            ))
        );
        drop(events_tx);
    }

    #[tokio::test]
    async fn should_fetch_data_through_handle() {
        let (runtime, _transport, _store) = runtime();
        let handle = runtime.handle();
        register_lamp(&handle);

        assert_eq!(handle.get_data("/name").await.unwrap(), Some(json!("desk-light")));
        assert_eq!(handle.get_data("/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_give_up_when_session_channel_closes() {
        let (mut runtime, _transport, _store) = runtime();
        runtime.connect().await.unwrap();
        let (events_tx, events_rx) = mpsc::channel(1);
        drop(events_tx);

        let status = runtime.run(events_rx, std::future::pending()).await;

        assert_eq!(status, ExitStatus::Unknown);
    }

    #[tokio::test]
    async fn should_subscribe_when_listening() {
        let (runtime, transport, _store) = runtime();
        let handle = runtime.handle();

        handle
            .listen(
                "/other/powerState",
                handler(|_topic, _payload| async { Ok(None) }),
            )
            .await
            .unwrap();
        handle.unlisten("/other/powerState").await.unwrap();

        assert_eq!(
            transport.ops(),
            vec![
                Op::Subscribe("/other/powerState".to_string()),
                Op::Unsubscribe("/other/powerState".to_string()),
            ]
        );
        assert!(handle.dynamic_topics().is_empty());
    }

    #[tokio::test]
    async fn should_subscribe_in_namespace_when_adding_command() {
        let (runtime, transport, _store) = runtime();
        let handle = runtime.handle();

        handle
            .add_command("/restart", handler(|_topic, _payload| async { Ok(None) }))
            .await
            .unwrap();
        assert!(handle.routes.read().command("/restart").is_some());

        handle.remove_command("/restart").await.unwrap();
        assert!(handle.routes.read().command("/restart").is_none());

        assert_eq!(
            transport.ops(),
            vec![
                Op::Subscribe("/lamp/restart".to_string()),
                Op::Unsubscribe("/lamp/restart".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn should_publish_data_with_serialization_rule() {
        let (runtime, transport, _store) = runtime();
        let handle = runtime.handle();

        handle.publish_data("/powerState", "on").await.unwrap();
        handle
            .publish_data("/lightState", json!({"brightness": 40}))
            .await
            .unwrap();

        assert_eq!(
            transport.published(),
            vec![
                ("/lamp/powerState".to_string(), "on".to_string()),
                (
                    "/lamp/lightState".to_string(),
                    r#"{"brightness":40}"#.to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn should_expose_identity_and_params() {
        let (runtime, _transport, _store) = runtime();
        let handle = runtime.handle();
        assert_eq!(handle.identity().id, "lamp");
        assert_eq!(handle.params()["ip"], "10.0.0.4");
    }
}
