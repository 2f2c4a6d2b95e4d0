//! Bus session over rumqttc.
//!
//! [`MqttSession`] owns the rumqttc client. The event loop is parked until
//! [`Transport::connect`] is called, then driven by a background task that
//! keeps reconnecting on a fixed interval and forwards what it sees as
//! [`SessionEvent`]s.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, Publish, QoS};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use iotbridge_app::ports::{SessionEvent, Transport};
use iotbridge_domain::error::BridgeError;
use iotbridge_domain::payload::InboundMessage;

use crate::config::MqttConfig;
use crate::error::MqttError;

/// One always-reconnecting MQTT session.
pub struct MqttSession {
    client: AsyncClient,
    eventloop: Mutex<Option<EventLoop>>,
    events: mpsc::Sender<SessionEvent>,
    reconnect_interval: Duration,
}

impl MqttSession {
    /// Build the session and the receiving end of its event channel.
    ///
    /// Nothing is sent to the broker before [`Transport::connect`];
    /// requests issued earlier are queued.
    #[must_use]
    pub fn new(config: &MqttConfig, client_id: &str) -> (Self, mpsc::Receiver<SessionEvent>) {
        let capacity = config.channel_capacity.max(1);
        let (client, eventloop) = AsyncClient::new(mqtt_options(config, client_id), capacity);
        let (events, receiver) = mpsc::channel(capacity);
        let session = Self {
            client,
            eventloop: Mutex::new(Some(eventloop)),
            events,
            reconnect_interval: config.reconnect_interval(),
        };
        (session, receiver)
    }

    fn take_eventloop(&self) -> Option<EventLoop> {
        self.eventloop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Transport for MqttSession {
    async fn connect(&self) -> Result<(), BridgeError> {
        let Some(eventloop) = self.take_eventloop() else {
            debug!("session already started");
            return Ok(());
        };
        tokio::spawn(drive(
            eventloop,
            self.events.clone(),
            self.reconnect_interval,
        ));
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(MqttError::from)?;
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.client
            .unsubscribe(topic)
            .await
            .map_err(MqttError::from)?;
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: String) -> Result<(), BridgeError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(MqttError::from)?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BridgeError> {
        self.client.disconnect().await.map_err(MqttError::from)?;
        Ok(())
    }
}

fn mqtt_options(config: &MqttConfig, client_id: &str) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, config.broker_host.clone(), config.broker_port);
    options.set_keep_alive(config.keep_alive());
    options.set_clean_session(config.clean_session);
    options
}

/// Poll the event loop until the runtime drops its receiver.
async fn drive(mut eventloop: EventLoop, events: mpsc::Sender<SessionEvent>, retry: Duration) {
    loop {
        let event = match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!(code = ?ack.code, "broker acknowledged connection");
                SessionEvent::Connected
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                SessionEvent::Message(inbound_message(&publish))
            }
            Ok(_) => continue,
            Err(err) => {
                let err = MqttError::Connection(err);
                let reason = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string);
                warn!(%reason, retry_ms = retry.as_millis(), "broker connection failed");
                if events.send(SessionEvent::Disconnected { reason }).await.is_err() {
                    break;
                }
                tokio::time::sleep(retry).await;
                continue;
            }
        };
        if events.send(event).await.is_err() {
            break;
        }
    }
    debug!("session receiver dropped, event loop stopped");
}

fn inbound_message(publish: &Publish) -> InboundMessage {
    let topic = String::from_utf8_lossy(AsRef::<[u8]>::as_ref(&publish.topic)).into_owned();
    InboundMessage::new(topic, publish.payload.to_vec())
}
