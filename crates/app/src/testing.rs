//! In-memory doubles for the ports, shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use iotbridge_domain::error::BridgeError;
use iotbridge_domain::schema::SchemaEntry;

use crate::ports::{SchemaStore, Transport};

/// One call made on a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Connect,
    Subscribe(String),
    Unsubscribe(String),
    Publish(String, String),
    Disconnect,
}

/// Transport that records every call and can be told to fail subscriptions.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    ops: Arc<Mutex<Vec<Op>>>,
    failing_subscriptions: Arc<Mutex<HashSet<String>>>,
}

impl RecordingTransport {
    pub fn fail_subscription(&self, topic: &str) {
        self.failing_subscriptions
            .lock()
            .unwrap()
            .insert(topic.to_string());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Subscribe(topic) => Some(topic),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Publish(topic, payload) => Some((topic, payload)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

impl Transport for RecordingTransport {
    async fn connect(&self) -> Result<(), BridgeError> {
        self.record(Op::Connect);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.record(Op::Subscribe(topic.to_string()));
        if self.failing_subscriptions.lock().unwrap().contains(topic) {
            return Err(BridgeError::Transport("subscription refused".into()));
        }
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.record(Op::Unsubscribe(topic.to_string()));
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: String) -> Result<(), BridgeError> {
        self.record(Op::Publish(topic.to_string(), payload));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BridgeError> {
        self.record(Op::Disconnect);
        Ok(())
    }
}

/// Schema store backed by a map.
#[derive(Clone, Default)]
pub struct InMemorySchemaStore {
    store: Arc<Mutex<HashMap<String, Vec<SchemaEntry>>>>,
}

impl InMemorySchemaStore {
    pub fn get(&self, integration_name: &str) -> Option<Vec<SchemaEntry>> {
        self.store.lock().unwrap().get(integration_name).cloned()
    }
}

impl SchemaStore for InMemorySchemaStore {
    async fn save(&self, integration_name: &str, entries: &[SchemaEntry]) -> Result<(), BridgeError> {
        self.store
            .lock()
            .unwrap()
            .insert(integration_name.to_string(), entries.to_vec());
        Ok(())
    }
}
