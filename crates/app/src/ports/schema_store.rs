//! Schema store port — persistence of the computed schema for discovery.

use std::future::Future;

use iotbridge_domain::error::BridgeError;
use iotbridge_domain::schema::SchemaEntry;

/// Keeps the schema an integration ended up exposing, keyed by integration name.
pub trait SchemaStore: Send + Sync {
    /// Persist the schema of `integration_name`, replacing any previous one.
    fn save(
        &self,
        integration_name: &str,
        entries: &[SchemaEntry],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
