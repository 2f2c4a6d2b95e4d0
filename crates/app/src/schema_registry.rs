//! Schema registry — declared schemas keyed by integration name.
//!
//! Seeded from the orchestrator's integration definitions and completed at
//! connect time with the schema computed from the adapter's routes. Read once
//! per connection to drive subscription.

use std::collections::HashMap;

use iotbridge_domain::error::ValidationError;
use iotbridge_domain::schema::{self, IntegrationDefinition, SchemaEntry};

/// Declared schemas keyed by integration name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Vec<SchemaEntry>>,
}

impl SchemaRegistry {
    /// Build a registry from known integration definitions.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found in any definition.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = (String, IntegrationDefinition)>,
    ) -> Result<Self, ValidationError> {
        let mut registry = Self::default();
        for (name, definition) in definitions {
            registry.declare(name, definition.schema)?;
        }
        Ok(registry)
    }

    /// Record the full schema of `integration_name`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a path is relative or duplicated
    /// within its kind; the registry is left unchanged.
    pub fn declare(
        &mut self,
        integration_name: impl Into<String>,
        entries: Vec<SchemaEntry>,
    ) -> Result<(), ValidationError> {
        schema::validate(&entries)?;
        self.schemas.insert(integration_name.into(), entries);
        Ok(())
    }

    /// The declared schema of `integration_name`.
    #[must_use]
    pub fn schema_for(&self, integration_name: &str) -> Option<&[SchemaEntry]> {
        self.schemas.get(integration_name).map(Vec::as_slice)
    }

    /// Whether a schema has been declared for `integration_name`.
    #[must_use]
    pub fn contains(&self, integration_name: &str) -> bool {
        self.schemas.contains_key(integration_name)
    }

    /// Topics adapter `id` must subscribe to under `integration_name`'s schema,
    /// in declaration order.
    #[must_use]
    pub fn subscription_topics(&self, integration_name: &str, id: &str) -> Vec<String> {
        self.schema_for(integration_name)
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| entry.subscription_topic(id))
            .collect()
    }
}
