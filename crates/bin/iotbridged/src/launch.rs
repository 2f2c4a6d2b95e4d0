//! Launch inputs handed over by the orchestrator.
//!
//! - `argv[1]`: `{ "id", "integrationName", "config" }` as JSON
//! - the definitions file: `{ "knownIntegrations": { name: { "name", "schema" } } }`

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use iotbridge_app::schema_registry::SchemaRegistry;
use iotbridge_domain::identity::LaunchConfig;
use iotbridge_domain::schema::IntegrationDefinition;

/// The part of the orchestrator's definitions file the runtime reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownIntegrations {
    #[serde(default)]
    pub known_integrations: HashMap<String, IntegrationDefinition>,
}

/// Parse the launch argument.
///
/// # Errors
///
/// Fails when the argument is missing or is not a launch document.
pub fn parse_launch_config(arg: Option<&str>) -> anyhow::Result<LaunchConfig> {
    let raw = arg.context("missing launch configuration argument")?;
    serde_json::from_str(raw).context("launch configuration is not a valid JSON document")
}

/// Seed a schema registry from the definitions file at `path`.
///
/// A missing file yields an empty registry.
///
/// # Errors
///
/// Fails when the file cannot be read, is not valid JSON, or declares an
/// invalid schema.
pub fn load_registry(path: &Path) -> anyhow::Result<SchemaRegistry> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no integration definitions, schema will come from routes");
            return Ok(SchemaRegistry::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let definitions: KnownIntegrations = serde_json::from_str(&content)
        .with_context(|| format!("invalid integration definitions in {}", path.display()))?;
    let count = definitions.known_integrations.len();
    let registry = SchemaRegistry::from_definitions(definitions.known_integrations)
        .with_context(|| format!("invalid schema in {}", path.display()))?;
    info!(path = %path.display(), count, "integration definitions loaded");
    Ok(registry)
}
