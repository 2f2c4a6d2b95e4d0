//! Schema — the data and command paths an adapter declares.
//!
//! The schema drives which topics the runtime subscribes to on connect and is
//! persisted for discovery. Paths are relative to the adapter namespace and
//! always start with `/`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::topic;

/// Kind of a schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// State the adapter reports (optionally fetchable on demand).
    Data,
    /// An inbound command the adapter accepts.
    Command,
}

impl SchemaKind {
    /// Lowercase name as used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Command => "command",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Path relative to the adapter namespace, e.g. `/powerState`.
    pub path: String,
    /// Entry kind, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    /// Whether a data entry can be fetched through `getdata`.
    #[serde(default)]
    pub fetchable: bool,
}

impl SchemaEntry {
    /// A fetchable data entry.
    #[must_use]
    pub fn fetchable_data(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: SchemaKind::Data,
            fetchable: true,
        }
    }

    /// A command entry.
    #[must_use]
    pub fn command(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: SchemaKind::Command,
            fetchable: false,
        }
    }

    /// The topic the adapter must subscribe to for this entry, if any.
    ///
    /// Fetchable data maps to `/{id}/getdata{path}`, commands map to
    /// `/{id}{path}`; non-fetchable data is publish-only.
    #[must_use]
    pub fn subscription_topic(&self, id: &str) -> Option<String> {
        match self.kind {
            SchemaKind::Data if self.fetchable => Some(topic::getdata(id, &self.path)),
            SchemaKind::Data => None,
            SchemaKind::Command => Some(topic::in_scope(id, &self.path)),
        }
    }
}

/// Check that every path is relative and unique within its kind.
///
/// # Errors
///
/// Returns [`ValidationError::RelativePath`] or [`ValidationError::DuplicatePath`]
/// for the first offending entry.
pub fn validate(entries: &[SchemaEntry]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !entry.path.starts_with('/') {
            return Err(ValidationError::RelativePath(entry.path.clone()));
        }
        if !seen.insert((entry.kind, entry.path.as_str())) {
            return Err(ValidationError::DuplicatePath {
                path: entry.path.clone(),
                kind: entry.kind.as_str(),
            });
        }
    }
    Ok(())
}

/// Compute a schema from the paths an adapter registered handlers for.
///
/// Every fetcher becomes a fetchable data entry and every command handler a
/// command entry, data first.
#[must_use]
pub fn from_routes<'a>(
    fetch_paths: impl IntoIterator<Item = &'a str>,
    command_paths: impl IntoIterator<Item = &'a str>,
) -> Vec<SchemaEntry> {
    fetch_paths
        .into_iter()
        .map(SchemaEntry::fetchable_data)
        .chain(command_paths.into_iter().map(SchemaEntry::command))
        .collect()
}

/// Definition of a known integration, as listed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationDefinition {
    /// Human readable name.
    #[serde(default)]
    pub name: String,
    /// Declared schema.
    #[serde(default)]
    pub schema: Vec<SchemaEntry>,
}
