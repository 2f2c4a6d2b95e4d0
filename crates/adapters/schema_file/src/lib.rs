//! # iotbridge-adapter-schema-file
//!
//! Filesystem implementation of the [`SchemaStore`] port.
//!
//! Each integration's schema lives in `{dir}/{integration_name}.json` as a
//! pretty-printed array of `{ "path", "type", "fetchable" }` entries, which
//! is what discovery tooling reads. The directory is created on first save.

mod error;

use std::path::{Path, PathBuf};

use iotbridge_app::ports::SchemaStore;
use iotbridge_domain::error::BridgeError;
use iotbridge_domain::schema::SchemaEntry;

pub use error::SchemaFileError;

/// Stores schemas as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileSchemaStore {
    dir: PathBuf,
}

impl FileSchemaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the schema of `integration_name`.
    #[must_use]
    pub fn path_for(&self, integration_name: &str) -> PathBuf {
        self.dir.join(format!("{integration_name}.json"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SchemaStore for FileSchemaStore {
    #[tracing::instrument(skip(self, entries), fields(entries = entries.len()))]
    async fn save(&self, integration_name: &str, entries: &[SchemaEntry]) -> Result<(), BridgeError> {
        let path = self.path_for(integration_name);
        let json = serde_json::to_string_pretty(entries).map_err(|source| SchemaFileError::Json {
            path: path.clone(),
            source,
        })?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SchemaFileError::Io {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| SchemaFileError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "schema written");
        Ok(())
    }
}
