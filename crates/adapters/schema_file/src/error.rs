//! Schema file error type.

use std::path::PathBuf;

use iotbridge_domain::error::BridgeError;

/// Errors raised while writing schema files.
#[derive(Debug, thiserror::Error)]
pub enum SchemaFileError {
    /// Creating the directory or writing the file failed.
    #[error("unable to access schema file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema could not be encoded.
    #[error("unable to encode schema file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<SchemaFileError> for BridgeError {
    fn from(err: SchemaFileError) -> Self {
        Self::Storage(Box::new(err))
    }
}
