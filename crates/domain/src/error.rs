//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `From` when crossing a port boundary.

/// Boxed error used for failures raised by IO adapters and adapter handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Base error of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Startup input failed validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The bus transport failed (connect, subscribe, publish).
    #[error("transport error")]
    Transport(#[source] BoxError),

    /// Persisting or loading external state failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

/// Invariant violations on startup input (identity, schema).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The adapter id is empty.
    #[error("adapter id must not be empty")]
    EmptyId,

    /// The adapter id contains a character that is not allowed in a topic level.
    #[error("adapter id {id:?} contains forbidden character {character:?}")]
    ForbiddenIdCharacter {
        /// The rejected id.
        id: String,
        /// The offending character.
        character: char,
    },

    /// The integration name is empty.
    #[error("integration name must not be empty")]
    EmptyIntegrationName,

    /// A schema path does not start with `/`.
    #[error("schema path {0:?} must start with '/'")]
    RelativePath(String),

    /// The same path is declared twice for the same kind.
    #[error("schema path {path:?} is declared more than once as {kind}")]
    DuplicatePath {
        /// The duplicated path.
        path: String,
        /// The kind under which it is duplicated.
        kind: &'static str,
    },
}

/// Returned when a named item cannot be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id:?} not found")]
pub struct NotFoundError {
    /// What kind of item was looked up (e.g. `"Integration"`).
    pub entity: &'static str,
    /// Identifier of the missing item.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_forbidden_character() {
        let err = ValidationError::ForbiddenIdCharacter {
            id: "a/b".to_string(),
            character: '/',
        };
        assert_eq!(
            err.to_string(),
            "adapter id \"a/b\" contains forbidden character '/'"
        );
    }

    #[test]
    fn should_display_not_found() {
        let err = NotFoundError {
            entity: "Integration",
            id: "kasa".to_string(),
        };
        assert_eq!(err.to_string(), "Integration \"kasa\" not found");
    }

    #[test]
    fn should_convert_validation_error_into_bridge_error() {
        let err: BridgeError = ValidationError::EmptyId.into();
        assert!(matches!(err, BridgeError::Validation(ValidationError::EmptyId)));
    }

    #[test]
    fn should_keep_source_of_transport_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = BridgeError::Transport(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "refused");
    }
}
