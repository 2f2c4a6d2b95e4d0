//! Adapter identity and launch input.
//!
//! The `id` is both the transport client identifier and the root of the
//! adapter's private topic namespace, so it must be a single topic level.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Characters that cannot appear inside a single topic level.
const FORBIDDEN_ID_CHARACTERS: [char; 3] = ['/', '+', '#'];

/// Who this adapter process is. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterIdentity {
    /// Unique instance identifier.
    pub id: String,
    /// Selects the schema definition.
    pub integration_name: String,
}

impl AdapterIdentity {
    /// Build and validate an identity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if either field is invalid.
    pub fn new(
        id: impl Into<String>,
        integration_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let identity = Self {
            id: id.into(),
            integration_name: integration_name.into(),
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Check the identity invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`], [`ValidationError::ForbiddenIdCharacter`]
    /// or [`ValidationError::EmptyIntegrationName`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if let Some(character) = self
            .id
            .chars()
            .find(|c| FORBIDDEN_ID_CHARACTERS.contains(c))
        {
            return Err(ValidationError::ForbiddenIdCharacter {
                id: self.id.clone(),
                character,
            });
        }
        if self.integration_name.trim().is_empty() {
            return Err(ValidationError::EmptyIntegrationName);
        }
        Ok(())
    }
}

/// The JSON document an orchestrator hands to an adapter process on launch.
///
/// ```json
/// { "id": "desk-lamp", "integrationName": "kasa", "config": { "ip": "10.0.0.4" } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    /// Instance identifier.
    pub id: String,
    /// Integration (schema) name.
    pub integration_name: String,
    /// Free-form adapter parameters.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl LaunchConfig {
    /// Split into a validated identity and the adapter parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the identity is invalid.
    pub fn into_parts(self) -> Result<(AdapterIdentity, serde_json::Value), ValidationError> {
        let identity = AdapterIdentity::new(self.id, self.integration_name)?;
        Ok((identity, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_valid_identity() {
        let identity = AdapterIdentity::new("desk-lamp", "kasa").unwrap();
        assert_eq!(identity.id, "desk-lamp");
        assert_eq!(identity.integration_name, "kasa");
    }

    #[test]
    fn should_reject_empty_id() {
        let err = AdapterIdentity::new("  ", "kasa").unwrap_err();
        assert_eq!(err, ValidationError::EmptyId);
    }

    #[test]
    fn should_reject_id_with_topic_separator() {
        let err = AdapterIdentity::new("desk/lamp", "kasa").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ForbiddenIdCharacter { character: '/', .. }
        ));
    }

    #[test]
    fn should_reject_id_with_wildcard() {
        let err = AdapterIdentity::new("lamp#1", "kasa").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ForbiddenIdCharacter { character: '#', .. }
        ));
    }

    #[test]
    fn should_reject_empty_integration_name() {
        let err = AdapterIdentity::new("lamp", "").unwrap_err();
        assert_eq!(err, ValidationError::EmptyIntegrationName);
    }

    #[test]
    fn should_parse_launch_config_from_json() {
        let json = r#"{"id":"lamp","integrationName":"kasa","config":{"ip":"10.0.0.4"}}"#;
        let launch: LaunchConfig = serde_json::from_str(json).unwrap();
        let (identity, params) = launch.into_parts().unwrap();
        assert_eq!(identity.id, "lamp");
        assert_eq!(identity.integration_name, "kasa");
        assert_eq!(params["ip"], "10.0.0.4");
    }

    #[test]
    fn should_default_params_to_null_when_missing() {
        let json = r#"{"id":"lamp","integrationName":"kasa"}"#;
        let launch: LaunchConfig = serde_json::from_str(json).unwrap();
        assert!(launch.config.is_null());
    }
}
