//! Schema validation error types.

use cadence_core::TriggerError;
use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },

    /// Schema compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),

    /// A schema-valid value could not be deserialized.
    #[error("Deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The wire trigger was well-formed JSON but not a valid trigger.
    #[error(transparent)]
    Trigger(#[from] TriggerError),
}
