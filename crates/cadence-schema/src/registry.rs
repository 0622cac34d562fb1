//! Central schema registry for Cadence trigger types.
//!
//! The `SchemaRegistry` builds JSON Schemas from cadence-core types at
//! construction time using [`schemars::schema_for!`] and provides validation
//! via `jsonschema`.

use std::collections::HashMap;

use cadence_core::codec::{self, WireTrigger};
use cadence_core::{TriggerDescriptor, Validator};
use schemars::schema_for;
use serde_json::Value;

use crate::error::SchemaError;

/// Named JSON Schemas for the trigger boundary types.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Value>,
}

/// Insert the schema generated for `$ty` under `$name`.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, schema_for!($ty).to_value());
    };
}

/// Name of the schema [`SchemaRegistry::decode_wire_json`] checks against.
pub const WIRE_TRIGGER: &str = "wire_trigger";

impl SchemaRegistry {
    /// Build a registry with every duration, wire, and descriptor schema.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Values ---
        register!(schemas, "duration", cadence_core::Duration);
        register!(schemas, "trigger_kind", cadence_core::TriggerKind);
        register!(
            schemas,
            "session_state_change",
            cadence_core::SessionStateChange
        );

        // --- Wire ---
        register!(schemas, WIRE_TRIGGER, WireTrigger);
        register!(schemas, "wire_repetition", codec::WireRepetition);

        // --- Canonical descriptor ---
        register!(schemas, "trigger_descriptor", TriggerDescriptor);
        register!(schemas, "trigger_payload", cadence_core::TriggerPayload);
        register!(schemas, "repetition", cadence_core::Repetition);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(schema = name, errors = errors.len(), "schema validation failed");
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Decode an untyped JSON wire trigger: check it against the
    /// `wire_trigger` schema, deserialize, then run the core decoder.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for a value of the wrong shape, `Json` if it does
    /// not deserialize, and `Trigger` for any decode or validation error.
    pub fn decode_wire_json(&self, value: &Value) -> Result<TriggerDescriptor, SchemaError> {
        self.decode_wire_json_with(value, &Validator::default())
    }

    /// [`decode_wire_json`](Self::decode_wire_json) under a specific validator.
    ///
    /// # Errors
    ///
    /// See [`decode_wire_json`](Self::decode_wire_json).
    pub fn decode_wire_json_with(
        &self,
        value: &Value,
        validator: &Validator,
    ) -> Result<TriggerDescriptor, SchemaError> {
        self.validate(WIRE_TRIGGER, value)?;
        let wire: WireTrigger = serde_json::from_value(value.clone())?;
        Ok(codec::decode_with(&wire, validator)?)
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
