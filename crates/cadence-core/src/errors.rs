//! Error types for duration parsing and trigger validation.
//!
//! Every variant reflects a caller or data error, never an environment
//! failure, so nothing here is retryable. Field-carrying variants name the
//! raw key (e.g. `start_day`, `days_of_week`) so a caller can fix a single
//! field without rebuilding the whole descriptor.

use thiserror::Error;

/// Errors raised while classifying, validating, or decoding a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// The trigger kind is absent or not one of the known kinds.
    #[error("Unknown trigger kind: {0}")]
    UnknownTriggerKind(String),

    /// A field required by the classified kind is absent.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A required bit-set field is absent or has no bits set. `kind` is the
    /// label of the classified kind.
    #[error("Bit-set field '{field}' has no bits set, required for {kind} triggers")]
    EmptyBitSet { field: String, kind: &'static str },

    /// A field that belongs to a different trigger kind was supplied.
    #[error("Field '{field}' is not valid for {kind} triggers")]
    UnexpectedField { field: String, kind: &'static str },

    /// A field that belongs to no trigger kind at all was supplied.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A start/end boundary string did not match `YYYY-MM-DDTHH:MM[:SS]`.
    #[error("Malformed boundary: {0:?}")]
    MalformedBoundary(String),

    /// A field is present but its value has the wrong type or is out of range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// The end boundary falls before the start boundary.
    #[error("End boundary {end} is before start boundary {start}")]
    EndBeforeStart { start: String, end: String },

    /// A duration string failed strict parsing.
    #[error("Malformed duration in '{field}': {source}")]
    MalformedDuration {
        field: String,
        #[source]
        source: DurationError,
    },
}

impl TriggerError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors from [`Duration::parse_strict`](crate::duration::Duration::parse_strict).
///
/// The lenient [`Duration::parse`](crate::duration::Duration::parse) never
/// produces these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration {0:?} does not start with 'P'")]
    MissingDesignator(String),

    #[error("duration {0:?} has no components")]
    Empty(String),

    #[error("duration {text:?} has unrecognized text at byte {position}")]
    Unrecognized { text: String, position: usize },

    #[error("duration {text:?} repeats unit '{unit}'")]
    DuplicateUnit { text: String, unit: char },

    #[error("duration {text:?} has unit '{unit}' out of order")]
    OutOfOrder { text: String, unit: char },

    #[error("duration {text:?} has a component that overflows")]
    Overflow { text: String },
}
