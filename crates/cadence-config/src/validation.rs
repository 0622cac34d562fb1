//! Validation strictness configuration.

use cadence_core::ValidationOptions;
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// The `[validation]` section.
///
/// Defaults match legacy behavior: end-before-start and sloppy duration
/// strings are accepted, keys that no trigger kind defines are not.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Reject triggers whose end date precedes their start date.
    #[serde(default)]
    pub reject_end_before_start: bool,

    /// Parse duration strings with the strict grammar instead of the
    /// lenient token scan.
    #[serde(default)]
    pub strict_durations: bool,

    /// Reject keys that belong to no trigger kind.
    #[serde(default = "default_true")]
    pub reject_unknown_fields: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reject_end_before_start: false,
            strict_durations: false,
            reject_unknown_fields: default_true(),
        }
    }
}

impl From<&ValidationConfig> for ValidationOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            reject_end_before_start: config.reject_end_before_start,
            strict_durations: config.strict_durations,
            reject_unknown_fields: config.reject_unknown_fields,
        }
    }
}
