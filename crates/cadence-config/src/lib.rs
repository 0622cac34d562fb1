//! # cadence-config
//!
//! Validator settings for Cadence, read from layered sources. Later layers
//! win:
//!
//! | layer | source |
//! |---|---|
//! | defaults | [`CadenceConfig::default`] |
//! | user | `<config dir>/cadence/config.toml` |
//! | project | `.cadence/config.toml` under the working directory |
//! | environment | `CADENCE_SECTION__KEY`, e.g. `CADENCE_VALIDATION__STRICT_DURATIONS=true` |
//!
//! ```no_run
//! use cadence_config::CadenceConfig;
//!
//! let validator = CadenceConfig::load_with_dotenv()?.validator();
//! # Ok::<(), cadence_config::ConfigError>(())
//! ```

mod error;
mod validation;

pub use error::ConfigError;
pub use validation::ValidationConfig;

use std::path::{Path, PathBuf};

use cadence_core::{ValidationOptions, Validator};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

const PROJECT_FILE: &str = ".cadence/config.toml";
const ENV_PREFIX: &str = "CADENCE_";

/// How many directories above `CARGO_MANIFEST_DIR` may hold a `.env`.
const DOTENV_DEPTH: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CadenceConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl CadenceConfig {
    /// Extract the merged configuration. The process environment is read
    /// as-is; see [`load_with_dotenv`](Self::load_with_dotenv) for `.env`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Figment` for an unreadable file or a mistyped value.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Like [`load`](Self::load), after exporting the nearest `.env`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        export_dotenv();
        Self::load()
    }

    /// The layered provider, exposed so callers and tests can merge more.
    #[must_use]
    pub fn figment() -> Figment {
        let files = [user_file(), Some(PathBuf::from(PROJECT_FILE))];
        files
            .into_iter()
            .flatten()
            .filter(|path| path.is_file())
            .fold(
                Figment::from(Serialized::defaults(Self::default())),
                |figment, path| figment.merge(Toml::file(path)),
            )
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    #[must_use]
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::from(&self.validation)
    }

    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::new(self.validation_options())
    }
}

fn user_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cadence").join("config.toml"))
}

/// A `.env` beside the crate manifest or a few levels up, else whatever
/// `dotenvy` finds from the working directory. A missing file is not an error.
fn export_dotenv() {
    let near_manifest = std::env::var_os("CARGO_MANIFEST_DIR").and_then(|dir| {
        Path::new(&dir)
            .ancestors()
            .take(DOTENV_DEPTH)
            .map(|dir| dir.join(".env"))
            .find(|path| path.is_file())
    });
    let result = match near_manifest {
        Some(path) => dotenvy::from_path(&path).map(|()| path),
        None => dotenvy::dotenv(),
    };
    match result {
        Ok(path) => tracing::debug!(path = %path.display(), "exported .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "could not read .env"),
    }
}
