//! # Gate Configuration
//!
//! Settings that locate the marker store and name the keys inside it.
//!
//! All fields are optional in TOML; missing fields take their defaults:
//!
//! ```toml
//! namespace = "migration"
//! store_path = "waymark.redb"
//! version_var = "WAYMARK_APP_VERSION"
//! build_var = "WAYMARK_APP_BUILD"
//! ```

use crate::identity::EnvIdentity;
use crate::{GateError, primitives};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for a [`MigrationGate`](crate::MigrationGate).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Prefix for every marker key. Lets several gates share one store.
    pub namespace: String,
    /// redb database file used by [`MigrationGate::open`](crate::MigrationGate::open).
    pub store_path: PathBuf,
    /// Environment variable holding the app version, for [`EnvIdentity`].
    pub version_var: String,
    /// Environment variable holding the build number, for [`EnvIdentity`].
    pub build_var: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            namespace: primitives::DEFAULT_NAMESPACE.to_string(),
            store_path: PathBuf::from(primitives::DEFAULT_STORE_FILE),
            version_var: primitives::DEFAULT_VERSION_VAR.to_string(),
            build_var: primitives::DEFAULT_BUILD_VAR.to_string(),
        }
    }
}

impl GateConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, GateError> {
        let config: Self =
            toml::from_str(text).map_err(|e| GateError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GateError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), namespace = %config.namespace, "loaded gate config");
        Ok(config)
    }

    /// Builder-style namespace override.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Builder-style store path override.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Check invariants that serde cannot express.
    ///
    /// The namespace must be non-empty and must not contain the key separator,
    /// otherwise two namespaces could produce colliding keys.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.namespace.trim().is_empty() {
            return Err(GateError::ConfigError(
                "namespace must not be empty".to_string(),
            ));
        }
        if self.namespace.contains(primitives::KEY_SEPARATOR) {
            return Err(GateError::ConfigError(format!(
                "namespace '{}' must not contain '{}'",
                self.namespace,
                primitives::KEY_SEPARATOR
            )));
        }
        Ok(())
    }

    /// Identity that reads the configured environment variables.
    #[must_use]
    pub fn env_identity(&self) -> EnvIdentity {
        EnvIdentity::new(self.version_var.clone(), self.build_var.clone())
    }
}
