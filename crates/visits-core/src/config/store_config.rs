//! Store configuration: backing file and per-user capacity.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::{ENV_MAX_VISITS, ENV_STORE_PATH};
use crate::errors::ConfigError;

/// Configuration for a `VisitStore`.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VISITS_*`, via `apply_env_overrides`)
/// 2. TOML file or string
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the persisted store image.
    pub path: String,
    /// Maximum visits kept per user. Must be at least 1.
    pub max_visits: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::DEFAULT_STORE_FILENAME.to_string(),
            max_visits: defaults::DEFAULT_MAX_VISITS,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<String>, max_visits: usize) -> Self {
        Self {
            path: path.into(),
            max_visits,
        }
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Unknown keys are ignored.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `VISITS_PATH` / `VISITS_MAX_VISITS` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup, then re-validate.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.path = path;
        }
        if let Some(raw) = lookup(ENV_MAX_VISITS) {
            self.max_visits = raw.trim().parse().map_err(|_| ConfigError::ValidationFailed {
                field: ENV_MAX_VISITS.to_string(),
                message: format!("expected a positive integer, got {raw:?}"),
            })?;
        }
        self.validate()
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "path".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.max_visits == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "max_visits".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
