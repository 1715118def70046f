//! Gateway configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Tunables for criteria building and association planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deepest selection nesting the association planner will walk (default: 32)
    pub max_selection_depth: usize,
    /// Reject undecodable cursors instead of treating them as row 0 (default: false)
    pub strict_cursors: bool,
    /// Reject duplicate sibling aggregation names instead of overwriting (default: false)
    pub unique_aggregation_names: bool,
    /// Clip a backward page that starts before row 1 (default: true).
    /// When disabled the negative offset reaches the store unchanged and
    /// connection cursors are still numbered from row 1.
    pub clamp_negative_offset: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_selection_depth: 32,
            strict_cursors: false,
            unique_aggregation_names: false,
            clamp_negative_offset: true,
        }
    }
}

impl GatewayConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Applies environment variable overrides.
    /// Environment variables are prefixed with `EGQL_`.
    /// Example: `EGQL_STRICT_CURSORS=true` overrides `strict_cursors`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = env::var("EGQL_MAX_SELECTION_DEPTH") {
            self.max_selection_depth = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "max_selection_depth",
                value: val.clone(),
            })?;
        }
        if let Ok(val) = env::var("EGQL_STRICT_CURSORS") {
            self.strict_cursors = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "strict_cursors",
                value: val.clone(),
            })?;
        }
        if let Ok(val) = env::var("EGQL_UNIQUE_AGGREGATION_NAMES") {
            self.unique_aggregation_names =
                val.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "unique_aggregation_names",
                    value: val.clone(),
                })?;
        }
        if let Ok(val) = env::var("EGQL_CLAMP_NEGATIVE_OFFSET") {
            self.clamp_negative_offset = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "clamp_negative_offset",
                value: val.clone(),
            })?;
        }
        Ok(())
    }
}
