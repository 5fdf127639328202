//! Configuration
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "logging": { "enabled": true, "level": "info" },
//!   "store": { "sample_seed": 42 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration JSON
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed but unusable value
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum level: trace, info, warn, error (default: warn)
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_level(),
        }
    }
}

impl LoggingConfig {
    /// Parsed minimum severity
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.level.parse().map_err(ConfigError::Invalid)
    }
}

/// Memory backend configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Seed for `$sample` draws; unset means entropy-seeded
    #[serde(default)]
    pub sample_seed: Option<u64>,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;

        let path_str = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", path_str.as_str())]);
        Ok(config)
    }

    /// Parse and validate configuration JSON
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        self.logging.severity().map(|_| ())
    }

    /// Install the logging settings process-wide
    pub fn apply_logging(&self) -> ConfigResult<()> {
        let severity = self.logging.severity()?;
        Logger::configure(self.logging.enabled, severity);
        Ok(())
    }
}
