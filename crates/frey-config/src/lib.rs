//! # Frey Configuration
//!
//! File-backed configuration for the frey resolver client.
//!
//! Files may be YAML, JSON or TOML, chosen by extension. Every section is
//! optional and falls back to defaults:
//!
//! ```yaml
//! resolver:
//!   servers: ["9.9.9.9", "[2620:fe::fe]:53"]
//!   timeout_ms: 3000
//! cache:
//!   capacity: 256
//! logging:
//!   level: debug
//!   format: json
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod resolver;

pub use frey_cache::CacheConfig;
pub use resolver::ResolverConfig;

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Servers and transport settings.
    pub resolver: ResolverConfig,

    /// Response cache.
    pub cache: CacheConfig,

    /// Logging.
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?, // yaml, yml, or anything else
        };

        Ok(config)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.resolver.validate()?;

        if self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        self.logging.validate()?;

        Ok(())
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Builds the resolver settings, validating first.
    pub fn into_resolver_config(self) -> Result<frey_resolver::ResolverConfig> {
        self.validate()?;
        let config = frey_resolver::ResolverConfig {
            servers: self.resolver.server_addrs()?,
            timeout_ms: self.resolver.timeout_ms,
            udp_payload_size: self.resolver.udp_payload_size,
            receive_buffer_size: self.resolver.receive_buffer_size,
            cache_capacity: self.cache.capacity,
            use_tcp_fallback: self.resolver.tcp_fallback,
        };
        config
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(config)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,

    /// `text` or `json`.
    pub format: String,

    /// Log span open and close events.
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            span_events: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        self.to_log_config().map(|_| ())
    }

    /// Converts to the subscriber settings.
    pub fn to_log_config(&self) -> Result<frey_metrics::tracing_setup::LogConfig> {
        let level = self
            .level
            .parse::<tracing::Level>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                message: e.to_string(),
            })?;
        let format = self.format.parse().map_err(
            |e: frey_metrics::tracing_setup::UnknownLogFormat| ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                message: e.to_string(),
            },
        )?;

        Ok(frey_metrics::tracing_setup::LogConfig {
            level,
            format,
            span_events: self.span_events,
        })
    }
}
