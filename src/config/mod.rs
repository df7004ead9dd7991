//! Hook configuration.
//!
//! Mirrors the hook's `config.yaml` layout. Parsing of configuration text is
//! done with serde; locating and reading the file is left to the host.

use crate::core::{Error, Result};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};

/// Field names redacted when no configuration overrides them.
pub const DEFAULT_SENSITIVE_FIELDS: &[&str] = &["password", "api_key", "token", "secret"];

/// Default number of recent records kept by the stats accumulator.
pub const DEFAULT_RETENTION: usize = 1000;

/// Top-level hook configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HookConfig {
    /// Redaction settings
    #[serde(default = "SecurityConfig::absent")]
    pub security: SecurityConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HookConfig {
    /// Create a config with an explicit sensitive field list.
    pub fn with_sensitive_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            security: SecurityConfig {
                sensitive_fields: Some(fields.into_iter().map(Into::into).collect()),
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Parse configuration from JSON text.
    ///
    /// A missing `security` section parses successfully and leaves redaction
    /// disabled; it is reported when the hook is constructed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Redaction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Parameter names whose values are never logged in plaintext.
    ///
    /// `None` means the set was not configured at all.
    #[serde(default)]
    pub sensitive_fields: Option<Vec<String>>,
}

impl SecurityConfig {
    /// A security section with no sensitive field set.
    pub fn absent() -> Self {
        Self {
            sensitive_fields: None,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sensitive_fields: Some(
                DEFAULT_SENSITIVE_FIELDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level for the tracing subscriber
    #[serde(default = "LoggingConfig::default_level")]
    pub level: LogLevel,
    /// Recent records kept in memory for inspection
    #[serde(default = "LoggingConfig::default_retention")]
    pub retention: usize,
}

impl LoggingConfig {
    fn default_level() -> LogLevel {
        LogLevel::Info
    }

    fn default_retention() -> usize {
        DEFAULT_RETENTION
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            retention: Self::default_retention(),
        }
    }
}
