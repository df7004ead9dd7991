//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Log level.
///
/// Written upper-case (`"INFO"`) in configuration; the capitalized variant
/// names are accepted as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Trace level (most verbose)
    #[serde(alias = "Trace")]
    Trace = 0,
    /// Debug level
    #[serde(alias = "Debug")]
    Debug = 1,
    /// Info level
    #[serde(alias = "Info")]
    Info = 2,
    /// Warning level
    #[serde(alias = "Warn", alias = "WARNING")]
    Warn = 3,
    /// Error level
    #[serde(alias = "Error")]
    Error = 4,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Install a global fmt subscriber at the configured level.
///
/// Returns `false` when a global subscriber was already installed, which
/// leaves the existing one in place.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let level: tracing::Level = config.level.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok()
}
