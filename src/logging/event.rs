//! Manually logged events.
//!
//! Events carry caller-supplied metadata verbatim. Unlike API parameters the
//! metadata is not sanitized, so callers must not put secrets in it.

use crate::core::{iso_millis, now, Error, Result, Timestamp};
use crate::monitoring::alerts::{Alert, AlertSeverity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;

/// Event severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl EventSeverity {
    /// Lower-case tag as written to logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSeverity::Info => "info",
            EventSeverity::Warning => "warning",
            EventSeverity::Error => "error",
            EventSeverity::Critical => "critical",
        }
    }

    /// Severity of the alert raised for this event, if any.
    ///
    /// Only `error` and `critical` events raise alerts.
    pub fn alert_severity(&self) -> Option<AlertSeverity> {
        match self {
            EventSeverity::Error => Some(AlertSeverity::Error),
            EventSeverity::Critical => Some(AlertSeverity::Critical),
            EventSeverity::Info | EventSeverity::Warning => None,
        }
    }
}

impl std::fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSeverity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(EventSeverity::Info),
            "warning" => Ok(EventSeverity::Warning),
            "error" => Ok(EventSeverity::Error),
            "critical" => Ok(EventSeverity::Critical),
            other => Err(Error::InvalidSeverity(other.to_string())),
        }
    }
}

/// A manually logged event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// When the event was logged
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
    /// Event category (security, performance, audit, ...)
    pub event_type: String,
    /// Severity
    pub severity: EventSeverity,
    /// Message
    pub message: String,
    /// Extra metadata, stored as given
    pub metadata: Value,
}

/// Stamps events and derives their alerts.
#[derive(Clone, Debug, Default)]
pub struct EventLogger;

impl EventLogger {
    /// Create an event logger.
    pub fn new() -> Self {
        Self
    }

    /// Build an event and, for `error`/`critical` severities, its alert.
    ///
    /// Missing metadata becomes an empty object. The alert is named after the
    /// event type with its first character upper-cased.
    pub fn log_event(
        &self,
        event_type: &str,
        severity: EventSeverity,
        message: &str,
        metadata: Option<Value>,
    ) -> (Event, Option<Alert>) {
        let event = Event {
            timestamp: now(),
            event_type: event_type.to_string(),
            severity,
            message: message.to_string(),
            metadata: metadata.unwrap_or_else(|| Value::Object(Map::new())),
        };

        debug!(event_type = %event.event_type, severity = %severity, "Event logged");

        let alert = severity
            .alert_severity()
            .map(|alert_severity| Alert::new(&capitalize(event_type), message, alert_severity));

        (event, alert)
    }
}

/// Upper-case the first character, leaving the rest untouched.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
