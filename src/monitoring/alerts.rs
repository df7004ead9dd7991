//! Alerts and alert delivery.
//!
//! Alerts are produced, handed to an [`AlertSink`] and not retained by the
//! hook. Delivery is fire-and-forget: sinks report nothing back.

use crate::core::{iso_millis, now, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

/// Alert severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    /// Degraded but working
    Warning,
    /// A call failed
    Error,
    /// Security relevant
    Critical,
}

impl AlertSeverity {
    /// Upper-case tag as written to logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Error => "ERROR",
            AlertSeverity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator-facing alert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// When the alert was raised
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
    /// Alert name
    pub alert_name: String,
    /// Human readable message
    pub message: String,
    /// Severity
    pub severity: AlertSeverity,
}

impl Alert {
    /// Create an alert stamped with the current time.
    pub fn new(alert_name: &str, message: impl Into<String>, severity: AlertSeverity) -> Self {
        Self {
            timestamp: now(),
            alert_name: alert_name.to_string(),
            message: message.into(),
            severity,
        }
    }
}

/// Destination for raised alerts.
pub trait AlertSink: Send + Sync {
    /// Accept one alert. Must not block on delivery.
    fn accept(&self, alert: &Alert);
}

impl<F> AlertSink for F
where
    F: Fn(&Alert) + Send + Sync,
{
    fn accept(&self, alert: &Alert) {
        self(alert)
    }
}

/// Emits alerts as `tracing` warnings.
#[derive(Clone, Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn accept(&self, alert: &Alert) {
        match serde_json::to_string(alert) {
            Ok(json) => warn!(
                alert_name = %alert.alert_name,
                severity = %alert.severity,
                alert = %json,
                "ALERT"
            ),
            Err(e) => error!(error = %e, alert_name = %alert.alert_name, "Failed to serialize alert"),
        }
    }
}

/// Keeps alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of alerts received.
    pub fn len(&self) -> usize {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all received alerts.
    pub fn clear(&self) {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl AlertSink for MemoryAlertSink {
    fn accept(&self, alert: &Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert.clone());
    }
}

/// Forwards alerts to an async consumer over an unbounded channel.
///
/// A closed receiver is logged and the alert dropped.
#[derive(Clone, Debug)]
pub struct ChannelAlertSink {
    tx: UnboundedSender<Alert>,
}

impl ChannelAlertSink {
    /// Wrap an existing sender.
    pub fn new(tx: UnboundedSender<Alert>) -> Self {
        Self { tx }
    }
}

impl AlertSink for ChannelAlertSink {
    fn accept(&self, alert: &Alert) {
        if self.tx.send(alert.clone()).is_err() {
            warn!(alert_name = %alert.alert_name, "Alert channel closed; alert dropped");
        }
    }
}

/// Discards alerts.
#[derive(Clone, Debug, Default)]
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn accept(&self, alert: &Alert) {
        debug!(alert_name = %alert.alert_name, "Alert discarded");
    }
}
