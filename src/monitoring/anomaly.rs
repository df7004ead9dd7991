//! Threshold checks over API log entries.

use super::alerts::{Alert, AlertSeverity};
use crate::logging::{CallResult, LogEntry};
use tracing::debug;

/// Latency above which a call is reported as slow.
pub const SLOW_RESPONSE_THRESHOLD_MS: f64 = 5000.0;

/// Status code reported as unauthorized access.
pub const UNAUTHORIZED_STATUS: u16 = 401;

pub const SLOW_RESPONSE_ALERT: &str = "Slow Response Time";
pub const API_ERROR_ALERT: &str = "API Error";
pub const UNAUTHORIZED_ALERT: &str = "Unauthorized Access";

/// Stateless anomaly detector.
///
/// Runs three independent checks in a fixed order (latency, failure,
/// unauthorized status) and returns every alert that matched.
#[derive(Clone, Debug, Default)]
pub struct AnomalyDetector;

impl AnomalyDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one entry.
    pub fn evaluate(&self, entry: &LogEntry) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if entry.response_time_ms() > SLOW_RESPONSE_THRESHOLD_MS {
            alerts.push(Alert::new(
                SLOW_RESPONSE_ALERT,
                format!(
                    "API {} took {}ms",
                    entry.endpoint(),
                    entry.response_time_ms()
                ),
                AlertSeverity::Warning,
            ));
        }

        if entry.result() == CallResult::Error {
            alerts.push(Alert::new(
                API_ERROR_ALERT,
                format!(
                    "API {} failed: {}",
                    entry.endpoint(),
                    entry.error_message().unwrap_or("")
                ),
                AlertSeverity::Error,
            ));
        }

        if entry.response_code() == Some(UNAUTHORIZED_STATUS) {
            alerts.push(Alert::new(
                UNAUTHORIZED_ALERT,
                format!("Unauthorized access attempt from {}", entry.source_ip()),
                AlertSeverity::Critical,
            ));
        }

        if !alerts.is_empty() {
            debug!(
                request_id = %entry.request_id(),
                count = alerts.len(),
                "Anomalies detected"
            );
        }

        alerts
    }
}
