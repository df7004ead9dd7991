//! Monitoring Module
//!
//! Watches API log entries:
//! - Threshold-based anomaly detection
//! - Alert delivery
//! - Summary statistics

pub mod alerts;
pub mod anomaly;
pub mod stats;

pub use alerts::{
    Alert, AlertSeverity, AlertSink, ChannelAlertSink, MemoryAlertSink, NullAlertSink,
    TracingAlertSink,
};
pub use anomaly::{AnomalyDetector, SLOW_RESPONSE_THRESHOLD_MS, UNAUTHORIZED_STATUS};
pub use stats::{LogAccumulator, Stats};
