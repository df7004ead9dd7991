//! API hook.
//!
//! Wires sanitization, entry building, anomaly detection and statistics into
//! one object the host framework calls right before it finalizes a response.
//! Each hook owns its collaborators; nothing is process-global.

use crate::config::HookConfig;
use crate::logging::{
    CallMetadata, CallResult, Event, EventLogger, EventSeverity, LogEntry, LogEntryBuilder,
    LogRecord, LogSink, SensitiveFieldSet, TracingLogSink,
};
use crate::monitoring::{AlertSink, AnomalyDetector, LogAccumulator, Stats, TracingAlertSink};
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Status recorded for a monitored handler that returned `Ok`.
const MONITOR_OK_STATUS: u16 = 200;

/// Status recorded for a monitored handler that returned `Err`.
const MONITOR_ERR_STATUS: u16 = 500;

/// Options for [`ApiHook::monitor`].
#[derive(Clone, Debug)]
pub struct MonitorOptions {
    /// Record call parameters; when false they are dropped before logging.
    pub log_params: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self { log_params: true }
    }
}

/// Request logging and alerting hook.
pub struct ApiHook {
    config: HookConfig,
    builder: LogEntryBuilder,
    detector: AnomalyDetector,
    events: EventLogger,
    accumulator: Arc<LogAccumulator>,
    log_sink: Arc<dyn LogSink>,
    alert_sink: Arc<dyn AlertSink>,
}

impl ApiHook {
    /// Create a hook that logs and alerts through `tracing`.
    pub fn new(config: HookConfig) -> Self {
        let fields = SensitiveFieldSet::from_config(&config.security);
        let accumulator = Arc::new(LogAccumulator::with_retention(config.logging.retention));

        info!(sensitive_fields = fields.len(), "API hook initialized");

        Self {
            builder: LogEntryBuilder::new(fields),
            detector: AnomalyDetector::new(),
            events: EventLogger::new(),
            accumulator,
            log_sink: Arc::new(TracingLogSink),
            alert_sink: Arc::new(TracingAlertSink),
            config,
        }
    }

    /// Replace the log sink.
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    /// Replace the alert sink.
    pub fn with_alert_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.alert_sink = sink;
        self
    }

    /// Share an existing accumulator.
    pub fn with_accumulator(mut self, accumulator: Arc<LogAccumulator>) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// Get the accumulator.
    pub fn accumulator(&self) -> &Arc<LogAccumulator> {
        &self.accumulator
    }

    /// Current statistics.
    pub fn stats(&self) -> Stats {
        self.accumulator.stats()
    }

    /// Record one completed API call.
    ///
    /// Builds the entry, hands it to the log sink, appends it to the
    /// accumulator and hands every detected alert to the alert sink.
    pub fn record(&self, metadata: CallMetadata) -> LogEntry {
        let entry = self.builder.build(metadata);
        let record = LogRecord::Api(entry.clone());

        self.log_sink.accept(&record);
        self.accumulator.append(&record);

        for alert in self.detector.evaluate(&entry) {
            self.alert_sink.accept(&alert);
        }

        entry
    }

    /// Log a manual event.
    ///
    /// `error` and `critical` events also raise an alert. Event metadata is
    /// stored as given and not sanitized.
    pub fn log_event(
        &self,
        event_type: &str,
        severity: EventSeverity,
        message: &str,
        metadata: Option<Value>,
    ) -> Event {
        let (event, alert) = self.events.log_event(event_type, severity, message, metadata);
        let record = LogRecord::Event(event.clone());

        self.log_sink.accept(&record);
        self.accumulator.append(&record);

        if let Some(alert) = alert {
            self.alert_sink.accept(&alert);
        }

        event
    }

    /// Run a handler and record its call.
    ///
    /// Latency is measured around `handler`. `Ok` is recorded as a success
    /// (status 200 unless the metadata already carries one); `Err` as an
    /// error with status 500 and the error text. The handler's result is
    /// returned untouched.
    pub fn monitor<T, E, F>(
        &self,
        metadata: CallMetadata,
        options: &MonitorOptions,
        handler: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let start = Instant::now();
        let result = handler();
        self.record_outcome(metadata, options, start, &result);
        result
    }

    /// Await a handler future and record its call.
    ///
    /// Same recording rules as [`ApiHook::monitor`].
    pub async fn monitor_async<T, E, Fut>(
        &self,
        metadata: CallMetadata,
        options: &MonitorOptions,
        handler: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = Instant::now();
        let result = handler.await;
        self.record_outcome(metadata, options, start, &result);
        result
    }

    fn record_outcome<T, E: Display>(
        &self,
        metadata: CallMetadata,
        options: &MonitorOptions,
        start: Instant,
        result: &Result<T, E>,
    ) {
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut metadata = if options.log_params {
            metadata
        } else {
            metadata.with_parameters(Value::Object(Default::default()))
        };

        metadata = match result {
            Ok(_) => {
                let code = metadata.response_code.unwrap_or(MONITOR_OK_STATUS);
                metadata
                    .with_response(code, elapsed_ms)
                    .with_result(CallResult::Success)
            }
            Err(e) => {
                let message = e.to_string();
                error!(endpoint = %metadata.endpoint, error = %message, "API error");
                metadata
                    .with_response(MONITOR_ERR_STATUS, elapsed_ms)
                    .with_result(CallResult::Error)
                    .with_error(&message)
            }
        };

        self.record(metadata);
    }
}

impl Default for ApiHook {
    fn default() -> Self {
        Self::new(HookConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{is_redaction_marker, MemoryLogSink};
    use crate::monitoring::{AlertSeverity, MemoryAlertSink};
    use serde_json::json;

    struct Harness {
        hook: ApiHook,
        logs: Arc<MemoryLogSink>,
        alerts: Arc<MemoryAlertSink>,
    }

    fn harness(config: HookConfig) -> Harness {
        let logs = Arc::new(MemoryLogSink::new());
        let alerts = Arc::new(MemoryAlertSink::new());
        let hook = ApiHook::new(config)
            .with_log_sink(logs.clone())
            .with_alert_sink(alerts.clone());
        Harness { hook, logs, alerts }
    }

    #[test]
    fn test_record_successful_call() {
        let h = harness(HookConfig::default());
        let entry = h.hook.record(
            CallMetadata::new("/api/v1/users")
                .with_user("user123")
                .with_source_ip("192.168.1.100")
                .with_method("POST")
                .with_parameters(json!({
                    "username": "john_doe",
                    "password": "secret123",
                    "email": "john@example.com"
                }))
                .with_response(200, 125.5)
                .with_result(CallResult::Success),
        );

        assert!(is_redaction_marker(entry.parameters()["password"].as_str().unwrap()));
        assert_eq!(h.logs.len(), 1);
        assert_eq!(h.logs.records()[0].as_api(), Some(&entry));
        assert!(h.alerts.is_empty());
        assert_eq!(h.hook.stats().success_count, 1);
    }

    #[test]
    fn test_record_failed_login() {
        let h = harness(HookConfig::default());
        h.hook.record(
            CallMetadata::new("/api/v1/auth/login")
                .with_user("user456")
                .with_source_ip("192.168.1.101")
                .with_method("POST")
                .with_parameters(json!({"username": "jane_doe", "password": "wrong"}))
                .with_response(401, 50.2)
                .with_result(CallResult::Error)
                .with_error("Invalid credentials"),
        );

        let alerts = h.alerts.alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, AlertSeverity::Error);
        assert_eq!(alerts[0].message, "API /api/v1/auth/login failed: Invalid credentials");
        assert_eq!(alerts[1].severity, AlertSeverity::Critical);
        assert_eq!(h.hook.stats().error_count, 1);
    }

    #[test]
    fn test_log_event_critical() {
        let h = harness(HookConfig::default());
        let event = h.hook.log_event(
            "security",
            EventSeverity::Critical,
            "Suspicious login pattern detected",
            Some(json!({"ip": "192.168.1.100", "attempts": 10, "user": "admin"})),
        );

        assert_eq!(event.metadata["user"], "admin");
        assert_eq!(h.logs.len(), 1);
        assert!(h.logs.records()[0].as_event().is_some());

        let alerts = h.alerts.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_name, "Security");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_log_event_info_no_alert() {
        let h = harness(HookConfig::default());
        h.hook.log_event("audit", EventSeverity::Info, "Config reloaded", None);
        assert!(h.alerts.is_empty());
        assert_eq!(h.hook.stats().total_logs, 1);
    }

    #[test]
    fn test_stats_across_calls_and_events() {
        let h = harness(HookConfig::default());
        h.hook.record(CallMetadata::new("/a").with_response(200, 125.5));
        h.hook.record(CallMetadata::new("/b").with_response(401, 50.2));
        h.hook.log_event("security", EventSeverity::Critical, "m", None);

        let stats = h.hook.stats();
        assert_eq!(stats.total_logs, 3);
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.error_count, 1);
        // (125.5 + 50.2 + 0) / 3
        assert_eq!(stats.avg_response_time, 58.57);
    }

    #[test]
    fn test_absent_sensitive_fields_disables_redaction() {
        let config = HookConfig::from_json(r#"{ "logging": { "level": "Info" } }"#).unwrap();
        let h = harness(config);
        let entry = h.hook.record(
            CallMetadata::new("/x").with_parameters(json!({"password": "secret123"})),
        );
        assert_eq!(entry.parameters()["password"], "secret123");
    }

    #[test]
    fn test_custom_sensitive_fields() {
        let h = harness(HookConfig::with_sensitive_fields(["ssn"]));
        let entry = h.hook.record(
            CallMetadata::new("/x").with_parameters(json!({"ssn": "123-45-6789", "password": "p"})),
        );
        assert!(is_redaction_marker(entry.parameters()["ssn"].as_str().unwrap()));
        assert_eq!(entry.parameters()["password"], "p");
    }

    #[test]
    fn test_shared_accumulator() {
        let shared = Arc::new(LogAccumulator::new());
        let a = ApiHook::default()
            .with_log_sink(Arc::new(crate::logging::NullLogSink))
            .with_alert_sink(Arc::new(crate::monitoring::NullAlertSink))
            .with_accumulator(shared.clone());
        let b = ApiHook::default()
            .with_log_sink(Arc::new(crate::logging::NullLogSink))
            .with_alert_sink(Arc::new(crate::monitoring::NullAlertSink))
            .with_accumulator(shared.clone());

        a.record(CallMetadata::new("/a"));
        b.record(CallMetadata::new("/b"));
        assert_eq!(shared.stats().total_logs, 2);
    }

    #[test]
    fn test_separate_hooks_are_isolated() {
        let a = harness(HookConfig::default());
        let b = harness(HookConfig::default());
        a.hook.record(CallMetadata::new("/a"));
        assert_eq!(a.hook.stats().total_logs, 1);
        assert_eq!(b.hook.stats().total_logs, 0);
    }

    #[test]
    fn test_monitor_ok() {
        let h = harness(HookConfig::default());
        let result: Result<&str, String> = h.hook.monitor(
            CallMetadata::new("/api/v1/users")
                .with_method("POST")
                .with_parameters(json!({"username": "john", "password": "pw"})),
            &MonitorOptions::default(),
            || Ok("created"),
        );

        assert_eq!(result, Ok("created"));
        let records = h.logs.records();
        let entry = records[0].as_api().unwrap();
        assert_eq!(entry.response_code(), Some(200));
        assert_eq!(entry.result(), CallResult::Success);
        assert!(is_redaction_marker(entry.parameters()["password"].as_str().unwrap()));
        assert!(entry.response_time_ms() >= 0.0);
    }

    #[test]
    fn test_monitor_err() {
        let h = harness(HookConfig::default());
        let result: Result<(), String> = h.hook.monitor(
            CallMetadata::new("/api/v1/auth/login"),
            &MonitorOptions::default(),
            || Err("Invalid credentials".to_string()),
        );

        assert_eq!(result, Err("Invalid credentials".to_string()));
        let records = h.logs.records();
        let entry = records[0].as_api().unwrap();
        assert_eq!(entry.response_code(), Some(500));
        assert_eq!(entry.result(), CallResult::Error);
        assert_eq!(entry.error_message(), Some("Invalid credentials"));

        let alerts = h.alerts.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_name, "API Error");
    }

    #[test]
    fn test_monitor_without_params() {
        let h = harness(HookConfig::default());
        let _: Result<(), String> = h.hook.monitor(
            CallMetadata::new("/x").with_parameters(json!({"username": "john"})),
            &MonitorOptions { log_params: false },
            || Ok(()),
        );
        let records = h.logs.records();
        assert_eq!(records[0].as_api().unwrap().parameters(), &json!({}));
    }

    #[test]
    fn test_monitor_keeps_supplied_status() {
        let h = harness(HookConfig::default());
        let _: Result<(), String> = h.hook.monitor(
            CallMetadata::new("/x").with_response(201, 0.0),
            &MonitorOptions::default(),
            || Ok(()),
        );
        assert_eq!(h.logs.records()[0].as_api().unwrap().response_code(), Some(201));
    }

    #[tokio::test]
    async fn test_monitor_async() {
        let h = harness(HookConfig::default());
        let result: Result<u32, String> = h
            .hook
            .monitor_async(
                CallMetadata::new("/api/v1/slow"),
                &MonitorOptions::default(),
                async {
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    Ok(7)
                },
            )
            .await;

        assert_eq!(result, Ok(7));
        let records = h.logs.records();
        let entry = records[0].as_api().unwrap();
        assert!(entry.response_time_ms() >= 5.0);
        assert_eq!(h.hook.stats().success_count, 1);
    }
}
