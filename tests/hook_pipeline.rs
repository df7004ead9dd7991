//! End-to-end checks of the hook pipeline through the public API.

use std::sync::Arc;

use api_hook::config::HookConfig;
use api_hook::logging::{
    is_redaction_marker, sanitize, CallMetadata, CallResult, ChannelLogSink, LogEntryBuilder,
    LogRecord, SensitiveFieldSet,
};
use api_hook::monitoring::{AlertSeverity, AnomalyDetector, ChannelAlertSink, MemoryAlertSink};
use api_hook::{ApiHook, MonitorOptions};
use serde_json::json;

fn fields() -> SensitiveFieldSet {
    SensitiveFieldSet::new(["password", "api_key", "token", "secret"])
}

#[test]
fn test_sanitize_idempotent_and_selective() {
    let record = json!({
        "username": "john_doe",
        "password": "secret123",
        "token": "abc.def.ghi",
        "page": 2
    });
    let once = sanitize(&record, &fields());
    assert_eq!(sanitize(&once, &fields()), once);
    assert_eq!(once["username"], record["username"]);
    assert_eq!(once["page"], record["page"]);
    assert!(is_redaction_marker(once["token"].as_str().unwrap()));
}

#[test]
fn test_build_then_evaluate_three_alerts() {
    let entry = LogEntryBuilder::new(fields()).build(
        CallMetadata::new("/api/v1/auth/login")
            .with_source_ip("203.0.113.9")
            .with_response(401, 6000.0)
            .with_result(CallResult::Error)
            .with_error("Invalid credentials"),
    );

    let alerts = AnomalyDetector::new().evaluate(&entry);
    let severities: Vec<_> = alerts.iter().map(|a| a.severity).collect();
    assert_eq!(
        severities,
        vec![AlertSeverity::Warning, AlertSeverity::Error, AlertSeverity::Critical]
    );
    assert!(alerts[0].message.contains("/api/v1/auth/login"));
    assert!(alerts[0].message.contains("6000"));
    assert!(alerts[2].message.contains("203.0.113.9"));
}

#[test]
fn test_config_json_drives_redaction() {
    let config = HookConfig::from_json(
        r#"{ "security": { "sensitive_fields": ["card_number"] } }"#,
    )
    .unwrap();
    let alerts = Arc::new(MemoryAlertSink::new());
    let hook = ApiHook::new(config)
        .with_log_sink(Arc::new(|_: &LogRecord| {}))
        .with_alert_sink(alerts.clone());

    let entry = hook.record(
        CallMetadata::new("/api/v1/payments")
            .with_parameters(json!({"card_number": "4111111111111111", "amount": 10}))
            .with_response(200, 42.0),
    );

    assert!(is_redaction_marker(entry.parameters()["card_number"].as_str().unwrap()));
    assert_eq!(entry.parameters()["amount"], 10);
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn test_async_sinks_receive_records_and_alerts() {
    let (log_tx, mut log_rx) = tokio::sync::mpsc::unbounded_channel();
    let (alert_tx, mut alert_rx) = tokio::sync::mpsc::unbounded_channel();
    let hook = ApiHook::new(HookConfig::default())
        .with_log_sink(Arc::new(ChannelLogSink::new(log_tx)))
        .with_alert_sink(Arc::new(ChannelAlertSink::new(alert_tx)));

    let result: Result<(), String> = hook
        .monitor_async(
            CallMetadata::new("/api/v1/error").with_method("GET"),
            &MonitorOptions::default(),
            async { Err("Internal server error".to_string()) },
        )
        .await;
    assert!(result.is_err());

    let record = log_rx.recv().await.unwrap();
    let entry = record.as_api().unwrap();
    assert_eq!(entry.response_code(), Some(500));
    assert_eq!(entry.result(), CallResult::Error);

    let alert = alert_rx.recv().await.unwrap();
    assert_eq!(alert.alert_name, "API Error");
    assert_eq!(alert.message, "API /api/v1/error failed: Internal server error");
}

#[test]
fn test_stats_from_concurrent_hosts() {
    let hook = Arc::new(
        ApiHook::new(HookConfig::default())
            .with_log_sink(Arc::new(|_: &LogRecord| {}))
            .with_alert_sink(Arc::new(MemoryAlertSink::new())),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let hook = Arc::clone(&hook);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let code = if i == 0 { 500 } else { 200 };
                    hook.record(CallMetadata::new("/api/v1/users").with_response(code, 20.0));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = hook.stats();
    assert_eq!(stats.total_logs, 100);
    assert_eq!(stats.success_count, 75);
    assert_eq!(stats.error_count, 25);
    assert_eq!(stats.avg_response_time, 20.0);
}
