//! # API Hook - request logging and anomaly alerting
//!
//! Helpers for an HTTP server to record every API call:
//! - **Sanitizer**: redacts sensitive parameters with stable hash markers
//! - **LogEntryBuilder**: structured, timestamped log entries with defaults
//! - **AnomalyDetector**: alerts on slow responses, errors and 401s
//! - **LogAccumulator**: per-hook summary statistics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use api_hook::config::HookConfig;
//! use api_hook::hook::ApiHook;
//! use api_hook::logging::CallMetadata;
//! use serde_json::json;
//!
//! let hook = ApiHook::new(HookConfig::default());
//!
//! // Called by the host right before the response is sent
//! let entry = hook.record(
//!     CallMetadata::new("/api/v1/users")
//!         .with_method("POST")
//!         .with_parameters(json!({"username": "john", "password": "secret123"}))
//!         .with_response(200, 125.456),
//! );
//! assert_eq!(entry.response_time_ms(), 125.46);
//! println!("{:?}", hook.stats());
//! ```

pub mod config;
pub mod core;
pub mod hook;
pub mod logging;
pub mod monitoring;

pub use crate::core::error::{Error, Result};
pub use hook::{ApiHook, MonitorOptions};
