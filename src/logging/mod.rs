//! API Logging Module
//!
//! Turns raw call metadata into sanitized structured log records:
//! - Sensitive parameter redaction
//! - Log entry construction with defaults
//! - Manual event logging
//! - Log sinks and tracing setup

pub mod builder;
pub mod entry;
pub mod event;
pub mod sanitize;
pub mod sink;
pub mod subscriber;

pub use builder::LogEntryBuilder;
pub use entry::{CallMetadata, CallResult, LogEntry, SecurityContext};
pub use event::{Event, EventLogger, EventSeverity};
pub use sanitize::{is_redaction_marker, redaction_marker, sanitize, SensitiveFieldSet};
pub use sink::{ChannelLogSink, LogRecord, LogSink, MemoryLogSink, NullLogSink, TracingLogSink};
pub use subscriber::{init_tracing, LogLevel};
