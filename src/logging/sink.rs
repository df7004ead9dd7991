//! Log record delivery.
//!
//! The hook hands every record to a [`LogSink`] and never waits for, or
//! checks, the outcome. Persisting records is the sink's business.

use super::entry::{CallResult, LogEntry};
use super::event::Event;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

/// Anything written to the API log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRecord {
    /// An intercepted API call
    Api(LogEntry),
    /// A manually logged event
    Event(Event),
}

impl LogRecord {
    /// Outcome of the call, if this record is an API call.
    pub fn result(&self) -> Option<CallResult> {
        match self {
            LogRecord::Api(entry) => Some(entry.result()),
            LogRecord::Event(_) => None,
        }
    }

    /// Latency for API calls, zero for events.
    pub fn response_time_ms(&self) -> f64 {
        match self {
            LogRecord::Api(entry) => entry.response_time_ms(),
            LogRecord::Event(_) => 0.0,
        }
    }

    /// The API entry, if this record is one.
    pub fn as_api(&self) -> Option<&LogEntry> {
        match self {
            LogRecord::Api(entry) => Some(entry),
            LogRecord::Event(_) => None,
        }
    }

    /// The event, if this record is one.
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            LogRecord::Event(event) => Some(event),
            LogRecord::Api(_) => None,
        }
    }
}

impl From<LogEntry> for LogRecord {
    fn from(entry: LogEntry) -> Self {
        LogRecord::Api(entry)
    }
}

impl From<Event> for LogRecord {
    fn from(event: Event) -> Self {
        LogRecord::Event(event)
    }
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    /// Accept one record. Must not block on delivery.
    fn accept(&self, record: &LogRecord);
}

impl<F> LogSink for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn accept(&self, record: &LogRecord) {
        self(record)
    }
}

/// Emits each record as a JSON line through `tracing`.
#[derive(Clone, Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn accept(&self, record: &LogRecord) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize log record");
                return;
            }
        };

        match record {
            LogRecord::Api(entry) => info!(
                request_id = %entry.request_id(),
                endpoint = %entry.endpoint(),
                record = %json,
                "API log"
            ),
            LogRecord::Event(event) => info!(
                event_type = %event.event_type,
                record = %json,
                "Event"
            ),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records received.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemoryLogSink {
    fn accept(&self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Forwards records to an async writer task over an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelLogSink {
    tx: UnboundedSender<LogRecord>,
}

impl ChannelLogSink {
    /// Wrap an existing sender.
    pub fn new(tx: UnboundedSender<LogRecord>) -> Self {
        Self { tx }
    }
}

impl LogSink for ChannelLogSink {
    fn accept(&self, record: &LogRecord) {
        if self.tx.send(record.clone()).is_err() {
            warn!("Log channel closed; record dropped");
        }
    }
}

/// Discards records.
#[derive(Clone, Debug, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn accept(&self, _record: &LogRecord) {
        debug!("Log record discarded");
    }
}
