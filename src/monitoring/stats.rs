//! In-memory log accumulator and summary statistics.
//!
//! One accumulator is owned per hook instance and shared through `Arc` with
//! whatever needs to read stats. Totals cover every appended record; only the
//! most recent records are retained for inspection.

use crate::config::DEFAULT_RETENTION;
use crate::core::round2;
use crate::logging::{CallResult, LogRecord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Summary statistics over all appended records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Records appended (API calls and events)
    pub total_logs: u64,
    /// API calls that succeeded
    pub success_count: u64,
    /// API calls that failed
    pub error_count: u64,
    /// Mean latency over all records, rounded to two decimals
    pub avg_response_time: f64,
}

#[derive(Debug, Default)]
struct Tally {
    total: u64,
    success: u64,
    error: u64,
    mean_response_time: f64,
    recent: VecDeque<LogRecord>,
}

/// Append-only accumulator for log records.
///
/// Appends from concurrent request handlers are serialized by a mutex, so
/// counts and the mean are never lost or read half-updated.
#[derive(Debug)]
pub struct LogAccumulator {
    tally: Mutex<Tally>,
    retention: usize,
}

impl LogAccumulator {
    /// Create an accumulator with the default retention.
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// Create an accumulator keeping at most `retention` recent records.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            tally: Mutex::new(Tally::default()),
            retention,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record.
    pub fn append(&self, record: &LogRecord) {
        let mut tally = self.lock();
        tally.total += 1;
        match record.result() {
            Some(CallResult::Success) => tally.success += 1,
            Some(CallResult::Error) => tally.error += 1,
            None => {}
        }
        // Running mean, finite for any finite latency.
        let latency = record.response_time_ms();
        if latency.is_finite() {
            tally.mean_response_time += (latency - tally.mean_response_time) / tally.total as f64;
        } else {
            warn!(latency, "non-finite latency counted as zero");
            tally.mean_response_time -= tally.mean_response_time / tally.total as f64;
        }

        if self.retention > 0 {
            if tally.recent.len() >= self.retention {
                tally.recent.pop_front();
            }
            tally.recent.push_back(record.clone());
        }
    }

    /// Current statistics.
    pub fn stats(&self) -> Stats {
        let tally = self.lock();
        let avg_response_time = if tally.total == 0 {
            0.0
        } else {
            round2(tally.mean_response_time)
        };

        Stats {
            total_logs: tally.total,
            success_count: tally.success,
            error_count: tally.error,
            avg_response_time,
        }
    }

    /// Most recent records, oldest first.
    pub fn recent(&self) -> Vec<LogRecord> {
        self.lock().recent.iter().cloned().collect()
    }

    /// Total records appended.
    pub fn len(&self) -> u64 {
        self.lock().total
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset totals and drop retained records.
    pub fn clear(&self) {
        *self.lock() = Tally::default();
    }
}

impl Default for LogAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
