//! API log entry structure.
//!
//! `CallMetadata` is what the host supplies for one request; `LogEntry` is the
//! sanitized, timestamped record built from it.

use crate::core::{iso_millis, Error, Result, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Outcome of an API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallResult {
    /// Call completed normally
    Success,
    /// Call failed
    Error,
}

impl CallResult {
    /// Derive the outcome from an HTTP status code.
    pub fn from_status(code: u16) -> Self {
        if code < 400 {
            CallResult::Success
        } else {
            CallResult::Error
        }
    }

    /// Tag as written to logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallResult::Success => "success",
            CallResult::Error => "error",
        }
    }
}

impl std::fmt::Display for CallResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(CallResult::Success),
            "error" => Ok(CallResult::Error),
            other => Err(Error::InvalidOutcome(other.to_string())),
        }
    }
}

/// Authentication details attached to a log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    pub authentication_method: String,
    pub authorization_level: String,
    pub session_id: Option<String>,
}

/// Raw metadata for one API call, as captured by the host.
#[derive(Clone, Debug, Default)]
pub struct CallMetadata {
    /// Request identifier (generated when missing)
    pub request_id: Option<String>,
    /// Caller identity
    pub user_id: Option<String>,
    /// Client address
    pub source_ip: Option<String>,
    /// HTTP method
    pub method: Option<String>,
    /// Endpoint path
    pub endpoint: String,
    /// Query, body and path parameters merged into one record
    pub parameters: Value,
    /// Response status code
    pub response_code: Option<u16>,
    /// Measured latency in milliseconds
    pub response_time_ms: f64,
    /// Outcome (derived from the status code when missing)
    pub result: Option<CallResult>,
    /// Error text for failed calls
    pub error_message: Option<String>,
    /// Authentication method
    pub auth_method: Option<String>,
    /// Authorization level
    pub auth_level: Option<String>,
    /// Session identifier
    pub session_id: Option<String>,
}

impl CallMetadata {
    /// Create metadata for a call to `endpoint`.
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    /// Set request ID.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    /// Set user ID.
    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Set source address.
    pub fn with_source_ip(mut self, source_ip: &str) -> Self {
        self.source_ip = Some(source_ip.to_string());
        self
    }

    /// Set HTTP method.
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    /// Set parameters.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set response status and latency.
    pub fn with_response(mut self, code: u16, time_ms: f64) -> Self {
        self.response_code = Some(code);
        self.response_time_ms = time_ms;
        self
    }

    /// Set outcome.
    pub fn with_result(mut self, result: CallResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Set error message.
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = Some(message.to_string());
        self
    }

    /// Set security context fields.
    pub fn with_auth(mut self, method: &str, level: &str, session_id: &str) -> Self {
        self.auth_method = Some(method.to_string());
        self.auth_level = Some(level.to_string());
        self.session_id = Some(session_id.to_string());
        self
    }
}

/// A structured API log entry.
///
/// Built once by [`LogEntryBuilder`](super::LogEntryBuilder) and never
/// modified afterwards; fields are read through accessors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "iso_millis")]
    pub(crate) timestamp: Timestamp,
    pub(crate) request_id: String,
    pub(crate) user_id: String,
    pub(crate) source_ip: String,
    pub(crate) method: String,
    pub(crate) endpoint: String,
    pub(crate) parameters: Value,
    pub(crate) response_code: Option<u16>,
    pub(crate) response_time_ms: f64,
    pub(crate) security_context: SecurityContext,
    pub(crate) result: CallResult,
    pub(crate) error_message: Option<String>,
}

impl LogEntry {
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn source_ip(&self) -> &str {
        &self.source_ip
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sanitized parameters.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn response_code(&self) -> Option<u16> {
        self.response_code
    }

    /// Latency rounded to two decimals.
    pub fn response_time_ms(&self) -> f64 {
        self.response_time_ms
    }

    pub fn security_context(&self) -> &SecurityContext {
        &self.security_context
    }

    pub fn result(&self) -> CallResult {
        self.result
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
