//! Log entry construction.

use super::entry::{CallMetadata, CallResult, LogEntry, SecurityContext};
use super::sanitize::{sanitize, SensitiveFieldSet};
use crate::core::{now, round2, Timestamp};
use tracing::debug;

/// User recorded when the caller is unauthenticated.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Source address recorded when the client address is unknown.
pub const UNKNOWN_SOURCE_IP: &str = "0.0.0.0";

/// Method recorded when none was captured.
pub const DEFAULT_METHOD: &str = "GET";

/// Authentication method recorded when none was captured.
pub const DEFAULT_AUTH_METHOD: &str = "OAuth2";

/// Authorization level recorded when none was captured.
pub const DEFAULT_AUTH_LEVEL: &str = "User";

/// Builds sanitized [`LogEntry`] values from [`CallMetadata`].
#[derive(Clone, Debug, Default)]
pub struct LogEntryBuilder {
    sensitive_fields: SensitiveFieldSet,
}

impl LogEntryBuilder {
    /// Create a builder redacting the given fields.
    pub fn new(sensitive_fields: SensitiveFieldSet) -> Self {
        Self { sensitive_fields }
    }

    /// The fields this builder redacts.
    pub fn sensitive_fields(&self) -> &SensitiveFieldSet {
        &self.sensitive_fields
    }

    /// Build a log entry stamped with the current time.
    pub fn build(&self, metadata: CallMetadata) -> LogEntry {
        self.build_at(metadata, now())
    }

    /// Build a log entry with an explicit timestamp.
    pub fn build_at(&self, metadata: CallMetadata, timestamp: Timestamp) -> LogEntry {
        let request_id = metadata
            .request_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let result = metadata.result.unwrap_or_else(|| {
            metadata
                .response_code
                .map(CallResult::from_status)
                .unwrap_or(CallResult::Success)
        });

        let security_context = SecurityContext {
            authentication_method: metadata
                .auth_method
                .unwrap_or_else(|| DEFAULT_AUTH_METHOD.to_string()),
            authorization_level: metadata
                .auth_level
                .unwrap_or_else(|| DEFAULT_AUTH_LEVEL.to_string()),
            session_id: Some(metadata.session_id.unwrap_or_else(|| request_id.clone())),
        };

        let entry = LogEntry {
            timestamp,
            user_id: metadata.user_id.unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            source_ip: metadata
                .source_ip
                .unwrap_or_else(|| UNKNOWN_SOURCE_IP.to_string()),
            method: metadata.method.unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            endpoint: metadata.endpoint,
            parameters: sanitize(&metadata.parameters, &self.sensitive_fields),
            response_code: metadata.response_code,
            response_time_ms: round2(clamp_latency(metadata.response_time_ms)),
            security_context,
            result,
            error_message: metadata.error_message,
            request_id,
        };

        debug!(
            request_id = %entry.request_id,
            endpoint = %entry.endpoint,
            result = %entry.result,
            "Log entry built"
        );

        entry
    }
}

/// Latency is finite and non-negative; anything else becomes zero.
fn clamp_latency(ms: f64) -> f64 {
    if !ms.is_finite() || ms < 0.0 {
        0.0
    } else {
        ms
    }
}
