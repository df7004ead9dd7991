//! Parameter sanitization for API logs.
//!
//! Replaces the values of sensitive fields with a redaction marker derived
//! from a SHA-256 digest of the value. The same value always produces the
//! same marker, so redacted logs can still be grouped and correlated.

use crate::config::SecurityConfig;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Prefix of every redaction marker.
const MARKER_PREFIX: &str = "[REDACTED:";

/// Number of hex characters of the digest kept in a marker.
const MARKER_HASH_LEN: usize = 16;

/// Ordered set of field names to redact.
///
/// Fixed at construction. Matching is exact and case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SensitiveFieldSet {
    fields: Vec<String>,
}

impl SensitiveFieldSet {
    /// Create a set from field names, dropping duplicates but keeping order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    /// A set that redacts nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Build the set from configuration.
    ///
    /// An absent field list does not fail: it yields an empty set and logs a
    /// warning so the missing redaction is visible to operators.
    pub fn from_config(config: &SecurityConfig) -> Self {
        match &config.sensitive_fields {
            Some(fields) => Self::new(fields.iter().cloned()),
            None => {
                warn!("No sensitive field set configured; parameter redaction is disabled");
                Self::disabled()
            }
        }
    }

    /// Check whether a field name is sensitive.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// True when nothing will be redacted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of configured fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over field names in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Sanitize a parameter record.
///
/// Only top-level keys are inspected. A key is redacted when its name is in
/// `fields` and its value is truthy. Non-object input is returned unchanged,
/// and the input is never modified.
///
/// A sensitive string that is already shaped like a marker (see
/// [`is_redaction_marker`]) is kept as is, so sanitizing twice yields the same
/// record. A caller-supplied value in that shape is therefore logged verbatim.
pub fn sanitize(params: &Value, fields: &SensitiveFieldSet) -> Value {
    let map = match params {
        Value::Object(map) => map,
        _ => return params.clone(),
    };

    let mut sanitized = Map::with_capacity(map.len());
    for (key, value) in map {
        let redact = fields.contains(key) && is_truthy(value) && !is_marker_value(value);
        if redact {
            sanitized.insert(key.clone(), Value::String(redaction_marker(value)));
        } else {
            sanitized.insert(key.clone(), value.clone());
        }
    }
    Value::Object(sanitized)
}

/// Compute the redaction marker for a value.
///
/// `[REDACTED:<first 16 hex chars of sha256(stringified value)>]`
pub fn redaction_marker(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stringify(value).as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}{}]", MARKER_PREFIX, &digest[..MARKER_HASH_LEN])
}

/// Check whether a string is a redaction marker.
pub fn is_redaction_marker(s: &str) -> bool {
    s.strip_prefix(MARKER_PREFIX)
        .and_then(|rest| rest.strip_suffix(']'))
        .map(|hash| {
            hash.len() == MARKER_HASH_LEN
                && hash.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
        .unwrap_or(false)
}

fn is_marker_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if is_redaction_marker(s))
}

/// Truthiness of a parameter value.
///
/// Null, false, zero and the empty string are falsy. Arrays and objects are
/// truthy even when empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text fed to the hash: raw text for strings, compact JSON otherwise.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
