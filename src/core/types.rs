//! Common types used across the API hook modules.

use chrono::SecondsFormat;

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Render a timestamp as ISO-8601 UTC with millisecond precision.
///
/// Produces the `2024-01-15T10:30:45.123Z` shape that log pipelines expect.
pub fn iso_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Round a value to two decimal places.
///
/// Halves round away from zero, which matches round-half-up for the
/// non-negative latencies this crate deals with. Values too large to scale
/// by 100 without overflowing are returned unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Serde adapter writing timestamps with [`iso_timestamp`].
pub mod iso_millis {
    use super::{iso_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&iso_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        chrono::DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(serde::de::Error::custom)
    }
}
