//! Lenient decoding of schema-less remote records.
//!
//! The remote store enforces no schema, so every field is extracted with a
//! typed accessor that falls back to a literal default when the field is
//! missing or holds a value of the wrong type. Both cases are treated the
//! same way and neither is an error: one malformed record must not abort
//! the decode of a whole snapshot.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A remote record as delivered by the backend: field name to dynamic value.
pub type RawRecord = Map<String, Value>;

/// Total conversion from a raw remote record into a typed entity.
pub trait RemoteDecode: Sized {
    /// Decode `raw`, substituting defaults for missing or mistyped fields.
    fn decode(raw: &RawRecord) -> Self;
}

/// Encoding of an entity into the field map written to the remote store.
///
/// The serde shape of the entity is the wire shape.
pub trait RemoteEncode: Serialize {
    fn encode(&self) -> Result<RawRecord> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(Error::InvalidInput(format!(
                "expected a record, got {}",
                value_kind(&other)
            ))),
        }
    }
}

/// Decode every record of a snapshot, preserving order.
pub fn decode_snapshot<T: RemoteDecode>(records: &[RawRecord]) -> Vec<T> {
    records.iter().map(T::decode).collect()
}

/// Extract a string field or fall back to `default`.
pub fn string_field(raw: &RawRecord, key: &str, default: &str) -> String {
    match raw.get(key) {
        Some(Value::String(value)) => value.clone(),
        other => {
            log_fallback(key, other);
            default.to_string()
        }
    }
}

/// Extract a numeric field or fall back to `default`.
///
/// Integers are accepted and widened; numeric strings are not.
pub fn f64_field(raw: &RawRecord, key: &str, default: f64) -> f64 {
    match raw.get(key).and_then(Value::as_f64) {
        Some(value) => value,
        None => {
            log_fallback(key, raw.get(key));
            default
        }
    }
}

/// Extract a timestamp field or fall back to the current time.
pub fn timestamp_field(raw: &RawRecord, key: &str) -> DateTime<Utc> {
    match raw.get(key).and_then(parse_timestamp) {
        Some(value) => value,
        None => {
            log_fallback(key, raw.get(key));
            Utc::now()
        }
    }
}

/// Wire representation of a timestamp: `{"seconds": .., "nanoseconds": ..}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WireTimestamp {
    seconds: i64,
    #[serde(default)]
    nanoseconds: u32,
}

impl WireTimestamp {
    fn from_datetime(at: &DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanoseconds: at.timestamp_subsec_nanos(),
        }
    }

    fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanoseconds).single()
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    WireTimestamp::deserialize(value).ok()?.to_datetime()
}

/// Serde adapter for timestamp fields, for use with `#[serde(with = ..)]`.
pub mod wire_timestamp {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::WireTimestamp;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        WireTimestamp::from_datetime(at).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        WireTimestamp::deserialize(deserializer)?
            .to_datetime()
            .ok_or_else(|| D::Error::custom("timestamp out of range"))
    }
}

fn log_fallback(key: &str, found: Option<&Value>) {
    match found {
        None => tracing::debug!("Remote field '{}' missing, using default", key),
        Some(value) => tracing::debug!(
            "Remote field '{}' has unexpected type ({}), using default",
            key,
            value_kind(value)
        ),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
