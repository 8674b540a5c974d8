//! Decoded tag values that may fall back to their wire form.

use std::fmt;

use chrono::{DateTime, Utc};

/// A tag value that was either decoded into `T` or kept as the raw wire
/// string because decoding failed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lenient<T> {
    /// Successfully decoded value.
    Value(T),
    /// The wire value, verbatim, when it could not be decoded.
    Raw(String),
}

impl<T> Lenient<T> {
    /// The decoded value, if decoding succeeded.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Raw(_) => None,
        }
    }

    /// The raw wire value, if decoding failed.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Raw(s) => Some(s),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl Default for Lenient<i64> {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl Default for Lenient<DateTime<Utc>> {
    fn default() -> Self {
        Self::Value(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl fmt::Display for Lenient<i64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

/// Integer tag value.
pub type TagInt = Lenient<i64>;

/// Timestamp tag value (`tmi-sent-ts`).
pub type TagTime = Lenient<DateTime<Utc>>;

impl TagTime {
    /// Milliseconds since the Unix epoch, as sent on the wire.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.value().map(|dt| dt.timestamp_millis())
    }
}

/// Decode an integer tag value. Never fails.
pub(crate) fn decode_int(key: &str, value: &str) -> TagInt {
    match value.parse::<i64>() {
        Ok(n) => Lenient::Value(n),
        Err(e) => {
            tracing::warn!(key, value, "could not parse integer tag: {}", e);
            Lenient::Raw(value.to_string())
        }
    }
}

/// Decode a millisecond Unix timestamp. Never fails.
pub(crate) fn decode_time(key: &str, value: &str) -> TagTime {
    let parsed = value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis);
    match parsed {
        Some(ts) => Lenient::Value(ts),
        None => {
            tracing::warn!(key, value, "could not parse timestamp tag");
            Lenient::Raw(value.to_string())
        }
    }
}

/// `"1"` and `"true"` are true, anything else is false.
pub(crate) fn decode_bool(value: &str) -> bool {
    value == "1" || value == "true"
}

pub(crate) fn decode_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}
