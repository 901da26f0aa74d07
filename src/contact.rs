//! Contact-form submission records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// `2024-05-01T09:30:00.123Z`: UTC, millisecond precision.
const ISO_8601_MILLIS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// A single contact-form submission as persisted in the medium.
///
/// Fields absent or `null` in stored JSON read back as empty strings; numbers
/// and booleans read back as their text. Keys outside the known set are kept
/// in `extra` so rewriting the collection never drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    /// Assigned by the store on insertion.
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

impl Contact {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            service: service.into(),
            message: message.into(),
            timestamp: String::new(),
            extra: Map::new(),
        }
    }
}

/// Format `at` as an ISO 8601 UTC timestamp with milliseconds.
#[must_use]
pub fn iso_timestamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    // The format description only contains infallible components for UTC values.
    utc.format(ISO_8601_MILLIS).unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Current time as an ISO 8601 UTC timestamp.
#[must_use]
pub fn now_timestamp() -> String {
    iso_timestamp(OffsetDateTime::now_utc())
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
