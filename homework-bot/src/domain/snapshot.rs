//! Validated result of one fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Cursor;

/// One homework as reported by the status API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItemRecord {
    /// Server-side identifier (if reported).
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    /// Human-readable homework name, used in messages.
    pub homework_name: String,
    /// Raw status code. Interpreted later against the known set, so an
    /// unrecognised or missing code survives validation.
    #[serde(default)]
    pub status: Option<String>,
    /// Last status change. Unparsable timestamps are dropped.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_comment: Option<String>,
}

/// Optional informational field that must never reject the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The decoded latest record, the older entries as they came, and the cursor
/// for the next fetch.
///
/// Only the latest record is interpreted, so older entries are not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    latest: TrackedItemRecord,
    older: Vec<Value>,
    next_cursor: Cursor,
}

impl StatusSnapshot {
    pub fn new(latest: TrackedItemRecord, older: Vec<Value>, next_cursor: Cursor) -> Self {
        Self {
            latest,
            older,
            next_cursor,
        }
    }

    /// The most recently updated record.
    pub fn latest(&self) -> &TrackedItemRecord {
        &self.latest
    }

    /// Entries after the latest one, undecoded.
    pub fn older(&self) -> &[Value] {
        &self.older
    }

    pub fn next_cursor(&self) -> &Cursor {
        &self.next_cursor
    }
}
