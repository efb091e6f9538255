//! Response shape checks.
//!
//! Turns a raw payload into a [`StatusSnapshot`] or explains why it can't.
//! Every failure here leaves the cursor where it was, so the same window is
//! fetched again next cycle.

use serde_json::Value;

use crate::domain::{Cursor, StatusSnapshot, TrackedItemRecord};
use crate::error::ValidationError;

pub const HOMEWORKS_FIELD: &str = "homeworks";
pub const CURRENT_DATE_FIELD: &str = "current_date";

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Validate a decoded status API response.
pub fn validate(raw: &Value) -> Result<StatusSnapshot, ValidationError> {
    let Some(map) = raw.as_object() else {
        return Err(ValidationError::NotAMapping {
            found: json_kind(raw),
        });
    };

    let homeworks = map.get(HOMEWORKS_FIELD).filter(|v| match v {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    });
    // Booleans are not timestamps, so `true` is rejected here too.
    let next_cursor = map.get(CURRENT_DATE_FIELD).and_then(Cursor::from_value);

    let (homeworks, next_cursor) = match (homeworks, next_cursor) {
        (Some(homeworks), Some(cursor)) => (homeworks, cursor),
        (homeworks, cursor) => {
            let mut fields = Vec::new();
            if homeworks.is_none() {
                fields.push(HOMEWORKS_FIELD);
            }
            if cursor.is_none() {
                fields.push(CURRENT_DATE_FIELD);
            }
            return Err(ValidationError::MissingFields { fields });
        }
    };

    let Some(items) = homeworks.as_array() else {
        return Err(ValidationError::MalformedItem(format!(
            "`{}` is a {}, expected a list",
            HOMEWORKS_FIELD,
            json_kind(homeworks)
        )));
    };

    let Some((first, older)) = items.split_first() else {
        return Err(ValidationError::MissingFields {
            fields: vec![HOMEWORKS_FIELD],
        });
    };

    Ok(StatusSnapshot::new(
        parse_latest(first)?,
        older.to_vec(),
        next_cursor,
    ))
}

/// Only the first entry is interpreted, so only it has to be a record.
fn parse_latest(item: &Value) -> Result<TrackedItemRecord, ValidationError> {
    if !item.is_object() {
        return Err(ValidationError::MalformedItem(format!(
            "latest item is a {}, expected a record",
            json_kind(item)
        )));
    }

    serde_json::from_value(item.clone())
        .map_err(|e| ValidationError::MalformedItem(format!("latest item: {}", e)))
}
