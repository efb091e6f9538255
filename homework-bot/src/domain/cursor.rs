//! Fetch watermark.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque point-in-time marker sent as `from_date` on the next fetch.
///
/// The API reports it as a unix timestamp, but the bot never does arithmetic
/// on it, so it is kept in the exact textual form the server supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// The starting cursor: everything since the unix epoch.
    pub fn epoch() -> Self {
        Self("0".to_string())
    }

    /// Build a cursor from a server-supplied JSON value.
    ///
    /// Returns `None` for values that cannot bound a fetch window: null,
    /// zero, empty strings and non-scalar values.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let is_zero = n.as_i64() == Some(0)
                    || n.as_u64() == Some(0)
                    || n.as_f64().is_some_and(|f| f == 0.0);
                (!is_zero).then(|| Self(n.to_string()))
            }
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| Self(s.to_string()))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_epoch(&self) -> bool {
        self.0 == "0"
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
