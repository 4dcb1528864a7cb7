use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Server-assigned identifier of a session, handle, room or feed.
///
/// Janus deployments emit these as JSON numbers, but some proxies and
/// plugins configured with `string_ids` send strings instead. Both forms are
/// kept as received and compared loosely against wire values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JanusId {
    Number(u64),
    Text(String),
}

impl JanusId {
    /// Reads an identifier out of a wire value
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(JanusId::Number),
            Value::String(s) => Some(JanusId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            JanusId::Number(n) => Value::from(*n),
            JanusId::Text(s) => Value::String(s.clone()),
        }
    }

    /// Loose comparison with a wire value: `7` and `"7"` are the same id
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (JanusId::Number(n), Value::Number(v)) => v.as_u64() == Some(*n),
            (JanusId::Number(n), Value::String(s)) => s.parse::<u64>().ok() == Some(*n),
            (JanusId::Text(s), Value::String(v)) => s == v,
            (JanusId::Text(s), Value::Number(v)) => *s == v.to_string(),
            _ => false,
        }
    }
}

/// Compares a possibly-unknown local id with a possibly-missing wire field.
/// An unknown id only matches a missing (or null) field.
pub fn id_matches(local: Option<&JanusId>, wire: Option<&Value>) -> bool {
    match (local, wire) {
        (None, None) | (None, Some(Value::Null)) => true,
        (Some(id), Some(value)) => id.matches(value),
        _ => false,
    }
}

impl fmt::Display for JanusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JanusId::Number(n) => write!(f, "{}", n),
            JanusId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for JanusId {
    fn from(id: u64) -> Self {
        JanusId::Number(id)
    }
}

impl From<&str> for JanusId {
    fn from(id: &str) -> Self {
        JanusId::Text(id.to_string())
    }
}

impl From<String> for JanusId {
    fn from(id: String) -> Self {
        JanusId::Text(id)
    }
}
