use crate::error::{JanusErrorBody, SessionError};
use crate::protocol::identifier::JanusId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reserved top-level keys of the Janus signalling protocol
pub const JANUS: &str = "janus";
pub const TRANSACTION: &str = "transaction";
pub const SESSION_ID: &str = "session_id";
pub const HANDLE_ID: &str = "handle_id";
pub const SENDER: &str = "sender";
pub const APISECRET: &str = "apisecret";

/// A Janus signalling message: an open JSON object with a handful of
/// well-known keys. Inbound messages are kept exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a decoded JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Result<Self, SessionError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SessionError::MalformedResponse {
                kind: "inbound".to_string(),
                reason: format!("expected a JSON object, got {}", other),
            }),
        }
    }

    /// Decode a raw text frame
    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Look up a nested value by JSON pointer, e.g. `/plugindata/data/room`
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let mut parts = pointer.strip_prefix('/')?.splitn(2, '/');
        let head = self.0.get(parts.next()?)?;
        match parts.next() {
            Some(rest) => head.pointer(&format!("/{}", rest)),
            None => Some(head),
        }
    }

    /// The event type (`janus` field)
    pub fn janus(&self) -> Option<&str> {
        self.0.get(JANUS).and_then(Value::as_str)
    }

    /// The transaction id as a table key. Numeric ids are accepted and
    /// rendered as text; `null` counts as absent.
    pub fn transaction(&self) -> Option<String> {
        match self.0.get(TRANSACTION)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn session_id(&self) -> Option<&Value> {
        self.0.get(SESSION_ID)
    }

    pub fn sender(&self) -> Option<&Value> {
        self.0.get(SENDER)
    }

    /// `data.id` of a `success` response to `create` or `attach`
    pub fn data_id(&self) -> Option<JanusId> {
        self.pointer("/data/id").and_then(JanusId::from_value)
    }

    /// The `error` object of an error response
    pub fn error_body(&self) -> Option<JanusErrorBody> {
        self.0
            .get("error")
            .and_then(|error| serde_json::from_value(error.clone()).ok())
    }

    /// `jsep.type` (offer/answer) of a message carrying a session description
    pub fn jsep_type(&self) -> Option<&str> {
        self.pointer("/jsep/type").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for Message {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Message> for Value {
    fn from(message: Message) -> Self {
        Value::Object(message.0)
    }
}

impl TryFrom<Value> for Message {
    type Error = SessionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// An outgoing request, stamped field by field before it reaches the transport
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub janus: String,
    pub transaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apisecret: Option<Value>,
    #[serde(flatten)]
    pub body: Message,
}

impl Request {
    /// Build a request from a caller payload. A `transaction`, `session_id`
    /// or `apisecret` already present in the payload wins over the defaults.
    pub fn new(
        kind: &str,
        mut payload: Message,
        session_id: Option<&JanusId>,
        apisecret: Option<&str>,
    ) -> Self {
        payload.remove(JANUS);
        let transaction = match payload.remove(TRANSACTION) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => new_transaction_id(),
        };
        let session_id = payload
            .remove(SESSION_ID)
            .filter(|v| !v.is_null())
            .or_else(|| session_id.map(JanusId::to_value));
        let apisecret = payload
            .remove(APISECRET)
            .filter(|v| !v.is_null())
            .or_else(|| apisecret.map(|s| Value::String(s.to_string())));

        Self {
            janus: kind.to_string(),
            transaction,
            session_id,
            apisecret,
            body: payload,
        }
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn into_message(self) -> Message {
        let mut message = self.body;
        message.insert(JANUS, self.janus);
        message.insert(TRANSACTION, self.transaction);
        if let Some(session_id) = self.session_id {
            message.insert(SESSION_ID, session_id);
        }
        if let Some(apisecret) = self.apisecret {
            message.insert(APISECRET, apisecret);
        }
        message
    }
}

/// Fresh random 128-bit transaction token
pub fn new_transaction_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
