use crate::error::janus_error::JanusErrorCode;
use crate::protocol::identifier::JanusId;
use crate::protocol::message::Message;
use std::time::Duration;

/// Session error types
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Signalling transaction with txid {transaction} timed out after {timeout:?}.")]
    Timeout { transaction: String, timeout: Duration },

    /// The server answered with a message recognised by the session's error predicate
    #[error("Janus returned an error response: {}", describe_protocol_error(.0))]
    Protocol(Message),

    #[error("Janus session was disposed.")]
    Disposed,

    #[error("Transaction already being tracked: {transaction}")]
    DuplicateTransaction { transaction: String },

    #[error("Session already created with id {0}")]
    AlreadyCreated(JanusId),

    #[error("Malformed {kind} response: {reason}")]
    MalformedResponse { kind: String, reason: String },

    #[error("Invalid session configuration: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// The Janus error code carried by a protocol error, if any
    pub fn janus_error_code(&self) -> Option<i64> {
        match self {
            SessionError::Protocol(message) => message.error_body().map(|body| body.code),
            _ => None,
        }
    }

    /// Whether the server reported that the session no longer exists
    pub fn is_session_not_found(&self) -> bool {
        self.janus_error_code() == Some(JanusErrorCode::SessionNotFound.code() as i64)
    }

    /// The raw server message behind a protocol error
    pub fn response(&self) -> Option<&Message> {
        match self {
            SessionError::Protocol(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, SessionError::Disposed)
    }
}

fn describe_protocol_error(message: &Message) -> String {
    match message.error_body() {
        Some(body) => body.to_string(),
        None => message.to_string(),
    }
}
