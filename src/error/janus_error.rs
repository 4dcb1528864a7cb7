use serde::{Deserialize, Serialize};
use std::fmt;

/// Janus API error codes, as reported in the `error.code` field of an
/// `{"janus": "error"}` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum JanusErrorCode {
    Ok = 0,
    Unauthorized = 403,
    UnauthorizedPlugin = 405,
    TransportSpecific = 450,
    MissingRequest = 452,
    UnknownRequest = 453,
    InvalidJson = 454,
    InvalidJsonObject = 455,
    MissingMandatoryElement = 456,
    InvalidRequestPath = 457,
    SessionNotFound = 458,
    HandleNotFound = 459,
    PluginNotFound = 460,
    PluginAttach = 461,
    PluginMessage = 462,
    PluginDetach = 463,
    JsepUnknownType = 464,
    JsepInvalidSdp = 465,
    TrickleInvalidStream = 466,
    InvalidElementType = 467,
    SessionConflict = 468,
    UnexpectedAnswer = 469,
    TokenNotFound = 470,
    WebrtcState = 471,
    NotAcceptingSessions = 472,
    Unknown = 490,
}

impl JanusErrorCode {
    /// Returns the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            JanusErrorCode::Ok => "OK",
            JanusErrorCode::Unauthorized => "UNAUTHORIZED",
            JanusErrorCode::UnauthorizedPlugin => "UNAUTHORIZED_PLUGIN",
            JanusErrorCode::TransportSpecific => "TRANSPORT_SPECIFIC",
            JanusErrorCode::MissingRequest => "MISSING_REQUEST",
            JanusErrorCode::UnknownRequest => "UNKNOWN_REQUEST",
            JanusErrorCode::InvalidJson => "INVALID_JSON",
            JanusErrorCode::InvalidJsonObject => "INVALID_JSON_OBJECT",
            JanusErrorCode::MissingMandatoryElement => "MISSING_MANDATORY_ELEMENT",
            JanusErrorCode::InvalidRequestPath => "INVALID_REQUEST_PATH",
            JanusErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            JanusErrorCode::HandleNotFound => "HANDLE_NOT_FOUND",
            JanusErrorCode::PluginNotFound => "PLUGIN_NOT_FOUND",
            JanusErrorCode::PluginAttach => "PLUGIN_ATTACH",
            JanusErrorCode::PluginMessage => "PLUGIN_MESSAGE",
            JanusErrorCode::PluginDetach => "PLUGIN_DETACH",
            JanusErrorCode::JsepUnknownType => "JSEP_UNKNOWN_TYPE",
            JanusErrorCode::JsepInvalidSdp => "JSEP_INVALID_SDP",
            JanusErrorCode::TrickleInvalidStream => "TRICKLE_INVALID_STREAM",
            JanusErrorCode::InvalidElementType => "INVALID_ELEMENT_TYPE",
            JanusErrorCode::SessionConflict => "SESSION_CONFLICT",
            JanusErrorCode::UnexpectedAnswer => "UNEXPECTED_ANSWER",
            JanusErrorCode::TokenNotFound => "TOKEN_NOT_FOUND",
            JanusErrorCode::WebrtcState => "WEBRTC_STATE",
            JanusErrorCode::NotAcceptingSessions => "NOT_ACCEPTING_SESSIONS",
            JanusErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Returns a human-readable description of the error code
    pub fn message(&self) -> &'static str {
        match self {
            JanusErrorCode::Ok => "Success",
            JanusErrorCode::Unauthorized => "Unauthorized request",
            JanusErrorCode::UnauthorizedPlugin => "Unauthorized access to plugin",
            JanusErrorCode::TransportSpecific => "Transport related error",
            JanusErrorCode::MissingRequest => "The request is missing in the message",
            JanusErrorCode::UnknownRequest => "The gateway does not support this request",
            JanusErrorCode::InvalidJson => "The payload is not a valid JSON message",
            JanusErrorCode::InvalidJsonObject => "The object is not a valid JSON object as expected",
            JanusErrorCode::MissingMandatoryElement => "A mandatory element is missing in the message",
            JanusErrorCode::InvalidRequestPath => "The request cannot be handled for this webserver path",
            JanusErrorCode::SessionNotFound => "The session the request refers to doesn't exist",
            JanusErrorCode::HandleNotFound => "The handle the request refers to doesn't exist",
            JanusErrorCode::PluginNotFound => "The plugin the request wants to talk to doesn't exist",
            JanusErrorCode::PluginAttach => "An error occurred when trying to attach to a plugin",
            JanusErrorCode::PluginMessage => "An error occurred when trying to send a message to a plugin",
            JanusErrorCode::PluginDetach => "An error occurred when trying to detach from a plugin",
            JanusErrorCode::JsepUnknownType => "The gateway doesn't support this SDP type",
            JanusErrorCode::JsepInvalidSdp => "The Session Description provided by the peer is invalid",
            JanusErrorCode::TrickleInvalidStream => "The stream a trickle candidate refers to is invalid",
            JanusErrorCode::InvalidElementType => "A JSON element is of the wrong type",
            JanusErrorCode::SessionConflict => "The ID provided to create a new session is already in use",
            JanusErrorCode::UnexpectedAnswer => "We got an ANSWER to an OFFER we never made",
            JanusErrorCode::TokenNotFound => "The auth token the request refers to doesn't exist",
            JanusErrorCode::WebrtcState => "The current request cannot be handled because of the WebRTC state",
            JanusErrorCode::NotAcceptingSessions => "The server is currently configured not to accept new sessions",
            JanusErrorCode::Unknown => "Unknown error",
        }
    }

    /// Returns the numeric error code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Maps a numeric code received on the wire to a known error code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(JanusErrorCode::Ok),
            403 => Some(JanusErrorCode::Unauthorized),
            405 => Some(JanusErrorCode::UnauthorizedPlugin),
            450 => Some(JanusErrorCode::TransportSpecific),
            452 => Some(JanusErrorCode::MissingRequest),
            453 => Some(JanusErrorCode::UnknownRequest),
            454 => Some(JanusErrorCode::InvalidJson),
            455 => Some(JanusErrorCode::InvalidJsonObject),
            456 => Some(JanusErrorCode::MissingMandatoryElement),
            457 => Some(JanusErrorCode::InvalidRequestPath),
            458 => Some(JanusErrorCode::SessionNotFound),
            459 => Some(JanusErrorCode::HandleNotFound),
            460 => Some(JanusErrorCode::PluginNotFound),
            461 => Some(JanusErrorCode::PluginAttach),
            462 => Some(JanusErrorCode::PluginMessage),
            463 => Some(JanusErrorCode::PluginDetach),
            464 => Some(JanusErrorCode::JsepUnknownType),
            465 => Some(JanusErrorCode::JsepInvalidSdp),
            466 => Some(JanusErrorCode::TrickleInvalidStream),
            467 => Some(JanusErrorCode::InvalidElementType),
            468 => Some(JanusErrorCode::SessionConflict),
            469 => Some(JanusErrorCode::UnexpectedAnswer),
            470 => Some(JanusErrorCode::TokenNotFound),
            471 => Some(JanusErrorCode::WebrtcState),
            472 => Some(JanusErrorCode::NotAcceptingSessions),
            490 => Some(JanusErrorCode::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for JanusErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `error` object of a Janus error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JanusErrorBody {
    pub code: i64,
    #[serde(default)]
    pub reason: String,
}

impl JanusErrorBody {
    /// Returns the error code as an enum if it's a known code
    pub fn error_code(&self) -> Option<JanusErrorCode> {
        JanusErrorCode::from_code(self.code)
    }
}

impl fmt::Display for JanusErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "Janus error {}", self.code)
        } else {
            write!(f, "Janus error {}: {}", self.code, self.reason)
        }
    }
}
