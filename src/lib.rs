//! # RustJanus Session
//!
//! Signalling session client for the Janus WebRTC Gateway. A [`Session`]
//! multiplexes request/response transactions and unsolicited events over a
//! single bidirectional transport (WebSocket, HTTP long-polling, ...).
//!
//! ## Features
//!
//! - **Transaction Correlation**: UUID-tagged requests resolved by matching responses
//! - **Ack Handling**: asynchronous plugin requests wait past the intermediate `ack`
//! - **Timeouts**: per-session response timeout, rejected completions carry the txid
//! - **Event Dispatch**: ordered per-event-type listeners, panic-isolated
//! - **Keepalive**: debounced liveness probes with bounded retry and teardown
//! - **Plugin Handles**: `handle_id` stamping and `sender`-filtered events
//!
//! The transport itself stays outside the crate: the session writes JSON
//! text through a [`Transport`] and the integrator feeds every inbound frame
//! to [`Session::receive`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_janus_session::{ChannelTransport, PluginHandle, Session, SessionConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (transport, mut outgoing) = ChannelTransport::new();
//!     let session = Session::new(transport, SessionConfig::default())?;
//!
//!     // Forward `outgoing` to the socket and call `session.receive_str(frame)`
//!     // for every frame read back from it.
//!     tokio::spawn(async move {
//!         while let Some(frame) = outgoing.recv().await {
//!             println!("-> {}", frame);
//!         }
//!     });
//!
//!     session.create().await?;
//!
//!     let handle = PluginHandle::new(&session);
//!     handle.attach("janus.plugin.videoroom").await?;
//!     handle.on("event", |event| println!("event: {}", event));
//!
//!     let rooms = handle.send_message(json!({ "request": "list" })).await?;
//!     println!("{}", rooms);
//!
//!     session.destroy().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;

// Session exports
pub use crate::core::{
    default_is_error, ChannelTransport, Diagnostic, DiagnosticLevel, DiagnosticSink,
    ErrorPredicate, HandleSnapshot, LogSink, PendingResponse, PluginHandle, Session,
    SessionBuilder, SessionSnapshot, Transport,
};

// Protocol exports
pub use protocol::{JanusId, Message, Request, TransactionStatistics};

// Configuration exports
pub use config::{SessionConfig, SessionOptions};

// Error exports
pub use error::{JanusErrorBody, JanusErrorCode, SessionError};

// Result type alias
pub type Result<T> = std::result::Result<T, SessionError>;

// Re-export common dependencies for convenience
pub use serde_json::{json, Value as JsonValue};

/// Prelude module for convenient importing
pub mod prelude {
    pub use crate::{
        json, ChannelTransport, Diagnostic, DiagnosticLevel, JanusId, JsonValue, Message,
        PendingResponse, PluginHandle, Result, Session, SessionConfig, SessionError,
        SessionOptions, Transport,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
