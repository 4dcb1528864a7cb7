pub mod janus_error;
pub mod session_error;

pub use janus_error::{JanusErrorBody, JanusErrorCode};
pub use session_error::SessionError;

pub type Result<T> = std::result::Result<T, SessionError>;
