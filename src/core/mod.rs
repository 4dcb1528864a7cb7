pub mod diagnostics;
pub mod handle;
pub mod keepalive;
pub mod pending;
pub mod session;
pub mod transport;

pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticSink, LogSink};
pub use handle::{HandleSnapshot, PluginHandle};
pub use keepalive::KEEPALIVE;
pub use pending::PendingResponse;
pub use session::{default_is_error, ErrorPredicate, Session, SessionBuilder, SessionSnapshot};
pub use transport::{ChannelTransport, Transport};
