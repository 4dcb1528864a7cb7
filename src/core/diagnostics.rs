use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `log` target used by [`LogSink`]
pub const LOG_TARGET: &str = "janus_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warn,
    Debug,
    Error,
}

/// A diagnostic record produced by a session
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub level: DiagnosticLevel,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, data: impl Into<Value>) -> Self {
        Self {
            level,
            data: data.into(),
            timestamp: Utc::now(),
        }
    }

    /// The human-readable part of the record: the data itself when it is a
    /// string, otherwise its `message` field
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            Value::String(s) => Some(s),
            other => other.get("message").and_then(Value::as_str),
        }
    }
}

/// Receiver of session diagnostics. Closures taking a [`Diagnostic`] are sinks.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn emit(&self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Default sink forwarding to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let text = match &diagnostic.data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match diagnostic.level {
            DiagnosticLevel::Warn => log::warn!(target: LOG_TARGET, "{}", text),
            DiagnosticLevel::Debug => log::debug!(target: LOG_TARGET, "{}", text),
            DiagnosticLevel::Error => log::error!(target: LOG_TARGET, "{}", text),
        }
    }
}
