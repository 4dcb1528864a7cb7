#![allow(dead_code)]

use rust_janus_session::*;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

/// Initialise test logging once per binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a message from a JSON literal
pub fn msg(value: JsonValue) -> Message {
    Message::from_value(value).unwrap()
}

/// Transport that records every outgoing frame
#[derive(Clone, Default)]
pub struct RecordingTransport {
    frames: Arc<Mutex<Vec<String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded outgoing frames, oldest first
    pub fn sent(&self) -> Vec<JsonValue> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    fn transmit(&self, payload: String) {
        self.frames.lock().unwrap().push(payload);
    }
}

/// Diagnostic sink that keeps every record
#[derive(Clone, Default)]
pub struct DiagnosticCollector {
    records: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().unwrap().clone()
    }

    pub fn at_level(&self, level: DiagnosticLevel) -> Vec<Diagnostic> {
        self.records().into_iter().filter(|d| d.level == level).collect()
    }

    /// Messages of all records containing `needle`
    pub fn containing(&self, needle: &str) -> Vec<Diagnostic> {
        self.records()
            .into_iter()
            .filter(|d| d.message().map_or(false, |m| m.contains(needle)))
            .collect()
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn emit(&self, diagnostic: Diagnostic) {
        self.records.lock().unwrap().push(diagnostic);
    }
}

/// Session without timeouts or keepalives, recording its traffic
pub fn create_quiet_session() -> (Session, RecordingTransport, DiagnosticCollector) {
    create_test_session(SessionConfig::without_timers())
}

/// Session with the given configuration, recording its traffic
pub fn create_test_session(config: SessionConfig) -> (Session, RecordingTransport, DiagnosticCollector) {
    init_logging();
    let transport = RecordingTransport::new();
    let diagnostics = DiagnosticCollector::new();
    let session = Session::builder(transport.clone())
        .config(config)
        .diagnostics(diagnostics.clone())
        .build()
        .unwrap();
    (session, transport, diagnostics)
}

/// Session writing to a channel, for tests that answer requests from a task
pub fn create_channel_session(
    config: SessionConfig,
) -> (Session, UnboundedReceiver<String>, DiagnosticCollector) {
    init_logging();
    let (transport, outgoing) = ChannelTransport::new();
    let diagnostics = DiagnosticCollector::new();
    let session = Session::builder(transport)
        .config(config)
        .diagnostics(diagnostics.clone())
        .build()
        .unwrap();
    (session, outgoing, diagnostics)
}

/// Spawn a fake Janus server: every outgoing request is passed to `respond`,
/// and whatever it returns is fed back into the session
pub fn spawn_fake_server<F>(session: &Session, mut outgoing: UnboundedReceiver<String>, respond: F)
where
    F: Fn(&JsonValue) -> Option<JsonValue> + Send + 'static,
{
    let session = session.clone();
    tokio::spawn(async move {
        while let Some(frame) = outgoing.recv().await {
            let request: JsonValue = serde_json::from_str(&frame).unwrap();
            if let Some(reply) = respond(&request) {
                session.receive(msg(reply));
            }
        }
    });
}

/// Drain queued frames without waiting
pub fn drain_frames(outgoing: &mut UnboundedReceiver<String>) -> Vec<JsonValue> {
    let mut frames = Vec::new();
    while let Ok(frame) = outgoing.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}

/// A `success` reply carrying `data.id`
pub fn success_with_id(request: &JsonValue, id: u64) -> JsonValue {
    json!({
        "janus": "success",
        "transaction": request["transaction"],
        "data": { "id": id }
    })
}
