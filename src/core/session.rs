use crate::config::{SessionConfig, SessionOptions};
use crate::core::diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticSink, LogSink};
use crate::core::keepalive::KeepaliveState;
use crate::core::pending::PendingResponse;
use crate::core::transport::Transport;
use crate::error::SessionError;
use crate::protocol::event_registry::{EventRegistry, Listener};
use crate::protocol::identifier::{id_matches, JanusId};
use crate::protocol::message::{Message, Request};
use crate::protocol::timer::Timer;
use crate::protocol::transaction_table::{TransactionStatistics, TransactionTable};
use serde::Serialize;
use serde_json::{json, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// Decides whether a response rejects its transaction instead of resolving it
pub type ErrorPredicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Default error predicate: `{"janus": "error"}`
pub fn default_is_error(message: &Message) -> bool {
    message.janus() == Some("error")
}

/// A Janus session: one signalling context multiplexing transactions and
/// events over a single transport.
///
/// Cloning is cheap and every clone drives the same session. Timeouts and
/// keepalives run as Tokio tasks, so a session configured with either must
/// be used from within a Tokio runtime.
///
/// See https://janus.conf.meetecho.com/docs/rest.html#sessions.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    pub(crate) config: SessionConfig,
    transport: Box<dyn Transport>,
    diagnostics: Box<dyn DiagnosticSink>,
    state: Mutex<SessionState>,
}

/// Everything mutable about a session, guarded by one lock
pub(crate) struct SessionState {
    pub(crate) id: Option<JanusId>,
    pub(crate) transactions: TransactionTable,
    pub(crate) events: EventRegistry,
    pub(crate) keepalive: KeepaliveState,
    pub(crate) disposed: bool,
    is_error: ErrorPredicate,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Option<JanusId>,
    pub options: SessionOptions,
    pub keepalives_tried: u32,
}

/// Builder for sessions with a custom diagnostic sink or error predicate
pub struct SessionBuilder {
    transport: Box<dyn Transport>,
    config: SessionConfig,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
    is_error: Option<ErrorPredicate>,
}

impl SessionBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }

    pub fn error_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.is_error = Some(Arc::new(predicate));
        self
    }

    pub fn build(self) -> Result<Session, SessionError> {
        self.config.validate()?;

        let state = SessionState {
            id: None,
            transactions: TransactionTable::new(),
            events: EventRegistry::new(),
            keepalive: KeepaliveState::default(),
            disposed: false,
            is_error: self.is_error.unwrap_or_else(|| Arc::new(default_is_error)),
        };

        Ok(Session {
            inner: Arc::new(SessionInner {
                config: self.config,
                transport: self.transport,
                diagnostics: self.diagnostics.unwrap_or_else(|| Box::new(LogSink)),
                state: Mutex::new(state),
            }),
        })
    }
}

impl Session {
    /// Create an unbound session writing to `transport`. Call
    /// [`Session::create`] to obtain a server-side session id.
    pub fn new(transport: impl Transport + 'static, config: SessionConfig) -> Result<Self, SessionError> {
        Self::builder(transport).config(config).build()
    }

    pub fn builder(transport: impl Transport + 'static) -> SessionBuilder {
        SessionBuilder {
            transport: Box::new(transport),
            config: SessionConfig::default(),
            diagnostics: None,
            is_error: None,
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, level: DiagnosticLevel, data: impl Into<Value>) {
        self.inner.diagnostics.emit(Diagnostic::new(level, data));
    }

    /// Server-assigned session id, once `create` has succeeded
    pub fn id(&self) -> Option<JanusId> {
        self.state().id.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Creates this session on the Janus server and sets its id
    pub async fn create(&self) -> Result<Message, SessionError> {
        if let Some(id) = self.id() {
            return Err(SessionError::AlreadyCreated(id));
        }

        let response = self.send("create", None).await?;
        let id = response.data_id().ok_or_else(|| SessionError::MalformedResponse {
            kind: "create".to_string(),
            reason: "missing data.id".to_string(),
        })?;

        let mut state = self.state();
        if let Some(existing) = &state.id {
            return Err(SessionError::AlreadyCreated(existing.clone()));
        }
        state.id = Some(id);
        Ok(response)
    }

    /// Destroys this session on the server, then disposes it locally. Janus
    /// also closes the signalling transport and any open WebRTC connections.
    pub async fn destroy(&self) -> Result<Message, SessionError> {
        let response = self.send("destroy", None).await?;
        self.dispose();
        Ok(response)
    }

    /// Tear the session down: no further messages are processed, listeners
    /// are dropped and outstanding transactions are rejected. Idempotent.
    pub fn dispose(&self) {
        let drained = {
            let mut state = self.state();
            state.disposed = true;
            state.keepalive.cancel();
            state.events.clear();
            state.transactions.drain()
        };

        for (_, pending) in drained {
            pending.settle(Err(SessionError::Disposed));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state().disposed
    }

    /// Replace the error predicate, e.g. to recognise plugin-specific error
    /// conventions inside `event` payloads
    pub fn set_error_predicate<F>(&self, predicate: F)
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.state().is_error = Arc::new(predicate);
    }

    /// Whether this message represents an error and should reject its transaction
    pub fn is_error(&self, message: &Message) -> bool {
        let predicate = self.state().is_error.clone();
        predicate(message)
    }

    /// Registers a callback fired for every inbound message whose `janus`
    /// field equals `event`
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.state().events.register(event, Arc::new(listener));
    }

    /// Sends a request on this session, beginning a new transaction.
    ///
    /// The message is stamped and handed to the transport before this
    /// returns; the returned future settles when a response with the same
    /// transaction arrives, when the session timeout elapses, or when the
    /// session is disposed.
    pub fn send(&self, kind: &str, payload: Option<Message>) -> PendingResponse {
        let (completion, receiver) = oneshot::channel();
        let payload = payload.unwrap_or_default();

        let request = {
            let mut state = self.state();
            let request = Request::new(
                kind,
                payload,
                state.id.as_ref(),
                self.inner.config.apisecret.as_deref(),
            );
            let transaction = request.transaction.clone();

            if state.disposed {
                return PendingResponse::failed(transaction, SessionError::Disposed);
            }
            if state.transactions.contains(&transaction) {
                return PendingResponse::failed(
                    transaction.clone(),
                    SessionError::DuplicateTransaction { transaction },
                );
            }

            let seq = state.transactions.next_seq();
            let timer = self
                .inner
                .config
                .timeout
                .map(|timeout| self.start_transaction_timer(transaction.clone(), seq, timeout));
            if let Err(error) = state.transactions.insert(transaction.clone(), kind, seq, completion, timer) {
                return PendingResponse::failed(transaction, error);
            }
            request
        };

        let transaction = request.transaction.clone();
        let wire = match request.to_json() {
            Ok(wire) => wire,
            Err(error) => {
                if let Some(pending) = self.state().transactions.take(&transaction) {
                    pending.settle(Err(error));
                }
                return PendingResponse::new(transaction, receiver);
            }
        };

        if self.inner.config.verbose {
            self.log_outgoing(&request);
        }

        self.inner.transport.transmit(wire);
        self.touch_keepalive(kind);

        PendingResponse::new(transaction, receiver)
    }

    fn start_transaction_timer(&self, transaction: String, seq: u64, timeout: Duration) -> Timer {
        let session = Arc::downgrade(&self.inner);
        Timer::start(timeout, move || async move {
            if let Some(inner) = session.upgrade() {
                Session { inner }.expire_transaction(transaction, seq, timeout);
            }
        })
    }

    fn expire_transaction(&self, transaction: String, seq: u64, timeout: Duration) {
        let pending = self.state().transactions.take_if_current(&transaction, seq);
        if let Some(pending) = pending {
            if self.inner.config.verbose {
                self.emit(
                    DiagnosticLevel::Debug,
                    format!("Janus transaction {} ({}) timed out.", transaction, pending.kind()),
                );
            }
            pending.expire(SessionError::Timeout { transaction, timeout });
        }
    }

    /// Callback for every JSON signalling message received on the transport,
    /// responses and unsolicited events alike. Responses settle the
    /// transaction they belong to.
    pub fn receive(&self, message: Message) {
        let own_id = self.id();
        let verbose = self.inner.config.verbose;
        let same_session = id_matches(own_id.as_ref(), message.session_id());

        if self.inner.config.multi_session && !same_session {
            if verbose {
                self.emit(
                    DiagnosticLevel::Debug,
                    format!(
                        "Janus multi-session enabled: {} ignored as this session's current id is {}.",
                        describe(message.session_id()),
                        describe_id(own_id.as_ref()),
                    ),
                );
            }
            return;
        }

        if verbose {
            self.log_incoming(&message);
        }

        if !same_session {
            self.emit(
                DiagnosticLevel::Warn,
                format!(
                    "Incorrect session ID received in Janus signalling message: was {}, expected {}.",
                    describe(message.session_id()),
                    describe_id(own_id.as_ref()),
                ),
            );
        }

        if let Some(event) = message.janus() {
            let listeners = self.state().events.listeners(event);
            self.dispatch(&listeners, &message);
        }

        let Some(transaction) = message.transaction() else {
            return;
        };

        let (pending, is_error) = {
            let mut state = self.state();
            let Some(kind) = state.transactions.kind(&transaction) else {
                // not ours: sent outside `send`, answered twice, timed out or disposed
                return;
            };
            if message.janus() == Some("ack") && kind == "message" {
                // plugin is processing asynchronously; the real answer follows
                return;
            }
            (state.transactions.take(&transaction), state.is_error.clone())
        };

        if let Some(pending) = pending {
            let result = if is_error(&message) {
                Err(SessionError::Protocol(message))
            } else {
                Ok(message)
            };
            pending.settle(result);
        }
    }

    /// Decode a raw text frame and [`receive`](Session::receive) it
    pub fn receive_str(&self, frame: &str) -> Result<(), SessionError> {
        let message = Message::from_json(frame)?;
        self.receive(message);
        Ok(())
    }

    fn dispatch(&self, listeners: &[Listener], message: &Message) {
        for listener in listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(message))).is_err() {
                self.emit(
                    DiagnosticLevel::Error,
                    json!({
                        "message": "Janus event listener panicked",
                        "event": message.janus(),
                    }),
                );
            }
        }
    }

    fn log_outgoing(&self, request: &Request) {
        let mut kind = request.janus.as_str();
        if kind == "message" {
            if let Some(jsep_type) = request.body.jsep_type() {
                kind = jsep_type;
            }
        }
        let message = format!("> Outgoing Janus {} (#{}): ", kind, request.transaction);
        let signal = serde_json::to_value(request).unwrap_or(Value::Null);
        self.emit(DiagnosticLevel::Debug, json!({ "message": message, "signal": signal }));
    }

    fn log_incoming(&self, signal: &Message) {
        let kind = signal.janus().unwrap_or("signal");
        let message = match signal.transaction() {
            Some(transaction) => format!("< Incoming Janus {} (#{}): ", kind, transaction),
            None => format!("< Incoming Janus {}: ", kind),
        };
        self.emit(DiagnosticLevel::Debug, json!({ "message": message, "signal": signal }));
    }

    /// Number of transactions awaiting a response
    pub fn pending_count(&self) -> usize {
        self.state().transactions.len()
    }

    /// Ids of transactions awaiting a response
    pub fn pending_transactions(&self) -> Vec<String> {
        self.state().transactions.ids()
    }

    pub fn transaction_statistics(&self) -> TransactionStatistics {
        self.state().transactions.statistics()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.state().events.listener_count(event)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            id: state.id.clone(),
            options: SessionOptions::from(&self.inner.config),
            keepalives_tried: state.keepalive.failures,
        }
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "undefined".to_string(),
    }
}

fn describe_id(id: Option<&JanusId>) -> String {
    id.map_or_else(|| "undefined".to_string(), JanusId::to_string)
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Session")
            .field("id", &state.id)
            .field("pending", &state.transactions.len())
            .field("events", &state.events)
            .field("disposed", &state.disposed)
            .finish()
    }
}
