use crate::core::pending::PendingResponse;
use crate::core::session::Session;
use crate::error::SessionError;
use crate::protocol::identifier::{id_matches, JanusId};
use crate::protocol::message::{Message, HANDLE_ID};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A handle to a single Janus plugin on a session. Each WebRTC connection
/// to the server is associated with one handle; once attached, the handle's
/// id tags its outgoing requests and selects its inbound events.
///
/// See https://janus.conf.meetecho.com/docs/rest.html#handles.
#[derive(Clone)]
pub struct PluginHandle {
    session: Session,
    state: HandleState,
}

/// Identifiers shared by every clone of a handle and by its listeners.
/// Holds no session reference, so listeners capturing it form no cycle.
#[derive(Clone, Default)]
struct HandleState(Arc<Mutex<HandleSnapshot>>);

/// Serializable view of a handle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleSnapshot {
    pub room_id: Option<JanusId>,
    pub id: Option<JanusId>,
    pub feed_id: Option<JanusId>,
}

impl HandleState {
    fn lock(&self) -> MutexGuard<'_, HandleSnapshot> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PluginHandle {
    /// A detached handle on `session`; call [`PluginHandle::attach`] next
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            state: HandleState::default(),
        }
    }

    /// A handle for a plugin attachment that already exists on the server
    pub fn with_id(session: &Session, id: impl Into<JanusId>) -> Self {
        let handle = Self::new(session);
        handle.state.lock().id = Some(id.into());
        handle
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn id(&self) -> Option<JanusId> {
        self.state.lock().id.clone()
    }

    pub fn room_id(&self) -> Option<JanusId> {
        self.state.lock().room_id.clone()
    }

    pub fn set_room_id(&self, room_id: impl Into<JanusId>) {
        self.state.lock().room_id = Some(room_id.into());
    }

    pub fn feed_id(&self) -> Option<JanusId> {
        self.state.lock().feed_id.clone()
    }

    pub fn set_feed_id(&self, feed_id: impl Into<JanusId>) {
        self.state.lock().feed_id = Some(feed_id.into());
    }

    pub fn snapshot(&self) -> HandleSnapshot {
        self.state.lock().clone()
    }

    /// Attaches this handle to `plugin` on the server and sets its id
    pub async fn attach(&self, plugin: &str) -> Result<Message, SessionError> {
        let payload = Message::new()
            .with("plugin", plugin)
            .with("force-bundle", true)
            .with("force-rtcp-mux", true);

        let response = self.session.send("attach", Some(payload)).await?;
        let id = response.data_id().ok_or_else(|| SessionError::MalformedResponse {
            kind: "attach".to_string(),
            reason: "missing data.id".to_string(),
        })?;

        self.state.lock().id = Some(id);
        Ok(response)
    }

    /// Registers a callback for inbound messages of type `event` whose
    /// `sender` is this handle. The registration outlives the handle value
    /// and lasts until the session is disposed.
    pub fn on<F>(&self, event: &str, callback: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let state = self.state.clone();
        self.session.on(event, move |message| {
            let is_ours = id_matches(state.lock().id.as_ref(), message.sender());
            if is_ours {
                callback(message);
            }
        });
    }

    /// Sends a request on behalf of this handle, stamped with its `handle_id`
    pub fn send(&self, kind: &str, payload: Option<Message>) -> PendingResponse {
        let mut payload = payload.unwrap_or_default();
        if !payload.contains_key(HANDLE_ID) {
            if let Some(id) = self.id() {
                payload.insert(HANDLE_ID, id.to_value());
            }
        }
        self.session.send(kind, Some(payload))
    }

    /// Sends a plugin-specific message
    pub fn send_message(&self, body: Value) -> PendingResponse {
        self.send("message", Some(Message::new().with("body", body)))
    }

    /// Sends a JSEP offer or answer, with an optional plugin message body
    pub fn send_jsep(&self, jsep: Value, body: Option<Value>) -> PendingResponse {
        let payload = Message::new()
            .with("body", body.unwrap_or_else(|| json!({})))
            .with("jsep", jsep);
        self.send("message", Some(payload))
    }

    /// Sends one ICE candidate, or a batch when given an array
    pub fn send_trickle(&self, candidate: Value) -> PendingResponse {
        let payload = match candidate {
            Value::Array(_) => Message::new().with("candidates", candidate),
            other => Message::new().with("candidate", other),
        };
        self.send("trickle", Some(payload))
    }

    /// Tears down the PeerConnection; Janus usually does this on its own
    pub fn hangup(&self) -> PendingResponse {
        self.send("hangup", None)
    }

    /// Detaches this handle from its plugin
    pub fn detach(&self) -> PendingResponse {
        self.send("detach", None)
    }

    /// Videoroom: create a room and remember its id
    pub async fn create_room(&self) -> Result<Message, SessionError> {
        let response = self.send_message(json!({ "request": "create" })).await?;
        let room = response
            .pointer("/plugindata/data/room")
            .and_then(JanusId::from_value)
            .ok_or_else(|| SessionError::MalformedResponse {
                kind: "create room".to_string(),
                reason: "missing plugindata.data.room".to_string(),
            })?;

        self.state.lock().room_id = Some(room);
        Ok(response)
    }

    /// Videoroom: join the current room as a publisher
    pub fn join_publisher(&self) -> PendingResponse {
        let mut body = json!({ "request": "join", "ptype": "publisher" });
        if let Some(room) = self.room_id() {
            body["room"] = room.to_value();
        }
        self.send_message(body)
    }

    /// Videoroom: subscribe to publisher `feed` in the current room
    pub fn join_subscriber(&self, feed: impl Into<JanusId>) -> PendingResponse {
        let feed = feed.into();
        let mut body = json!({ "request": "join", "ptype": "subscriber", "feed": feed.to_value() });
        if let Some(room) = self.room_id() {
            body["room"] = room.to_value();
        }
        self.state.lock().feed_id = Some(feed);
        self.send_message(body)
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle").field("state", &self.snapshot()).finish()
    }
}
