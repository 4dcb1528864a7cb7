use crate::protocol::message::Message;
use std::collections::HashMap;
use std::sync::Arc;

/// Event listener invoked with each inbound message of its event type
pub type Listener = Arc<dyn Fn(&Message) + Send + Sync>;

/// Listeners keyed by event type (`janus` field), in registration order
#[derive(Default)]
pub struct EventRegistry {
    listeners: HashMap<String, Vec<Listener>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event: &str, listener: Listener) {
        self.listeners.entry(event.to_string()).or_default().push(listener);
    }

    /// Snapshot of the listeners for an event type, so they can be invoked
    /// after the owning lock is released
    pub fn listeners(&self, event: &str) -> Vec<Listener> {
        self.listeners.get(event).cloned().unwrap_or_default()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }

    pub fn event_types(&self) -> Vec<String> {
        self.listeners.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, listeners)| (event.as_str(), listeners.len()))
            .collect();
        f.debug_struct("EventRegistry").field("listeners", &counts).finish()
    }
}
