use tokio::sync::mpsc;

/// Outbound half of the signalling transport.
///
/// Receives one JSON-encoded message per call and must not block; delivery
/// is fire-and-forget from the session's point of view. Any
/// `Fn(String) + Send + Sync` closure is a transport.
pub trait Transport: Send + Sync {
    fn transmit(&self, payload: String);
}

impl<F> Transport for F
where
    F: Fn(String) + Send + Sync,
{
    fn transmit(&self, payload: String) {
        self(payload)
    }
}

/// Transport that queues outgoing frames on an unbounded channel, for a
/// socket writer task (or a test) to drain
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Transport for ChannelTransport {
    fn transmit(&self, payload: String) {
        if self.sender.send(payload).is_err() {
            log::warn!("Janus transport channel closed, outgoing message dropped");
        }
    }
}
