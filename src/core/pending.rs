use crate::error::SessionError;
use crate::protocol::message::Message;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Completion of a request sent on a session.
///
/// Resolves with the matching response, or fails with a timeout, a
/// protocol error or a disposal error. The request is already on the wire
/// when this is returned; dropping it does not cancel the transaction.
#[derive(Debug)]
pub struct PendingResponse {
    transaction: String,
    receiver: oneshot::Receiver<Result<Message, SessionError>>,
    taken: bool,
}

impl PendingResponse {
    pub(crate) fn new(
        transaction: String,
        receiver: oneshot::Receiver<Result<Message, SessionError>>,
    ) -> Self {
        Self { transaction, receiver, taken: false }
    }

    /// A completion that has already failed
    pub(crate) fn failed(transaction: String, error: SessionError) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(Err(error));
        Self { transaction, receiver, taken: false }
    }

    /// Transaction id the request went out with
    pub fn transaction(&self) -> &str {
        &self.transaction
    }

    /// Non-blocking check: `None` while the transaction is still open.
    /// The outcome is handed out once; later calls return `None`.
    pub fn try_result(&mut self) -> Option<Result<Message, SessionError>> {
        if self.taken {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(SessionError::Disposed),
        };
        self.taken = true;
        Some(result)
    }

    /// Whether [`try_result`](PendingResponse::try_result) already returned the outcome
    pub fn is_taken(&self) -> bool {
        self.taken
    }
}

impl Future for PendingResponse {
    type Output = Result<Message, SessionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(SessionError::Disposed)))
    }
}
