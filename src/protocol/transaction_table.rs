use crate::error::SessionError;
use crate::protocol::message::Message;
use crate::protocol::timer::Timer;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::oneshot;

/// Completion handle of a pending request
pub type Completion = oneshot::Sender<Result<Message, SessionError>>;

/// A request awaiting its response
#[derive(Debug)]
pub struct PendingTransaction {
    kind: String,
    seq: u64,
    completion: Completion,
    timer: Option<Timer>,
    created: Instant,
}

impl PendingTransaction {
    /// Request kind this transaction was opened with (`message`, `attach`, ...)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Settle the transaction, cancelling its timeout. A caller that already
    /// dropped its end of the completion is not an error.
    pub fn settle(self, result: Result<Message, SessionError>) {
        if let Some(timer) = self.timer {
            timer.cancel();
        }
        let _ = self.completion.send(result);
    }

    /// Settle from inside the timeout task itself, leaving its timer alone
    pub fn expire(self, error: SessionError) {
        let _ = self.completion.send(Err(error));
    }
}

/// Statistics about pending transactions
#[derive(Debug, Clone)]
pub struct TransactionStatistics {
    pub pending_count: usize,
    pub average_age: f64,
    pub oldest_transaction: Option<TransactionInfo>,
}

/// Information about a specific transaction
#[derive(Debug, Clone)]
pub struct TransactionInfo {
    pub id: String,
    pub kind: String,
    pub age: f64,
}

/// Outstanding transactions keyed by transaction id.
///
/// Not synchronised on its own: the owning session serialises every access
/// behind its state lock, so lookup and removal happen in one step.
#[derive(Debug, Default)]
pub struct TransactionTable {
    pending: HashMap<String, PendingTransaction>,
    next_seq: u64,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number the next inserted transaction will carry.
    /// Timers capture it so a stale timeout never removes a reused id.
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Track a new transaction
    pub fn insert(
        &mut self,
        id: String,
        kind: &str,
        seq: u64,
        completion: Completion,
        timer: Option<Timer>,
    ) -> Result<(), SessionError> {
        if self.pending.contains_key(&id) {
            if let Some(timer) = timer {
                timer.cancel();
            }
            return Err(SessionError::DuplicateTransaction { transaction: id });
        }

        self.pending.insert(
            id,
            PendingTransaction {
                kind: kind.to_string(),
                seq,
                completion,
                timer,
                created: Instant::now(),
            },
        );
        Ok(())
    }

    /// Request kind of a tracked transaction
    pub fn kind(&self, id: &str) -> Option<&str> {
        self.pending.get(id).map(PendingTransaction::kind)
    }

    /// Remove a transaction for settlement
    pub fn take(&mut self, id: &str) -> Option<PendingTransaction> {
        self.pending.remove(id)
    }

    /// Remove a transaction only if it is still the one a timer was armed for
    pub fn take_if_current(&mut self, id: &str, seq: u64) -> Option<PendingTransaction> {
        match self.pending.get(id) {
            Some(pending) if pending.seq == seq => self.pending.remove(id),
            _ => None,
        }
    }

    /// Remove every outstanding transaction
    pub fn drain(&mut self) -> Vec<(String, PendingTransaction)> {
        self.pending.drain().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    /// Get statistics about pending transactions
    pub fn statistics(&self) -> TransactionStatistics {
        let now = Instant::now();
        let mut total_age = 0.0;
        let mut oldest: Option<TransactionInfo> = None;

        for (id, pending) in &self.pending {
            let age = now.duration_since(pending.created).as_secs_f64();
            total_age += age;

            if oldest.as_ref().map_or(true, |info| age > info.age) {
                oldest = Some(TransactionInfo {
                    id: id.clone(),
                    kind: pending.kind.clone(),
                    age,
                });
            }
        }

        let average_age = if self.pending.is_empty() {
            0.0
        } else {
            total_age / self.pending.len() as f64
        };

        TransactionStatistics {
            pending_count: self.pending.len(),
            average_age,
            oldest_transaction: oldest,
        }
    }
}
