use crate::core::diagnostics::DiagnosticLevel;
use crate::core::session::{Session, SessionState};
use crate::error::SessionError;
use crate::protocol::message::Message;
use crate::protocol::timer::Timer;
use serde_json::json;
use std::sync::Arc;

/// Request kind of the liveness probe
pub const KEEPALIVE: &str = "keepalive";

/// Keepalive countdown and its consecutive-failure counter
#[derive(Debug, Default)]
pub(crate) struct KeepaliveState {
    timer: Option<Timer>,
    generation: u64,
    pub(crate) failures: u32,
}

impl KeepaliveState {
    /// Stop the countdown. Bumping the generation also disarms a timer that
    /// already fired and is waiting for the session lock.
    pub(crate) fn cancel(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.timer.as_ref().map_or(false, |timer| !timer.is_finished())
    }
}

impl Session {
    /// Restart the keepalive countdown and clear the failure counter
    pub fn reset_keepalive(&self) {
        let mut state = self.state();
        state.keepalive.failures = 0;
        self.arm_keepalive(&mut state);
    }

    /// Outbound activity: debounce the next keepalive. Only traffic other than
    /// the keepalive itself proves the session is healthy again.
    pub(crate) fn touch_keepalive(&self, kind: &str) {
        let mut state = self.state();
        if kind != KEEPALIVE {
            state.keepalive.failures = 0;
        }
        self.arm_keepalive(&mut state);
    }

    fn arm_keepalive(&self, state: &mut SessionState) {
        state.keepalive.cancel();
        if state.disposed {
            return;
        }
        let Some(interval) = self.inner.config.keepalive_interval else {
            return;
        };

        let generation = state.keepalive.generation;
        let session = Arc::downgrade(&self.inner);
        state.keepalive.timer = Some(Timer::start(interval, move || async move {
            if let Some(inner) = session.upgrade() {
                Session { inner }.fire_keepalive(generation);
            }
        }));
    }

    fn fire_keepalive(&self, generation: u64) {
        {
            let state = self.state();
            if state.disposed || state.keepalive.generation != generation {
                return;
            }
        }

        let pending = self.send(KEEPALIVE, None);
        let session = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let result = pending.await;
            if let Some(inner) = session.upgrade() {
                Session { inner }.keepalive_settled(result);
            }
        });
    }

    fn keepalive_settled(&self, result: Result<Message, SessionError>) {
        let error = match result {
            Ok(_) => {
                self.state().keepalive.failures = 0;
                return;
            }
            // torn down while the probe was in flight
            Err(SessionError::Disposed) => return,
            Err(error) => error,
        };

        self.emit(
            DiagnosticLevel::Error,
            json!({ "message": "Error received from keepalive: ", "stack": error.to_string() }),
        );

        let failures = {
            let mut state = self.state();
            state.keepalive.failures += 1;
            state.keepalive.failures
        };
        let session_id = self.id().map(|id| id.to_value());
        let mut dispose = false;

        if let Some(limit) = self.inner.config.keepalive_retries {
            if failures > limit {
                self.emit(
                    DiagnosticLevel::Error,
                    json!({
                        "message": "Keep alive retry limit reached. Disposing session.",
                        "session": session_id,
                    }),
                );
                dispose = true;
            } else {
                self.emit(
                    DiagnosticLevel::Warn,
                    json!({
                        "message": format!(
                            "Keep alive failed. This will retry {} more times, unless the session doesn't exist anymore.",
                            limit - failures
                        ),
                        "session": session_id,
                    }),
                );
            }
        }

        if error.is_session_not_found() {
            self.emit(
                DiagnosticLevel::Error,
                json!({
                    "message": "Disposing non-existent session",
                    "session": error.response().and_then(|m| m.session_id()).cloned(),
                }),
            );
            dispose = true;
        }

        if dispose {
            self.dispose();
            self.state().keepalive.failures = 0;
        }
    }

    /// Consecutive keepalive failures since the last healthy exchange
    pub fn keepalives_tried(&self) -> u32 {
        self.state().keepalive.failures
    }

    /// Whether a keepalive countdown is running
    pub fn is_keepalive_armed(&self) -> bool {
        self.state().keepalive.is_armed()
    }
}
