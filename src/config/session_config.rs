use crate::error::SessionError;
use std::time::Duration;

/// Configuration for a Janus session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Emit a debug diagnostic for every inbound and outbound message (Default: false)
    pub verbose: bool,

    /// Per-transaction response timeout, `None` waits forever (Default: 10s)
    pub timeout: Option<Duration>,

    /// Quiet period after which a keepalive is sent, `None` disables keepalives (Default: 30s)
    pub keepalive_interval: Option<Duration>,

    /// Consecutive keepalive failures tolerated before the session is disposed,
    /// `None` for unlimited (Default: unlimited)
    pub keepalive_retries: Option<u32>,

    /// Drop inbound messages addressed to another session on a shared transport (Default: false)
    pub multi_session: bool,

    /// Shared secret stamped on every outgoing request (Default: none)
    pub apisecret: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            timeout: Some(Duration::from_secs(10)),
            keepalive_interval: Some(Duration::from_secs(30)),
            keepalive_retries: None,
            multi_session: false,
            apisecret: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with all default values
    pub fn new() -> Self {
        Self::default()
    }

    /// No response timeout and no keepalives; transactions wait until a
    /// response arrives or the session is disposed.
    ///
    /// Re-enabling keepalives on top of this preset leaves every unanswered
    /// keepalive pending forever: each probe adds a table entry and a watcher
    /// task until the session is disposed. Pair keepalives with a timeout.
    pub fn without_timers() -> Self {
        Self {
            timeout: None,
            keepalive_interval: None,
            ..Self::default()
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the keepalive interval. Without a response [`timeout`](Self::timeout)
    /// an unanswered keepalive never fails, so it neither counts toward
    /// `keepalive_retries` nor gets cleaned up before disposal.
    pub fn with_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.keepalive_interval = interval;
        self
    }

    pub fn with_keepalive_retries(mut self, retries: Option<u32>) -> Self {
        self.keepalive_retries = retries;
        self
    }

    pub fn with_multi_session(mut self, multi_session: bool) -> Self {
        self.multi_session = multi_session;
        self
    }

    pub fn with_apisecret(mut self, apisecret: impl Into<String>) -> Self {
        self.apisecret = Some(apisecret.into());
        self
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.timeout.map_or(false, |t| t.is_zero()) {
            return Err(SessionError::Configuration(
                "timeout must be greater than 0 (use None to disable)".to_string(),
            ));
        }

        if self.keepalive_interval.map_or(false, |t| t.is_zero()) {
            return Err(SessionError::Configuration(
                "keepalive_interval must be greater than 0 (use None to disable)".to_string(),
            ));
        }

        if self.keepalive_retries == Some(0) {
            return Err(SessionError::Configuration(
                "keepalive_retries must be greater than 0 (use None for unlimited)".to_string(),
            ));
        }

        if self.apisecret.as_deref() == Some("") {
            return Err(SessionError::Configuration("apisecret must not be empty".to_string()));
        }

        Ok(())
    }
}
