use crate::config::session_config::SessionConfig;
use crate::error::SessionError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// Session options in their wire/file form.
///
/// Key names follow the Janus JavaScript clients (`timeoutMs`,
/// `keepaliveMs`, `keepAliveRetries`, `multiSession`). A missing key keeps
/// the default; an explicit `null` or `0` disables the feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apisecret: Option<String>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<Option<u64>>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub keepalive_ms: Option<Option<u64>>,

    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub keep_alive_retries: Option<Option<u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_session: Option<bool>,
}

/// Distinguishes an explicit `null` from a missing key
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl SessionOptions {
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml-support")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SessionError> {
        serde_yaml::from_str(yaml).map_err(|e| SessionError::Configuration(e.to_string()))
    }

    /// Load options from a `.json` file, or `.yaml`/`.yml` with the
    /// `yaml-support` feature
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            _ => Self::from_json_str(&content),
        }
    }

    #[cfg(feature = "yaml-support")]
    fn parse_yaml(content: &str) -> Result<Self, SessionError> {
        Self::from_yaml_str(content)
    }

    #[cfg(not(feature = "yaml-support"))]
    fn parse_yaml(_content: &str) -> Result<Self, SessionError> {
        Err(SessionError::Configuration(
            "YAML session options require the yaml-support feature".to_string(),
        ))
    }

    /// Resolve against the defaults into a runtime configuration
    pub fn into_config(self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            verbose: self.verbose.unwrap_or(defaults.verbose),
            timeout: resolve_millis(self.timeout_ms, defaults.timeout),
            keepalive_interval: resolve_millis(self.keepalive_ms, defaults.keepalive_interval),
            keepalive_retries: match self.keep_alive_retries {
                Some(retries) => retries.filter(|&n| n > 0),
                None => defaults.keepalive_retries,
            },
            multi_session: self.multi_session.unwrap_or(defaults.multi_session),
            apisecret: self.apisecret.filter(|s| !s.is_empty()).or(defaults.apisecret),
        }
    }
}

fn resolve_millis(value: Option<Option<u64>>, default: Option<Duration>) -> Option<Duration> {
    match value {
        Some(ms) => ms.filter(|&ms| ms > 0).map(Duration::from_millis),
        None => default,
    }
}

/// Saturates at `u64::MAX` milliseconds
fn to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl From<SessionOptions> for SessionConfig {
    fn from(options: SessionOptions) -> Self {
        options.into_config()
    }
}

impl From<&SessionConfig> for SessionOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            verbose: Some(config.verbose),
            apisecret: config.apisecret.clone(),
            timeout_ms: Some(config.timeout.map(to_millis)),
            keepalive_ms: Some(config.keepalive_interval.map(to_millis)),
            keep_alive_retries: Some(config.keepalive_retries),
            multi_session: Some(config.multi_session),
        }
    }
}
