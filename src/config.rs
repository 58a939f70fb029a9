use std::env;
use std::time::Duration;

use crate::error::{LoungeError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Connection settings for [`crate::LoungeClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend root, without a trailing slash.
    pub base_url: String,
    pub token: Option<String>,
    pub poll_interval: Duration,
    /// `None` means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,
    /// Realtime leaderboard endpoint.
    pub socket_url: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
            socket_url: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_socket_url(mut self, url: impl Into<String>) -> Self {
        self.socket_url = Some(url.into());
        self
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("LOUNGE_API_URL").ok_or(LoungeError::Config {
            key: "LOUNGE_API_URL",
            message: "missing".to_string(),
        })?;
        let mut config = Self::new(base_url);

        config.token = lookup("LOUNGE_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(secs) = lookup("LOUNGE_POLL_SECS") {
            config.poll_interval = Duration::from_secs(parse_secs("LOUNGE_POLL_SECS", &secs)?);
        }
        if let Some(secs) = lookup("LOUNGE_TIMEOUT_SECS") {
            config.request_timeout =
                Some(Duration::from_secs(parse_secs("LOUNGE_TIMEOUT_SECS", &secs)?));
        }
        config.socket_url = lookup("LOUNGE_SOCKET_URL");
        Ok(config)
    }
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(LoungeError::Config {
            key,
            message: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(LoungeError::Config {
            key,
            message: e.to_string(),
        }),
    }
}
