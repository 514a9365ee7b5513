//! FCM client configuration.

use std::fmt;
use std::time::Duration;
use url::Url;

use crate::{FcmError, Result};

/// Legacy HTTP send endpoint.
pub const DEFAULT_SEND_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Environment variable holding the server API key.
pub const ENV_SERVER_API_KEY: &str = "FCM_SERVER_API_KEY";
/// Environment variable overriding the send endpoint.
pub const ENV_SEND_ENDPOINT: &str = "FCM_SEND_ENDPOINT";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "FCM_TIMEOUT_SECS";
/// Environment variable overriding the connect timeout, in seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "FCM_CONNECT_TIMEOUT_SECS";

/// FCM client configuration.
#[derive(Clone)]
pub struct FcmConfig {
    /// Server API key, sent as `Authorization: key=<server_api_key>`.
    pub server_api_key: String,
    /// Send endpoint URL.
    pub send_endpoint: String,
    /// Total request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            server_api_key: String::new(),
            send_endpoint: DEFAULT_SEND_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("armature-fcm/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl fmt::Debug for FcmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmConfig")
            .field("server_api_key", &"<redacted>")
            .field("send_endpoint", &self.send_endpoint)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl FcmConfig {
    /// Create a configuration for the default endpoint.
    pub fn new(server_api_key: impl Into<String>) -> Self {
        Self {
            server_api_key: server_api_key.into(),
            ..Self::default()
        }
    }

    /// Create a new configuration builder.
    pub fn builder() -> FcmConfigBuilder {
        FcmConfigBuilder::default()
    }

    /// Load configuration from the process environment.
    ///
    /// - `FCM_SERVER_API_KEY` - server API key (required)
    /// - `FCM_SEND_ENDPOINT` - send endpoint URL
    /// - `FCM_TIMEOUT_SECS` - request timeout
    /// - `FCM_CONNECT_TIMEOUT_SECS` - connect timeout
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load configuration through a custom variable lookup.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_api_key = lookup(ENV_SERVER_API_KEY)
            .ok_or_else(|| FcmError::Config(format!("{ENV_SERVER_API_KEY} must be set")))?;

        let mut config = Self::new(server_api_key);

        if let Some(endpoint) = lookup(ENV_SEND_ENDPOINT) {
            config.send_endpoint = endpoint;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = parse_secs(ENV_TIMEOUT_SECS, &secs)?;
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT_SECS, &secs)?;
        }

        Ok(config)
    }

    /// Check the configuration and return the parsed endpoint.
    pub fn validate(&self) -> Result<Url> {
        if self.server_api_key.trim().is_empty() {
            return Err(FcmError::Config("server API key is empty".to_string()));
        }

        let url = Url::parse(&self.send_endpoint).map_err(|source| FcmError::InvalidEndpoint {
            url: self.send_endpoint.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(FcmError::Config(format!(
                "unsupported endpoint scheme `{scheme}`"
            ))),
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| FcmError::Config(format!("{key}: invalid seconds `{value}`: {e}")))
}

/// Builder for FCM client configuration.
#[derive(Debug, Default)]
pub struct FcmConfigBuilder {
    config: FcmConfig,
}

impl FcmConfigBuilder {
    /// Set the server API key.
    pub fn server_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.server_api_key = key.into();
        self
    }

    /// Set the send endpoint.
    pub fn send_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.send_endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> FcmConfig {
        self.config
    }
}
