//! Asynchronous FCM client.

use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{Instrument, Span, info_span, trace};
use url::Url;

use crate::{FcmConfig, FcmError, FcmResponse, MulticastMessage, Result, transport};

/// Client for the legacy FCM HTTP send endpoint.
///
/// Each send is a single POST with no retries. Redirects are never followed.
#[derive(Debug, Clone)]
pub struct FcmClient {
    config: FcmConfig,
    endpoint: Url,
    headers: HeaderMap,
    http_client: Client,
    span: Span,
}

impl FcmClient {
    /// Create a new client.
    ///
    /// Fails if the endpoint is not a valid URL or the API key is unusable.
    pub fn new(config: FcmConfig) -> Result<Self> {
        let endpoint = config.validate()?;
        let headers = transport::request_headers(&config)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FcmError::Config(e.to_string()))?;

        let span = info_span!("fcm", endpoint = %endpoint);

        Ok(Self {
            config,
            endpoint,
            headers,
            http_client,
            span,
        })
    }

    /// Create a client for the default endpoint.
    pub fn with_api_key(server_api_key: impl Into<String>) -> Result<Self> {
        Self::new(FcmConfig::new(server_api_key))
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(FcmConfig::from_env()?)
    }

    /// Emit this client's events inside `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Get the client configuration.
    pub fn config(&self) -> &FcmConfig {
        &self.config
    }

    /// Get the send endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a multicast message.
    pub async fn send(&self, message: &MulticastMessage) -> Result<FcmResponse> {
        let span = self.span.clone();
        async move {
            transport::log_message(message);
            let body = serde_json::to_vec(message)?;
            self.post(body).await
        }
        .instrument(span)
        .await
    }

    /// Send a pre-built JSON payload.
    pub async fn send_json(&self, payload: &Value) -> Result<FcmResponse> {
        let span = self.span.clone();
        async move {
            let body = serde_json::to_vec(payload)?;
            transport::log_payload(&self.endpoint, &body);
            self.post(body).await
        }
        .instrument(span)
        .await
    }

    async fn post(&self, body: Vec<u8>) -> Result<FcmResponse> {
        trace!(request = %String::from_utf8_lossy(&body), "FCM request body");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await
            .map_err(transport::send_failed)?;

        let status = response.status();
        let status_error = response.error_for_status_ref().err();
        let body = response.bytes().await;

        transport::interpret(status, body, status_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = FcmClient::with_api_key("key").unwrap();
        assert_eq!(client.endpoint().as_str(), crate::DEFAULT_SEND_ENDPOINT);
        assert_eq!(client.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_client_with_config() {
        let config = FcmConfig::builder()
            .server_api_key("key")
            .send_endpoint("http://localhost:9999/fcm/send")
            .timeout(Duration::from_secs(5))
            .build();

        let client = FcmClient::new(config).unwrap();
        assert_eq!(client.endpoint().port(), Some(9999));
        assert_eq!(client.config().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_client_rejects_malformed_endpoint() {
        let config = FcmConfig::builder()
            .server_api_key("key")
            .send_endpoint("://missing-scheme")
            .build();

        assert!(matches!(
            FcmClient::new(config),
            Err(FcmError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_client_rejects_empty_key() {
        assert!(matches!(
            FcmClient::with_api_key(""),
            Err(FcmError::Config(_))
        ));
    }
}
