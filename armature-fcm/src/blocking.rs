//! Blocking FCM client.
//!
//! Same contract as [`FcmClient`](crate::FcmClient), for callers without an
//! async runtime. Must not be created or used from within one.

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{Span, info_span, trace};
use url::Url;

use crate::{FcmConfig, FcmError, FcmResponse, MulticastMessage, Result, transport};

/// Blocking client for the legacy FCM HTTP send endpoint.
#[derive(Debug, Clone)]
pub struct BlockingFcmClient {
    config: FcmConfig,
    endpoint: Url,
    headers: HeaderMap,
    http_client: Client,
    span: Span,
}

impl BlockingFcmClient {
    /// Create a new client.
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

    /// Send a multicast message, blocking until the response is parsed.
    pub fn send(&self, message: &MulticastMessage) -> Result<FcmResponse> {
        let _entered = self.span.enter();
        transport::log_message(message);
        let body = serde_json::to_vec(message)?;
        self.post(body)
    }

    /// Send a pre-built JSON payload.
    pub fn send_json(&self, payload: &Value) -> Result<FcmResponse> {
        let _entered = self.span.enter();
        let body = serde_json::to_vec(payload)?;
        transport::log_payload(&self.endpoint, &body);
        self.post(body)
    }

    fn post(&self, body: Vec<u8>) -> Result<FcmResponse> {
        trace!(request = %String::from_utf8_lossy(&body), "FCM request body");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .map_err(transport::send_failed)?;

        let status = response.status();
        let status_error = response.error_for_status_ref().err();
        let body = response.bytes();

        transport::interpret(status, body, status_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BlockingFcmClient::with_api_key("key").unwrap();
        assert_eq!(client.endpoint().as_str(), crate::DEFAULT_SEND_ENDPOINT);
    }

    #[test]
    fn test_client_rejects_malformed_endpoint() {
        let config = FcmConfig::builder()
            .server_api_key("key")
            .send_endpoint("not a url")
            .build();

        assert!(matches!(
            BlockingFcmClient::new(config),
            Err(FcmError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_failure() {
        let config = FcmConfig::builder()
            .server_api_key("key")
            .send_endpoint("http://127.0.0.1:1/fcm/send")
            .build();
        let client = BlockingFcmClient::new(config).unwrap();

        let mut message = MulticastMessage::new();
        message.add_token("token");

        let err = client.send(&message).unwrap_err();
        let transport = err.as_transport().unwrap();
        assert_eq!(transport.status(), None);
        assert!(transport.body().is_none());
        assert!(transport.cause().is_some());
    }
}
