//! FCM client error types.

use thiserror::Error;

/// Result type for FCM operations.
pub type Result<T> = std::result::Result<T, FcmError>;

/// FCM client errors.
#[derive(Debug, Error)]
pub enum FcmError {
    /// The send endpoint is not a valid URL.
    #[error("Invalid endpoint URL `{url}`: {source}")]
    InvalidEndpoint {
        /// The rejected endpoint string.
        url: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request did not complete at the HTTP layer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered 2xx with a body that does not match the
    /// downstream response schema.
    #[error("Malformed FCM response (HTTP {status}): {source}")]
    Parse {
        /// HTTP status of the response.
        status: u16,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FcmError {
    /// Check if this error is retryable.
    ///
    /// Only transport failures qualify; the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_retryable())
    }

    /// Get the HTTP status code, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status(),
            Self::Parse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the transport failure, if this is one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// A send that failed before a downstream response could be parsed.
///
/// Carries whatever could be recovered: the HTTP status (absent when the
/// connection never produced one), the raw error body, and the underlying
/// transport error.
#[derive(Debug, Error)]
#[error("FCM request failed ({})", describe(.status, .body))]
pub struct TransportError {
    status: Option<u16>,
    body: Option<String>,
    #[source]
    cause: Option<reqwest::Error>,
}

fn describe(status: &Option<u16>, body: &Option<String>) -> String {
    let status = match status {
        Some(code) => format!("HTTP {code}"),
        None => "no HTTP status".to_string(),
    };
    match body.as_deref().map(str::trim) {
        Some(body) if !body.is_empty() => format!("{status}: {body}"),
        _ => status,
    }
}

impl TransportError {
    pub(crate) fn new(
        status: Option<u16>,
        body: Option<String>,
        cause: Option<reqwest::Error>,
    ) -> Self {
        Self {
            status,
            body,
            cause,
        }
    }

    /// A failure that happened before any status line was received.
    pub(crate) fn network(cause: reqwest::Error) -> Self {
        let status = cause.status().map(|s| s.as_u16());
        Self::new(status, None, Some(cause))
    }

    /// HTTP status code, if known.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Raw error body returned by the service, if it could be read.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The originating transport error.
    pub fn cause(&self) -> Option<&reqwest::Error> {
        self.cause.as_ref()
    }

    /// Consume the error and return the originating transport error.
    pub fn into_cause(self) -> Option<reqwest::Error> {
        self.cause
    }

    /// Check if the request timed out.
    pub fn is_timeout(&self) -> bool {
        self.cause.as_ref().is_some_and(|e| e.is_timeout())
    }

    /// Check if the connection could not be established.
    pub fn is_connect(&self) -> bool {
        self.cause.as_ref().is_some_and(|e| e.is_connect())
    }

    /// Check if sending again later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            // 5xx server errors and 429 rate limit
            Some(status) => status >= 500 || status == 429,
            None => self.is_timeout() || self.is_connect(),
        }
    }
}
