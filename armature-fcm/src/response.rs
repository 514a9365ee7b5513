//! Downstream response parsing.
//!
//! The service answers a multicast send with:
//!
//! ```json
//! {
//!   "multicast_id": 108,
//!   "success": 1,
//!   "failure": 1,
//!   "canonical_ids": 0,
//!   "results": [
//!     { "message_id": "1:08" },
//!     { "error": "InvalidRegistration" }
//!   ]
//! }
//! ```
//!
//! Every field is optional. `results` is positionally aligned with the
//! `registration_ids` of the request.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::{FcmError, Result};

/// Parsed downstream response of a successful HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct FcmResponse {
    status: u16,
    json: Value,
    multicast_id: Option<i64>,
    success: Option<u32>,
    failure: u32,
    canonical_ids: u32,
    results: Vec<RecipientResult>,
}

/// Delivery outcome for one recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipientResult {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    registration_id: Option<String>,
}

#[derive(Deserialize)]
struct DownstreamBody {
    #[serde(default)]
    multicast_id: Option<i64>,
    #[serde(default)]
    success: Option<u32>,
    #[serde(default)]
    failure: Option<u32>,
    #[serde(default)]
    canonical_ids: Option<u32>,
    #[serde(default)]
    results: Option<Vec<RecipientResult>>,
}

impl FcmResponse {
    /// Parse a response document.
    ///
    /// Missing or `null` fields are not errors; only a document that does
    /// not fit the schema (wrong types, non-object results) is rejected.
    pub fn from_json(status: u16, json: Value) -> Result<Self> {
        if !json.is_object() {
            return Err(FcmError::Parse {
                status,
                source: serde::de::Error::custom("expected a JSON object"),
            });
        }

        let body = DownstreamBody::deserialize(&json)
            .map_err(|source| FcmError::Parse { status, source })?;

        Ok(Self {
            status,
            multicast_id: body.multicast_id,
            success: body.success,
            failure: body.failure.unwrap_or(0),
            canonical_ids: body.canonical_ids.unwrap_or(0),
            results: body.results.unwrap_or_default(),
            json,
        })
    }

    /// Parse a raw response body.
    pub fn from_slice(status: u16, body: &[u8]) -> Result<Self> {
        let json =
            serde_json::from_slice(body).map_err(|source| FcmError::Parse { status, source })?;
        Self::from_json(status, json)
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The full response document, including fields this type does not model.
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Unique ID identifying the multicast message.
    pub fn multicast_id(&self) -> Option<i64> {
        self.multicast_id
    }

    /// Number of messages processed without an error, if reported.
    pub fn success(&self) -> Option<u32> {
        self.success
    }

    /// Number of messages that could not be processed.
    pub fn failure(&self) -> u32 {
        self.failure
    }

    /// Number of results that carry a canonical registration token.
    pub fn canonical_ids(&self) -> u32 {
        self.canonical_ids
    }

    /// Per-recipient results, in the same order as the request tokens.
    pub fn results(&self) -> &[RecipientResult] {
        &self.results
    }

    /// Tokens the service wants replaced, paired with their canonical
    /// replacement.
    ///
    /// `tokens` must be the registration tokens of the request, in order.
    pub fn canonical_replacements<'a>(&'a self, tokens: &'a [String]) -> Vec<(&'a str, &'a str)> {
        tokens
            .iter()
            .zip(&self.results)
            .filter_map(|(token, result)| {
                result
                    .registration_id()
                    .map(|canonical| (token.as_str(), canonical))
            })
            .collect()
    }

    /// Tokens whose delivery failed, paired with the error code.
    ///
    /// `tokens` must be the registration tokens of the request, in order.
    pub fn failed_tokens<'a>(&'a self, tokens: &'a [String]) -> Vec<(&'a str, ErrorCode)> {
        tokens
            .iter()
            .zip(&self.results)
            .filter_map(|(token, result)| result.error_code().map(|code| (token.as_str(), code)))
            .collect()
    }
}

impl fmt::Display for FcmResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FcmResponse [status={}", self.status)?;
        if let Some(id) = self.multicast_id {
            write!(f, ", multicast_id={id}")?;
        }
        if let Some(success) = self.success {
            write!(f, ", success={success}")?;
        }
        write!(
            f,
            ", failure={}, canonical_ids={}, results=[",
            self.failure, self.canonical_ids
        )?;
        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{result}")?;
        }
        f.write_str("]]")
    }
}

impl RecipientResult {
    /// ID of the successfully processed message.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Error reported for this recipient.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Canonical registration token the sender should use from now on.
    pub fn registration_id(&self) -> Option<&str> {
        self.registration_id.as_deref()
    }

    /// Whether the message was accepted for this recipient.
    pub fn is_delivered(&self) -> bool {
        self.message_id.is_some() && self.error.is_none()
    }

    /// The reported error as a typed code.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_deref().map(ErrorCode::from)
    }
}

impl fmt::Display for RecipientResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "Result [message_id={}, error={}, registration_id={}]",
            field(&self.message_id),
            field(&self.error),
            field(&self.registration_id)
        )
    }
}

/// Per-recipient error codes of the legacy HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// No registration token in the request.
    MissingRegistration,
    /// Malformed registration token.
    InvalidRegistration,
    /// The app instance is no longer registered.
    NotRegistered,
    /// Package name does not match the token.
    InvalidPackageName,
    /// Token belongs to a different sender.
    MismatchSenderId,
    /// Invalid request parameters.
    InvalidParameters,
    /// Payload too large.
    MessageTooBig,
    /// Payload uses a reserved key.
    InvalidDataKey,
    /// Time to live out of range.
    InvalidTtl,
    /// The service timed out; may be retried.
    Unavailable,
    /// Internal server error; may be retried.
    InternalServerError,
    /// Too many messages to one device.
    DeviceMessageRateExceeded,
    /// Too many messages to one topic.
    TopicsMessageRateExceeded,
    /// APNs credentials missing or invalid.
    InvalidApnsCredential,
    /// Any code not listed above.
    Other(String),
}

impl ErrorCode {
    /// The wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingRegistration => "MissingRegistration",
            Self::InvalidRegistration => "InvalidRegistration",
            Self::NotRegistered => "NotRegistered",
            Self::InvalidPackageName => "InvalidPackageName",
            Self::MismatchSenderId => "MismatchSenderId",
            Self::InvalidParameters => "InvalidParameters",
            Self::MessageTooBig => "MessageTooBig",
            Self::InvalidDataKey => "InvalidDataKey",
            Self::InvalidTtl => "InvalidTtl",
            Self::Unavailable => "Unavailable",
            Self::InternalServerError => "InternalServerError",
            Self::DeviceMessageRateExceeded => "DeviceMessageRateExceeded",
            Self::TopicsMessageRateExceeded => "TopicsMessageRateExceeded",
            Self::InvalidApnsCredential => "InvalidApnsCredential",
            Self::Other(code) => code,
        }
    }

    /// Check if the token should be dropped from future sends.
    pub fn should_remove_token(&self) -> bool {
        matches!(
            self,
            Self::NotRegistered | Self::InvalidRegistration | Self::MismatchSenderId
        )
    }

    /// Check if the recipient may be retried with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable
                | Self::InternalServerError
                | Self::DeviceMessageRateExceeded
                | Self::TopicsMessageRateExceeded
        )
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "MissingRegistration" => Self::MissingRegistration,
            "InvalidRegistration" => Self::InvalidRegistration,
            "NotRegistered" => Self::NotRegistered,
            "InvalidPackageName" => Self::InvalidPackageName,
            "MismatchSenderId" => Self::MismatchSenderId,
            "InvalidParameters" => Self::InvalidParameters,
            "MessageTooBig" => Self::MessageTooBig,
            "InvalidDataKey" => Self::InvalidDataKey,
            "InvalidTtl" => Self::InvalidTtl,
            "Unavailable" => Self::Unavailable,
            "InternalServerError" => Self::InternalServerError,
            "DeviceMessageRateExceeded" => Self::DeviceMessageRateExceeded,
            "TopicsMessageRateExceeded" => Self::TopicsMessageRateExceeded,
            "InvalidApnsCredential" => Self::InvalidApnsCredential,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
