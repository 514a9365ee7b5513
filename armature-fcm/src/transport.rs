//! Request headers and status/body interpretation shared by the clients.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, trace, warn};
use url::Url;

use crate::{
    FcmConfig, FcmError, FcmResponse, MAX_REGISTRATION_IDS, MulticastMessage, Result,
    TransportError,
};

/// Headers sent with every request.
pub(crate) fn request_headers(config: &FcmConfig) -> Result<HeaderMap> {
    let mut authorization = HeaderValue::from_str(&format!("key={}", config.server_api_key.trim()))
        .map_err(|_| FcmError::Config("server API key is not a valid header value".to_string()))?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, authorization);
    Ok(headers)
}

/// Log the outgoing request.
pub(crate) fn log_message(message: &MulticastMessage) {
    if message.exceeds_recipient_limit() {
        warn!(
            recipients = message.tokens().len(),
            limit = MAX_REGISTRATION_IDS,
            "Multicast message exceeds the recipient limit"
        );
    }
    debug!(
        recipients = message.tokens().len(),
        data_keys = message.data().len(),
        "Sending FCM multicast message"
    );
}

/// Log an outgoing pre-built payload.
pub(crate) fn log_payload(endpoint: &Url, body: &[u8]) {
    debug!(endpoint = %endpoint, bytes = body.len(), "Sending FCM JSON payload");
}

/// Turn a status line and the attempt to read its body into a response.
///
/// `status_error` is the error reqwest reports for a 4xx/5xx status.
pub(crate) fn interpret(
    status: StatusCode,
    body: reqwest::Result<Bytes>,
    status_error: Option<reqwest::Error>,
) -> Result<FcmResponse> {
    let code = status.as_u16();

    if status.is_success() {
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                warn!(status = code, error = %e, "Failed to read FCM response body");
                return Err(TransportError::new(Some(code), None, Some(e)).into());
            }
        };
        trace!(response = %String::from_utf8_lossy(&body), "FCM response body");

        let response = FcmResponse::from_slice(code, &body)?;
        debug!(
            status = code,
            multicast_id = ?response.multicast_id(),
            failure = response.failure(),
            canonical_ids = response.canonical_ids(),
            "FCM response received"
        );
        return Ok(response);
    }

    let (body, cause) = match body {
        Ok(body) => (Some(String::from_utf8_lossy(&body).into_owned()), status_error),
        Err(read_error) => {
            warn!(status = code, error = %read_error, "Failed to read FCM error body");
            (None, status_error.or(Some(read_error)))
        }
    };

    warn!(status = code, body = ?body, "FCM request failed");
    Err(TransportError::new(Some(code), body, cause).into())
}

/// Wrap an error raised before a status line was received.
pub(crate) fn send_failed(error: reqwest::Error) -> FcmError {
    warn!(error = %error, "Network error occurred while sending to FCM");
    TransportError::network(error).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_error() -> reqwest::Error {
        reqwest::Client::new().get("http://").build().unwrap_err()
    }

    #[test]
    fn test_request_headers() {
        let headers = request_headers(&FcmConfig::new("AIzaSy-test")).unwrap();

        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[AUTHORIZATION], "key=AIzaSy-test");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_request_headers_rejects_invalid_key() {
        let err = request_headers(&FcmConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, FcmError::Config(_)));
    }

    #[test]
    fn test_interpret_success() {
        let body = Bytes::from_static(
            br#"{"multicast_id":1,"success":1,"results":[{"message_id":"m"}]}"#,
        );
        let response = interpret(StatusCode::OK, Ok(body), None).unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.multicast_id(), Some(1));
        assert_eq!(response.results()[0].message_id(), Some("m"));
    }

    #[test]
    fn test_interpret_malformed_success_body() {
        let body = Bytes::from_static(b"not json");
        let err = interpret(StatusCode::OK, Ok(body), None).unwrap_err();

        assert!(matches!(err, FcmError::Parse { status: 200, .. }));
    }

    #[test]
    fn test_interpret_error_status() {
        let body = Bytes::from_static(b"<HTML>Unauthorized</HTML>");
        let err = interpret(StatusCode::UNAUTHORIZED, Ok(body), None).unwrap_err();

        let transport = err.as_transport().unwrap();
        assert_eq!(transport.status(), Some(401));
        assert_eq!(transport.body(), Some("<HTML>Unauthorized</HTML>"));
        assert!(transport.cause().is_none());
    }

    #[test]
    fn test_interpret_redirect_is_not_followed() {
        let err = interpret(StatusCode::FOUND, Ok(Bytes::new()), None).unwrap_err();

        assert_eq!(err.status_code(), Some(302));
        assert_eq!(err.as_transport().and_then(|t| t.body()), Some(""));
    }

    #[test]
    fn test_interpret_unreadable_success_body_keeps_status() {
        let err = interpret(StatusCode::OK, Err(read_error()), None).unwrap_err();

        let transport = err.as_transport().unwrap();
        assert_eq!(transport.status(), Some(200));
        assert!(transport.body().is_none());
        assert!(transport.cause().is_some());
    }

    #[test]
    fn test_interpret_unreadable_error_body_becomes_cause() {
        let err = interpret(StatusCode::BAD_GATEWAY, Err(read_error()), None).unwrap_err();

        let transport = err.as_transport().unwrap();
        assert_eq!(transport.status(), Some(502));
        assert!(transport.body().is_none());
        assert!(transport.cause().is_some());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_interpret_non_utf8_error_body_is_lossy() {
        let body = Bytes::from_static(&[0xff, b'x']);
        let err = interpret(StatusCode::BAD_REQUEST, Ok(body), None).unwrap_err();

        assert_eq!(
            err.as_transport().and_then(TransportError::body),
            Some("\u{FFFD}x")
        );
    }
}
