//! Error types for the YApi client.
//!
//! # Design
//! Four failure kinds reach the caller: configuration (bad base URL or
//! missing settings), transport (anything `ureq` reports, passed through
//! unchanged), HTTP status (any code outside 200..300, with the raw body for
//! diagnostics) and decoding (the body is not the expected JSON shape).
//! The remote API's own `errcode` is never turned into an error here; callers
//! inspect the envelope themselves.

use thiserror::Error;

use crate::http::HttpResponse;

/// Errors returned by the transport and the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL or a request path could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The client is misconfigured (e.g. base URL without a trailing slash).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced a response: network failure, timeout,
    /// too many redirects.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The server answered with a status outside 200..300.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body could not be deserialized into the expected type.
    /// The whole response is kept so its status and headers stay available.
    #[error("deserialization failed (HTTP {}): {source}", response.status)]
    Decode {
        #[source]
        source: serde_json::Error,
        response: HttpResponse,
    },
}

impl ApiError {
    /// HTTP status code carried by an [`ApiError::HttpStatus`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The response an [`ApiError::Decode`] error failed to decode.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::Decode { response, .. } => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_includes_code_and_body() {
        let err = ApiError::HttpStatus {
            status: 400,
            body: "Bad Request".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: Bad Request");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn status_is_none_for_other_kinds() {
        let err = ApiError::Config("missing slash".to_string());
        assert_eq!(err.status(), None);
        assert!(err.response().is_none());
    }

    #[test]
    fn decode_error_keeps_the_response() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = ApiError::Decode {
            source,
            response: HttpResponse {
                status: 203,
                headers: vec![("content-type".to_string(), "text/html".to_string())],
                body: "<html>".to_string(),
            },
        };
        assert!(err.to_string().starts_with("deserialization failed (HTTP 203)"));
        let response = err.response().unwrap();
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.body, "<html>");
    }
}
