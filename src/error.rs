//! Error types and fault classification.
//!
//! Every fault that can reach a user is mapped onto a small closed set of
//! kinds, each with a stable human-readable message:
//!
//! - [`Error::ApiKey`]: the remote rejected the request as unauthenticated
//! - [`Error::RateLimit`]: the remote signalled rate limiting
//! - [`Error::Network`]: a transport fault before any HTTP response
//! - [`Error::Unknown`]: everything else
//!
//! Only the display string crosses the boundary to the UI; the original
//! cause is retained (as a `source` or a `detail` field) for logging.
//! Cancellation is deliberately not part of this taxonomy: a cancelled
//! stream ends with a normal `done` chunk, never an error.

use reqwest::StatusCode;

/// Errors that can occur when using claudechat.
///
/// Errors are organized by category:
/// - Credential and request validation errors: detected before any network call
/// - Transport errors: failures opening or reading the HTTP stream
/// - Protocol errors: malformed payloads in recognized stream events
/// - Local errors: filesystem and JSON failures in the stores
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Credential and request validation errors
    // -------------------------------------------------------------------------
    /// The API key is missing, empty, or was rejected by the remote (HTTP 401).
    #[error("Invalid or missing API key")]
    ApiKey,

    /// A request was rejected locally before any network activity.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    // -------------------------------------------------------------------------
    // Transport errors
    // -------------------------------------------------------------------------
    /// The remote signalled that the rate limit was exceeded (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimit,

    /// A transport-level failure before any HTTP response was received
    /// (DNS, connection refused, TLS handshake, timeout).
    #[error("Network error")]
    Network(#[source] reqwest::Error),

    /// Any remote failure outside the classified set. The `detail` field
    /// carries diagnostics for logging; only the stable display message
    /// crosses the boundary to the UI.
    #[error("Unknown error")]
    Unknown { detail: String },

    // -------------------------------------------------------------------------
    // Protocol errors
    // -------------------------------------------------------------------------
    /// A recognized stream event carried a payload that failed to decode.
    #[error("failed to decode stream event: {message}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // -------------------------------------------------------------------------
    // Local errors
    // -------------------------------------------------------------------------
    /// IO error reading or writing local state.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    /// Failed to parse JSON from a local file.
    #[error("failed to parse JSON: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The in-flight request was cancelled. Internal only: cancellation is
    /// surfaced to consumers as a `done` chunk, never as this error.
    #[error("request cancelled")]
    Cancelled,
}

/// A specialized Result type for claudechat operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify a non-success HTTP status into an error kind.
    ///
    /// `detail` is whatever message could be extracted from the response
    /// body; it is kept for logging on the `Unknown` path and dropped for
    /// the kinds that carry a stable message.
    pub fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Error::ApiKey,
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimit,
            _ => Error::Unknown {
                detail: match detail {
                    Some(message) => format!("HTTP {}: {}", status.as_u16(), message),
                    None => format!("HTTP {}", status.as_u16()),
                },
            },
        }
    }

    /// Classify a transport-layer failure.
    ///
    /// Faults that happen before a response is received (connect, timeout)
    /// are network errors; anything carrying a status is classified by
    /// status; the rest is unknown.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Error::from_status(status, Some(err.to_string()));
        }
        if err.is_connect() || err.is_timeout() {
            return Error::Network(err);
        }
        Error::Unknown {
            detail: err.to_string(),
        }
    }

    /// Create a decode error with context about the offending payload.
    pub fn decode(event: &str, raw: &str, source: serde_json::Error) -> Self {
        Error::Decode {
            message: format!(
                "malformed `{}` payload: {}",
                event,
                raw.chars().take(100).collect::<String>()
            ),
            source,
        }
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    /// Check if this error is related to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::ApiKey)
    }

    /// Check if this error is rate-limit related.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
