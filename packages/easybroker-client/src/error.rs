//! Typed errors for the EasyBroker client.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the exact upstream failure kind.

use thiserror::Error;

/// Result type alias for EasyBroker client operations.
pub type Result<T> = std::result::Result<T, EasyBrokerError>;

/// Errors that can occur when talking to the EasyBroker API.
///
/// HTTP-mapped variants carry the upstream response body for diagnostics.
#[derive(Debug, Error)]
pub enum EasyBrokerError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid pagination or lookup argument, raised before any network call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// API key is invalid or missing (HTTP 401)
    #[error("invalid or missing API key (HTTP 401): {body}")]
    Unauthorized { body: String },

    /// Resource does not exist (HTTP 404)
    #[error("resource not found (HTTP 404): {body}")]
    NotFound { body: String },

    /// The upstream server itself rejected for rate reasons (HTTP 429).
    /// Distinct from the local [`RateLimiter`](crate::RateLimiter), which
    /// prevents this from occurring under normal use.
    #[error("rate limit exceeded (HTTP 429): {body}")]
    RateLimitExceeded { body: String },

    /// Any other 4xx response
    #[error("client error (HTTP {status}): {body}")]
    ClientError { status: u16, body: String },

    /// 5xx response or transport-level connection failure
    #[error("server error: {0}")]
    ServerError(String),

    /// Transport-level timeout (connect or overall)
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Response body could not be parsed as JSON
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// Any status outside the mapped ranges
    #[error("unexpected response (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },
}
