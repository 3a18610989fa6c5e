//! Error types for xpgate.
//!
//! Every failure a proxied request can hit is terminal for that request and
//! maps to exactly one HTTP status and one sanitized message. Inner details
//! (upstream error text, offending values) are for logs only.

use hyper::StatusCode;
use thiserror::Error;

use crate::types::ClientId;

/// Result type alias for xpgate operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Unified error type for xpgate request processing.
///
/// # Example
///
/// ```
/// use xpgate_core::error::{ProxyError, Result};
///
/// fn require_address(address: &str) -> Result<&str> {
///     if address.is_empty() {
///         return Err(ProxyError::MissingAddress);
///     }
///     Ok(address)
/// }
///
/// assert!(require_address("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The `address` query parameter is missing or empty.
    #[error("Address query parameter is missing")]
    MissingAddress,

    /// The `endpoint` query parameter is missing or not a known endpoint.
    #[error("Unknown endpoint: {0:?}")]
    UnknownEndpoint(String),

    /// The client exceeded its rate limit.
    #[error("Rate limit exceeded for client: {0}")]
    RateLimited(ClientId),

    /// The upstream could not be reached or did not answer with JSON.
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// No route matches the request path.
    #[error("No route for path: {0}")]
    NotFound(String),

    /// The route exists but not for this HTTP method.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP client error (from reqwest).
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProxyError {
    /// Returns the HTTP status code that should be returned to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAddress => StatusCode::BAD_REQUEST,
            Self::UnknownEndpoint(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message placed in the `error` field of the response body.
    ///
    /// This never includes the inner detail of the variant.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingAddress => "Address required",
            Self::UnknownEndpoint(_) => "Invalid endpoint",
            Self::RateLimited(_) => "Rate limit exceeded",
            Self::UpstreamUnreachable(_) | Self::Http(_) => "Failed to fetch data",
            Self::NotFound(_) => "Not found",
            Self::MethodNotAllowed(_) => "Method not allowed",
        }
    }

    /// Returns true if this error should be logged at warn level.
    ///
    /// Client mistakes and rate limiting are expected and only logged at
    /// debug level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::UpstreamUnreachable(_) | Self::Http(_))
    }
}
