//! Client identification for rate limiting.
//!
//! The client identifier is the first entry of the `x-forwarded-for` header,
//! i.e. the originating client as reported by the fronting load balancer.
//!
//! # Security Model
//!
//! The header is not authenticated: any caller can set it and pick its own
//! bucket. The rate limiter is an abuse deterrent, not a security boundary.
//! Requests without the header all share the loopback placeholder bucket.
//!
//! # Example
//!
//! ```
//! use hyper::HeaderMap;
//! use xpgate_core::client_id::extract_client_id;
//!
//! let mut headers = HeaderMap::new();
//! assert_eq!(extract_client_id(&headers).as_str(), "127.0.0.1");
//!
//! headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
//! assert_eq!(extract_client_id(&headers).as_str(), "203.0.113.7");
//! ```

use tracing::debug;

use crate::headers::X_FORWARDED_FOR;
use crate::types::ClientId;

/// Extracts the client identifier from request headers.
///
/// Returns the first non-empty comma-separated entry of `x-forwarded-for`,
/// trimmed. Falls back to [`ClientId::loopback`] when the header is absent,
/// empty or not valid UTF-8.
pub fn extract_client_id(headers: &hyper::HeaderMap) -> ClientId {
    match headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(first_forwarded_entry)
    {
        Some(client) => ClientId::new(client),
        None => {
            debug!("No usable x-forwarded-for header, using shared loopback bucket");
            ClientId::loopback()
        }
    }
}

/// First non-empty entry of an `x-forwarded-for` list.
fn first_forwarded_entry(xff: &str) -> Option<&str> {
    xff.split(',').map(str::trim).find(|entry| !entry.is_empty())
}
