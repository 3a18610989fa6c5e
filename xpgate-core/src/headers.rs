//! HTTP header constants for xpgate.
//!
//! This module centralizes all HTTP header names used throughout the codebase,
//! avoiding magic strings and ensuring consistency.

use reqwest::header::{HeaderMap, HeaderValue};

use crate::types::UpstreamConfig;

/// X-Forwarded-For header - source of the client identifier.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Content-Type header.
pub const CONTENT_TYPE: &str = "content-type";

/// Allow header (for 405 responses).
pub const ALLOW: &str = "allow";

/// User-Agent header sent upstream.
pub const USER_AGENT: &str = "user-agent";

/// Origin header sent upstream.
pub const ORIGIN: &str = "origin";

/// Referer header sent upstream.
pub const REFERER: &str = "referer";

/// Media type of every response body produced by xpgate.
pub const APPLICATION_JSON: &str = "application/json";

/// Builds the fixed browser-like header set sent with every upstream request.
///
/// The upstream only answers requests that look like they come from the
/// portal front-end, so the origin and referer both point at the configured
/// portal origin. Caller headers are never passed through.
///
/// Values that are not valid header values are skipped.
///
/// # Example
///
/// ```
/// use xpgate_core::headers::{upstream_headers, ORIGIN, REFERER};
/// use xpgate_core::UpstreamConfig;
///
/// let headers = upstream_headers(&UpstreamConfig::default());
/// assert_eq!(headers.get(ORIGIN).unwrap(), "https://portal.incentiv.io");
/// assert_eq!(headers.get(REFERER).unwrap(), "https://portal.incentiv.io/");
/// ```
pub fn upstream_headers(config: &UpstreamConfig) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);
    let origin = config.origin.trim_end_matches('/');
    let referer = format!("{origin}/");

    for (name, value) in [
        (USER_AGENT, config.user_agent.as_str()),
        (ORIGIN, origin),
        (REFERER, referer.as_str()),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }

    headers
}
