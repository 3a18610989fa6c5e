//! Leaderboard request forwarding.
//!
//! Validates the caller's query parameters, maps the logical endpoint to an
//! upstream URL, issues a `GET` with the portal's browser headers and relays
//! the JSON answer untouched.
//!
//! # Failure handling
//!
//! Transport failures, unreadable bodies and non-JSON bodies all collapse
//! into [`ProxyError::UpstreamUnreachable`]. The detail is kept for logs; the
//! caller only ever sees the generic message. There are no retries and no
//! caching.
//!
//! # Connection Pooling
//!
//! The module accepts a shared [`reqwest::Client`], normally built once with
//! [`build_http_client`].

use bytes::Bytes;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{ProxyError, Result};
use crate::headers::upstream_headers;
use crate::types::{UpstreamConfig, UpstreamProvider};

/// An upstream response body known to be valid JSON.
///
/// The original bytes are kept, so relaying it preserves key order and
/// formatting exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonBody(Bytes);

impl JsonBody {
    /// Accepts `bytes` if they parse as a JSON document.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use xpgate_core::JsonBody;
    ///
    /// assert!(JsonBody::parse(Bytes::from_static(b"{\"xp\": 42}")).is_ok());
    /// assert!(JsonBody::parse(Bytes::from_static(b"<html>")).is_err());
    /// ```
    pub fn parse(bytes: Bytes) -> Result<Self> {
        serde_json::from_slice::<serde_json::Value>(&bytes).map_err(|err| {
            ProxyError::UpstreamUnreachable(format!("response body is not JSON: {err}"))
        })?;
        Ok(Self(bytes))
    }

    /// Consumes the body, returning the raw JSON bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

/// Builds the shared HTTP client used for upstream requests.
///
/// Applies the configured timeout, if any; otherwise the transport default
/// is kept.
pub fn build_http_client(config: &UpstreamConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Validates the `address` and `endpoint` query parameters.
///
/// The address is checked first: a request missing both reports
/// [`ProxyError::MissingAddress`]. `.` and `..` count as missing, since URL
/// normalization would turn them into a different upstream path.
pub fn validate<'a>(address: Option<&'a str>, endpoint: Option<&str>) -> Result<(&'a str, Endpoint)> {
    let address = address
        .filter(|address| !matches!(*address, "" | "." | ".."))
        .ok_or(ProxyError::MissingAddress)?;
    let endpoint = endpoint.unwrap_or_default().parse()?;
    Ok((address, endpoint))
}

/// Fetches `endpoint` for `address` from the upstream.
///
/// # Arguments
///
/// * `address` - Wallet address from the query string
/// * `endpoint` - Endpoint name from the query string
/// * `config` - Configuration provider for the upstream settings
/// * `http_client` - HTTP client for forwarding requests (with connection pooling)
///
/// # Returns
///
/// The upstream JSON body on success, whatever the upstream status code.
pub async fn handle(
    address: Option<&str>,
    endpoint: Option<&str>,
    config: &impl UpstreamProvider,
    http_client: &reqwest::Client,
) -> Result<JsonBody> {
    let (address, endpoint) = validate(address, endpoint)?;
    let upstream = config.upstream_config();
    let url = endpoint.upstream_url(&upstream.base_url, address);

    fetch_json(&url, upstream, http_client).await
}

/// Issues the upstream `GET` and validates the body.
async fn fetch_json(
    url: &str,
    upstream: &UpstreamConfig,
    http_client: &reqwest::Client,
) -> Result<JsonBody> {
    let response = http_client
        .get(url)
        .headers(upstream_headers(upstream))
        .send()
        .await
        .map_err(|err| ProxyError::UpstreamUnreachable(describe_transport_error(&err)))?;

    debug!(url, status = response.status().as_u16(), "Upstream responded");

    let body = response.bytes().await.map_err(|err| {
        ProxyError::UpstreamUnreachable(format!("failed to read response body: {err}"))
    })?;

    JsonBody::parse(body)
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("upstream timeout: {err}")
    } else if err.is_connect() {
        format!("could not connect to upstream: {err}")
    } else {
        format!("upstream request failed: {err}")
    }
}
