//! HTTP request handling and proxying.
//!
//! This module contains the request pipeline of the proxy: routing, client
//! identification, rate limiting, parameter validation and forwarding.
//!
//! # Architecture
//!
//! The request handling flow:
//! 1. Route check (`GET /api/proxy` only; other requests are answered without
//!    touching the rate limiter)
//! 2. Derive the client identifier from `x-forwarded-for`
//! 3. Apply rate limiting
//! 4. Validate `address` and `endpoint` and forward to the upstream
//! 5. Relay the JSON body or a sanitized JSON error
//!
//! Rate limiting happens here and nowhere else.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client_id::extract_client_id;
use crate::defaults::PROXY_ROUTE;
use crate::error::ProxyError;
use crate::forwarder;
use crate::headers::{ALLOW, APPLICATION_JSON, CONTENT_TYPE};
use crate::rate_limiter::{self, RateLimiter};
use crate::types::ConfigProvider;

/// Handles an incoming HTTP request through the proxy pipeline.
///
/// # Arguments
///
/// * `req` - The incoming HTTP request (its body is ignored)
/// * `limiter` - The shared rate limiter instance
/// * `config` - Configuration provider for all settings
/// * `http_client` - HTTP client for forwarding requests (with connection pooling)
///
/// # Returns
///
/// Always returns `Ok` with either:
/// - The upstream JSON body (200)
/// - A JSON error response (400, 404, 405, 429, 500)
pub async fn handle_request<B, C: ConfigProvider>(
    req: Request<B>,
    limiter: RateLimiter,
    config: Arc<C>,
    http_client: reqwest::Client,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, _) = req.into_parts();

    if parts.uri.path() != PROXY_ROUTE {
        let err = ProxyError::NotFound(parts.uri.path().to_string());
        debug!(error = %err, "Request rejected");
        return Ok(error_response(&err));
    }

    if parts.method != Method::GET {
        let err = ProxyError::MethodNotAllowed(parts.method.to_string());
        debug!(error = %err, "Request rejected");
        let mut response = error_response(&err);
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET"));
        return Ok(response);
    }

    let client = extract_client_id(&parts.headers);

    if !rate_limiter::check_rate_limit(&limiter, &client, config.as_ref())
        .await
        .is_allowed()
    {
        if client.is_loopback() {
            // Every request without x-forwarded-for lands in this bucket
            warn!("Shared loopback rate limit bucket exhausted");
        }
        let err = ProxyError::RateLimited(client);
        debug!(error = %err, "Request rejected");
        return Ok(error_response(&err));
    }

    let query = parse_query(parts.uri.query().unwrap_or_default());
    let address = query.get("address").map(String::as_str);
    let endpoint = query.get("endpoint").map(String::as_str);

    match forwarder::handle(address, endpoint, config.as_ref(), &http_client).await {
        Ok(body) => Ok(json_response(StatusCode::OK, body.into_bytes())),
        Err(err) => {
            if err.is_server_error() {
                warn!(client = %client, endpoint = ?endpoint, error = %err, "Upstream fetch failed");
            } else {
                debug!(client = %client, error = %err, "Request rejected");
            }
            Ok(error_response(&err))
        }
    }
}

/// Builds the JSON error response for `err`.
///
/// The body is `{"error": <user message>}`; inner details never leave the
/// process.
pub fn error_response(err: &ProxyError) -> Response<Full<Bytes>> {
    create_error_response(err.status_code(), err.user_message())
}

/// Creates a standardized JSON error response.
///
/// # Example
///
/// ```
/// use xpgate_core::request_handler::create_error_response;
/// use hyper::StatusCode;
///
/// let response = create_error_response(StatusCode::BAD_REQUEST, "Address required");
/// assert_eq!(response.status(), StatusCode::BAD_REQUEST);
/// ```
pub fn create_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message }).to_string();
    json_response(status, Bytes::from(body))
}

/// Builds a response carrying an `application/json` body.
fn json_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .body(Full::new(body))
        .unwrap_or_else(|_| {
            // Fallback response if builder fails (extremely unlikely)
            Response::new(Full::new(Bytes::from_static(
                br#"{"error":"Internal server error"}"#,
            )))
        })
}

/// Parses a query string with `application/x-www-form-urlencoded` rules.
///
/// The first occurrence of a key wins; a key without `=` maps to an empty
/// value.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(form_decode(key))
            .or_insert_with(|| form_decode(value));
    }
    params
}

/// Decodes one form-encoded component (`+` is a space).
///
/// Malformed escapes are kept as-is and invalid UTF-8 is replaced.
fn form_decode(input: &str) -> String {
    percent_decode_str(&input.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StubUpstream, TestConfig};
    use http_body_util::BodyExt;

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    fn get_from(uri: &str, client: &str) -> Request<()> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", client)
            .body(())
            .unwrap()
    }

    async fn send(
        req: Request<()>,
        limiter: &RateLimiter,
        config: &Arc<TestConfig>,
    ) -> (StatusCode, Bytes) {
        let response = handle_request(req, limiter.clone(), config.clone(), reqwest::Client::new())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    // ===========================================
    // Query parsing tests
    // ===========================================

    #[test]
    fn test_form_decode() {
        assert_eq!(form_decode("0xabc"), "0xabc");
        assert_eq!(form_decode("a+b"), "a b");
        assert_eq!(form_decode("a%2Bb"), "a+b");
        assert_eq!(form_decode("mystery%2Dbox"), "mystery-box");
        assert_eq!(form_decode("caf%C3%A9"), "café");
        assert_eq!(form_decode("%GG%2"), "%GG%2");
    }

    #[test]
    fn test_parse_query() {
        let params = parse_query("address=0xabc&endpoint=mystery-box");
        assert_eq!(params.get("address").unwrap(), "0xabc");
        assert_eq!(params.get("endpoint").unwrap(), "mystery-box");
    }

    #[test]
    fn test_parse_query_first_occurrence_wins() {
        let params = parse_query("endpoint=xp&endpoint=badges");
        assert_eq!(params.get("endpoint").unwrap(), "xp");
    }

    #[test]
    fn test_parse_query_edge_cases() {
        let params = parse_query("&address&endpoint=&&x%3Dy=1");
        assert_eq!(params.get("address").unwrap(), "");
        assert_eq!(params.get("endpoint").unwrap(), "");
        assert_eq!(params.get("x=y").unwrap(), "1");
        assert!(parse_query("").is_empty());
    }

    // ===========================================
    // Routing tests
    // ===========================================

    #[tokio::test]
    async fn test_unknown_path_not_found() {
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new());

        let (status, body) = send(get("/api/other?address=0xabc"), &limiter, &config).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"Not found"}"#);
        assert_eq!(limiter.tracked_clients().await, 0);
    }

    #[tokio::test]
    async fn test_non_get_method_not_allowed() {
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/proxy?address=0xabc&endpoint=xp")
            .body(())
            .unwrap();

        let response = handle_request(req, limiter.clone(), config, reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET");
        assert_eq!(limiter.tracked_clients().await, 0);
    }

    // ===========================================
    // Validation tests
    // ===========================================

    #[tokio::test]
    async fn test_missing_address() {
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new());

        for uri in [
            "/api/proxy?endpoint=xp",
            "/api/proxy?address=&endpoint=xp",
            "/api/proxy",
        ] {
            let (status, body) = send(get(uri), &limiter, &config).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, r#"{"error":"Address required"}"#);
        }
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new());

        for uri in [
            "/api/proxy?address=0xabc&endpoint=nonexistent",
            "/api/proxy?address=0xabc",
        ] {
            let (status, body) = send(get(uri), &limiter, &config).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, r#"{"error":"Invalid endpoint"}"#);
        }
    }

    // ===========================================
    // Rate limiting tests
    // ===========================================

    #[tokio::test]
    async fn test_rate_limit_exceeded() {
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new().with_rate_limit(1, 60));
        let uri = "/api/proxy?address=0xabc&endpoint=nonexistent";

        for _ in 0..2 {
            let (status, _) = send(get_from(uri, "198.51.100.1"), &limiter, &config).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (status, body) = send(get_from(uri, "198.51.100.1"), &limiter, &config).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, r#"{"error":"Rate limit exceeded"}"#);

        // Another client keeps its own quota
        let (status, _) = send(get_from(uri, "198.51.100.2"), &limiter, &config).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_headerless_clients_share_loopback_bucket() {
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new());

        send(get("/api/proxy?endpoint=xp"), &limiter, &config).await;
        send(get("/api/proxy?endpoint=xp"), &limiter, &config).await;

        assert_eq!(limiter.count(&crate::ClientId::loopback()).await, 2);
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    // ===========================================
    // Forwarding tests
    // ===========================================

    #[tokio::test]
    async fn test_success_relays_upstream_json() {
        let payload = r#"{"address":"0xabc","xp":1200,"rank":7}"#;
        let stub = StubUpstream::spawn(StatusCode::OK, payload).await;
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new().with_upstream(&stub.base_url));

        let response = handle_request(
            get_from("/api/proxy?address=0xabc&endpoint=xp", "203.0.113.5"),
            limiter,
            config,
            reqwest::Client::new(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            APPLICATION_JSON
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, payload);

        // Caller headers are not passed through
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].uri, "/xp/0xabc");
        assert!(requests[0].headers.get("x-forwarded-for").is_none());
    }

    #[tokio::test]
    async fn test_non_json_upstream_returns_generic_error() {
        let stub = StubUpstream::spawn(StatusCode::OK, "upstream exploded: stack trace here").await;
        let limiter = RateLimiter::new();
        let config = Arc::new(TestConfig::new().with_upstream(&stub.base_url));

        let (status, body) = send(
            get("/api/proxy?address=0xabc&endpoint=badges"),
            &limiter,
            &config,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Failed to fetch data"}"#);
    }

    // ===========================================
    // create_error_response tests
    // ===========================================

    #[test]
    fn test_create_error_response_content_type() {
        let response = create_error_response(StatusCode::NOT_FOUND, "Not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            APPLICATION_JSON
        );
    }

    #[tokio::test]
    async fn test_create_error_response_escapes_message() {
        let response = create_error_response(StatusCode::BAD_REQUEST, "say \"hi\"");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, r#"{"error":"say \"hi\""}"#);
    }
}
