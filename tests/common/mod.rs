use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use xpgate::request_handler::handle_request;
use xpgate::{
    ConnectionProvider, RateLimitConfig, RateLimiter, RateLimitingProvider, UpstreamConfig,
    UpstreamProvider, forwarder,
};

/// Leaderboard stand-in answering every request with the same JSON.
pub struct MockBackend {
    pub base_url: String,
    received: Arc<Mutex<Vec<(String, HeaderMap)>>>,
}

impl MockBackend {
    /// Path and query of every request received so far.
    pub fn paths(&self) -> Vec<String> {
        let received = self.received.lock().unwrap();
        received.iter().map(|(path, _)| path.clone()).collect()
    }

    /// Headers of the most recent request.
    pub fn last_headers(&self) -> Option<HeaderMap> {
        let received = self.received.lock().unwrap();
        received.last().map(|(_, headers)| headers.clone())
    }
}

pub async fn spawn_mock_backend(status: StatusCode, body: &'static str) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let received = Arc::new(Mutex::new(Vec::new()));
    let recorded = received.clone();

    tokio::spawn(async move {
        loop {
            if let Ok((socket, _)) = listener.accept().await {
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                        let recorded = recorded.clone();
                        async move {
                            recorded
                                .lock()
                                .unwrap()
                                .push((req.uri().to_string(), req.headers().clone()));
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .header("content-type", "application/json")
                                    .body(Full::new(Bytes::from_static(body.as_bytes())))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(socket), service)
                        .await;
                });
            }
        }
    });

    MockBackend {
        base_url: format!("http://127.0.0.1:{port}"),
        received,
    }
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub struct TestConfig {
    pub rate_limit: RateLimitConfig,
    pub upstream: UpstreamConfig,
}

impl TestConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            upstream: UpstreamConfig {
                base_url: base_url.to_string(),
                timeout: Some(Duration::from_secs(5)),
                ..UpstreamConfig::default()
            },
        }
    }
}

impl RateLimitingProvider for TestConfig {
    fn rate_limit_config(&self) -> &RateLimitConfig {
        &self.rate_limit
    }
}

impl UpstreamProvider for TestConfig {
    fn upstream_config(&self) -> &UpstreamConfig {
        &self.upstream
    }
}

impl ConnectionProvider for TestConfig {
    fn max_connections(&self) -> usize {
        0
    }
}

/// Runs the proxy on an ephemeral port and returns its base URL.
pub async fn spawn_proxy(config: TestConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let http_client = forwarder::build_http_client(config.upstream_config()).unwrap();
    let config = Arc::new(config);
    let limiter = RateLimiter::new();

    tokio::spawn(async move {
        loop {
            if let Ok((socket, _)) = listener.accept().await {
                let limiter = limiter.clone();
                let config = config.clone();
                let http_client = http_client.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        handle_request(req, limiter.clone(), config.clone(), http_client.clone())
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(socket), service)
                        .await;
                });
            }
        }
    });

    format!("http://127.0.0.1:{port}")
}
