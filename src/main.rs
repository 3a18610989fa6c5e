use clap::Parser;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use xpgate::args::Args;
use xpgate::connection::{self, Admission, ConnectionLimiter, ConnectionTracker};
use xpgate::{ConnectionProvider, EnvVarConfig, RateLimiter, UpstreamProvider, forwarder};
use xpgate::{request_handler, server};
use xpgate_core::defaults::SHUTDOWN_GRACE_PERIOD;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Configuration error: {err}");
        std::process::exit(1);
    }

    server::init_tracing(&args);
    server::print_startup_info(&args);

    let config = Arc::new(EnvVarConfig::new());

    // One pooled client for every upstream request
    let http_client = match forwarder::build_http_client(config.upstream_config()) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("❌ Failed to create HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let rate_limiter = RateLimiter::new();
    let connection_limiter = ConnectionLimiter::new(config.max_connections());
    let tracker = ConnectionTracker::new();

    let bind_addr = match args.bind.parse::<std::net::IpAddr>() {
        Ok(ip) => SocketAddr::from((ip, args.listen)),
        Err(err) => {
            eprintln!("❌ Invalid bind address '{}': {err}", args.bind);
            std::process::exit(1);
        }
    };
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Failed to bind to {bind_addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(address = %bind_addr, "xpgate is running");
    if connection_limiter.is_enabled() {
        debug!(
            max = connection_limiter.max_connections(),
            "Connection limiting enabled"
        );
    } else {
        warn!("Connection limiting disabled (MAX_CONNECTIONS=0)");
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let (stream, addr) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "Failed to accept connection");
                    continue;
                }
            },
        };

        let permit = match connection_limiter.admit() {
            Admission::Unlimited => None,
            Admission::Permitted(permit) => Some(permit),
            Admission::AtCapacity => {
                warn!(
                    peer = %addr,
                    max = connection_limiter.max_connections(),
                    "Connection limit reached, dropping connection"
                );
                continue;
            }
        };
        let guard = tracker.track();

        debug!(peer = %addr, "New connection");

        let io = TokioIo::new(stream);
        let limiter = rate_limiter.clone();
        let config = config.clone();
        let http_client = http_client.clone();

        tokio::task::spawn(async move {
            let _permit = permit;
            let _guard = guard;

            let service = service_fn(move |req| {
                request_handler::handle_request(
                    req,
                    limiter.clone(),
                    config.clone(),
                    http_client.clone(),
                )
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(peer = %addr, error = %err, "Connection error");
            }
        });
    }

    info!(
        active_connections = tracker.count(),
        "Shutdown signal received, draining connections"
    );
    drop(listener);

    if connection::drain(&tracker, &rate_limiter, SHUTDOWN_GRACE_PERIOD).await {
        info!(
            tracked_clients = rate_limiter.tracked_clients().await,
            "xpgate stopped"
        );
    } else {
        warn!(
            remaining = tracker.count(),
            grace_period_secs = SHUTDOWN_GRACE_PERIOD.as_secs(),
            "Grace period elapsed with connections still open"
        );
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
