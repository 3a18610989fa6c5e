//! xpgate - rate-limited pass-through proxy for the Incentiv leaderboard API
//!
//! # Overview
//!
//! xpgate serves a single route, `GET /api/proxy?address=<wallet>&endpoint=<name>`,
//! and relays the matching leaderboard JSON:
//! - Per-client rate limiting keyed by `x-forwarded-for`
//! - A closed set of endpoints (`xp`, `badges`, `mystery-box`)
//! - JSON error bodies with stable messages
//! - Structured logging with JSON support
//!
//! # Example
//!
//! ```rust,no_run
//! use xpgate::{config, RateLimiter};
//!
//! let rate_config = config::get_rate_limit_config();
//! let upstream = config::get_upstream_config();
//!
//! let limiter = RateLimiter::new();
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration management from environment variables
//! - [`env_vars`] - Environment variable constants
//! - [`server`] - Logging setup and startup info
//! - [`args`] - Command line argument parsing
//! - [`connection`] - Connection limiting and shutdown draining
//!
//! # Re-exports from xpgate-core
//!
//! - [`rate_limiter`] - Per-client request counting
//! - [`forwarder`] - Upstream request forwarding
//! - [`request_handler`] - HTTP request processing

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod connection;
pub mod env_vars;
pub mod server;

// Re-export xpgate-core modules
pub use xpgate_core::forwarder;
pub use xpgate_core::rate_limiter;
pub use xpgate_core::request_handler;
pub use xpgate_core::types;

pub use config::{
    EnvVarConfig, get_max_connections, get_rate_limit_config, get_upstream_config,
};
pub use xpgate_core::{
    ConfigProvider, ConnectionProvider, Endpoint, ProxyError, RateLimitConfig, RateLimiter,
    RateLimitingProvider, UpstreamConfig, UpstreamProvider,
};
