//! xpgate Core - Rate-limited leaderboard forwarding
//!
//! This crate provides the core functionality of the xpgate proxy:
//! - Per-client rate limiting with deferred, cancellable credit release
//! - Client identification from `x-forwarded-for`
//! - Mapping of the `xp`, `badges` and `mystery-box` endpoints to the
//!   leaderboard API
//! - Pass-through forwarding with sanitized JSON errors
//!
//! # Overview
//!
//! `xpgate-core` is framework-agnostic: the request handler works on any
//! `hyper::Request` and configuration is provided via the [`ConfigProvider`]
//! trait, allowing flexible configuration from any source.
//!
//! # Example
//!
//! ```rust,no_run
//! use xpgate_core::{
//!     ConnectionProvider, RateLimitConfig, RateLimiter, RateLimitingProvider, UpstreamConfig,
//!     UpstreamProvider,
//! };
//!
//! // Implement your own configuration provider using composable traits
//! struct MyConfig {
//!     rate_limit: RateLimitConfig,
//!     upstream: UpstreamConfig,
//! }
//!
//! impl RateLimitingProvider for MyConfig {
//!     fn rate_limit_config(&self) -> &RateLimitConfig { &self.rate_limit }
//! }
//!
//! impl UpstreamProvider for MyConfig {
//!     fn upstream_config(&self) -> &UpstreamConfig { &self.upstream }
//! }
//!
//! impl ConnectionProvider for MyConfig {
//!     fn max_connections(&self) -> usize { 10_000 }
//! }
//!
//! // Create a rate limiter
//! let limiter = RateLimiter::new();
//! ```
//!
//! # Modules
//!
//! - [`types`] - Core types and the [`ConfigProvider`] trait
//! - [`error`] - Error types and result aliases
//! - [`defaults`] - Default configuration values
//! - [`headers`] - HTTP header constants and upstream header set
//! - [`client_id`] - Client identification
//! - [`endpoint`] - Endpoint to upstream URL mapping
//! - [`rate_limiter`] - Rate limiting implementation
//! - [`forwarder`] - Upstream forwarding
//! - [`request_handler`] - HTTP request processing

#![forbid(unsafe_code)]

pub mod client_id;
pub mod defaults;
pub mod endpoint;
pub mod error;
pub mod forwarder;
pub mod headers;
pub mod rate_limiter;
pub mod request_handler;
#[cfg(test)]
pub mod test_utils;
pub mod types;

// Re-export commonly used items at crate root
pub use endpoint::Endpoint;
pub use error::{ProxyError, Result};
pub use forwarder::JsonBody;
pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use types::{
    // Client identification
    ClientId,
    // Aggregated configuration trait
    ConfigProvider,
    // Composable configuration traits
    ConnectionProvider,
    // Configuration structs
    RateLimitConfig,
    RateLimitingProvider,
    UpstreamConfig,
    UpstreamProvider,
};
