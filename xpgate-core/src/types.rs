//! Type definitions for xpgate configuration and state management.
//!
//! This module contains the core types used throughout xpgate for:
//! - Rate limiting configuration
//! - Upstream (leaderboard API) configuration
//! - Connection limits
//! - Client identification

use std::fmt;
use std::time::Duration;

use crate::defaults;

// ============================================================================
// Composable Configuration Traits (Interface Segregation Principle)
// ============================================================================

/// Configuration for rate limiting behavior.
///
/// Implement this trait to customize how rate limiting is applied.
pub trait RateLimitingProvider: Send + Sync {
    /// Returns the rate limiting configuration.
    fn rate_limit_config(&self) -> &RateLimitConfig;
}

/// Configuration for the upstream leaderboard API.
///
/// Implement this trait to point the forwarder at another host (a stub
/// upstream in tests, a staging API, ...).
pub trait UpstreamProvider: Send + Sync {
    /// Returns the upstream configuration.
    fn upstream_config(&self) -> &UpstreamConfig;
}

/// Configuration for connection limits.
///
/// Implement this trait to customize connection handling.
pub trait ConnectionProvider: Send + Sync {
    /// Returns the maximum number of concurrent connections.
    fn max_connections(&self) -> usize;
}

// ============================================================================
// ConfigProvider - Aggregated trait for full configuration
// ============================================================================

/// Trait for complete configuration injection.
///
/// This trait combines all specialized configuration traits into one.
/// Implement the individual traits and the blanket implementation takes care
/// of the rest:
/// - [`RateLimitingProvider`] for rate limiting settings
/// - [`UpstreamProvider`] for the forwarded API
/// - [`ConnectionProvider`] for connection limits
///
/// # Example
///
/// ```
/// use xpgate_core::{
///     ConfigProvider, ConnectionProvider, RateLimitConfig, RateLimitingProvider,
///     UpstreamConfig, UpstreamProvider,
/// };
///
/// struct MyConfig {
///     rate_limit: RateLimitConfig,
///     upstream: UpstreamConfig,
/// }
///
/// impl RateLimitingProvider for MyConfig {
///     fn rate_limit_config(&self) -> &RateLimitConfig { &self.rate_limit }
/// }
///
/// impl UpstreamProvider for MyConfig {
///     fn upstream_config(&self) -> &UpstreamConfig { &self.upstream }
/// }
///
/// impl ConnectionProvider for MyConfig {
///     fn max_connections(&self) -> usize { 10_000 }
/// }
///
/// fn assert_provider<C: ConfigProvider>(_: &C) {}
///
/// assert_provider(&MyConfig {
///     rate_limit: RateLimitConfig::default(),
///     upstream: UpstreamConfig::default(),
/// });
/// ```
pub trait ConfigProvider: RateLimitingProvider + UpstreamProvider + ConnectionProvider {}

// Blanket implementation: any type implementing all sub-traits is a ConfigProvider
impl<T> ConfigProvider for T where T: RateLimitingProvider + UpstreamProvider + ConnectionProvider {}

/// Configuration for rate limiting per client.
///
/// A client is denied once its in-window count exceeds `max_requests`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use xpgate_core::RateLimitConfig;
///
/// let config = RateLimitConfig {
///     max_requests: 20,
///     window_duration: Duration::from_secs(60),
/// };
///
/// assert!(config.is_valid());
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Count a client may reach before further checks are denied
    pub max_requests: u32,
    /// Delay after which each allowed request gives its credit back
    pub window_duration: Duration,
}

impl RateLimitConfig {
    /// Returns `true` if the configuration is valid.
    ///
    /// A valid configuration has at least one allowed request and a non-zero window.
    pub fn is_valid(&self) -> bool {
        self.max_requests > 0 && !self.window_duration.is_zero()
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: defaults::RATE_LIMIT_REQUESTS,
            window_duration: defaults::RATE_LIMIT_WINDOW,
        }
    }
}

/// Configuration for the forwarded leaderboard API.
///
/// # Example
///
/// ```
/// use xpgate_core::UpstreamConfig;
///
/// let config = UpstreamConfig::default();
/// assert!(config.is_valid());
/// assert_eq!(config.base_url, "https://leaderboard.incentiv.io");
/// assert!(config.timeout.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Scheme and host of the API, without trailing slash
    pub base_url: String,
    /// Portal origin presented in `Origin` and `Referer`
    pub origin: String,
    /// Browser user agent presented to the API
    pub user_agent: String,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl UpstreamConfig {
    /// Returns `true` if the configuration is valid.
    ///
    /// The base URL must be an absolute http(s) URL.
    pub fn is_valid(&self) -> bool {
        self.base_url.starts_with("http://") || self.base_url.starts_with("https://")
    }

    /// Converts a timeout in seconds to the optional override (0 = none).
    pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
        if secs == 0 {
            None
        } else {
            Some(Duration::from_secs(secs))
        }
    }

    /// Returns the timeout formatted for display.
    pub fn timeout_display(&self) -> String {
        match self.timeout {
            Some(timeout) => format!("{} seconds", timeout.as_secs()),
            None => "transport default".to_string(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::UPSTREAM_BASE_URL.to_string(),
            origin: defaults::UPSTREAM_ORIGIN.to_string(),
            user_agent: defaults::UPSTREAM_USER_AGENT.to_string(),
            timeout: Self::timeout_from_secs(defaults::UPSTREAM_TIMEOUT_SECS),
        }
    }
}

/// Identifier of the calling client, used as the rate limiting key.
///
/// Derived from the `x-forwarded-for` header and therefore not authenticated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a client identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The placeholder shared by every request without forwarding headers.
    pub fn loopback() -> Self {
        Self::new(defaults::LOOPBACK_CLIENT_ID)
    }

    /// Returns `true` if this is the shared loopback placeholder.
    pub fn is_loopback(&self) -> bool {
        self.0 == defaults::LOOPBACK_CLIENT_ID
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
