//! Configuration management for xpgate.
//!
//! This module handles loading and caching configuration from environment variables.
//! All configurations are computed once at first access and cached for the lifetime
//! of the application using `once_cell::sync::Lazy`.
//!
//! Invalid values never abort startup: they are logged with a warning and the
//! default is used instead.
//!
//! # Example
//!
//! ```
//! use xpgate::config;
//!
//! let rate_config = config::get_rate_limit_config();
//! println!("Max requests: {}", rate_config.max_requests);
//!
//! let upstream = config::get_upstream_config();
//! println!("Forwarding to {}", upstream.base_url);
//! ```

use std::env::{self, VarError};
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::env_vars;
use xpgate_core::defaults;
use xpgate_core::{
    ConnectionProvider, RateLimitConfig, RateLimitingProvider, UpstreamConfig, UpstreamProvider,
};

// ============================================================================
// Cached Configuration (computed once at first access)
// ============================================================================

static RATE_LIMIT_CONFIG: Lazy<RateLimitConfig> =
    Lazy::new(|| compute_rate_limit_config(|key| env::var(key)));
static UPSTREAM_CONFIG: Lazy<UpstreamConfig> =
    Lazy::new(|| compute_upstream_config(|key| env::var(key)));
static MAX_CONNECTIONS: Lazy<usize> = Lazy::new(|| compute_max_connections(|key| env::var(key)));

// ============================================================================
// Internal Helpers
// ============================================================================

/// Parses an environment variable with fallback to a default value.
///
/// Logs a warning if the value exists but cannot be parsed.
fn parse_env_var_or_default<T, F>(env_var: &F, var_name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = var_name, value = %value, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Reads a non-empty string variable, trimmed.
fn string_env_var<F>(env_var: &F, var_name: &str) -> Option<String>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    env_var(var_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// ============================================================================
// Public Configuration Getters
// ============================================================================

/// Returns the cached rate limiting configuration.
///
/// Configuration is read from environment variables on first access:
/// - `RATE_LIMIT_REQUESTS`: Count a client may reach (default: 20)
/// - `RATE_LIMIT_WINDOW_SECS`: Delay before each credit is returned (default: 60)
pub fn get_rate_limit_config() -> &'static RateLimitConfig {
    &RATE_LIMIT_CONFIG
}

/// Compute rate limiting configuration from environment variables
/// Invalid values fall back to defaults and log warnings
fn compute_rate_limit_config<F>(env_var: F) -> RateLimitConfig
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let max_requests = parse_env_var_or_default(
        &env_var,
        env_vars::RATE_LIMIT_REQUESTS,
        defaults::RATE_LIMIT_REQUESTS,
    );

    let window_secs = parse_env_var_or_default(
        &env_var,
        env_vars::RATE_LIMIT_WINDOW_SECS,
        defaults::RATE_LIMIT_WINDOW_SECS,
    );

    let config = RateLimitConfig {
        max_requests,
        window_duration: Duration::from_secs(window_secs),
    };

    if !config.is_valid() {
        warn!("Invalid rate limit configuration, using defaults");
        return RateLimitConfig::default();
    }

    config
}

/// Returns the cached upstream configuration.
///
/// Configuration is read from environment variables on first access:
/// - `UPSTREAM_BASE_URL`: Leaderboard API base URL (default: `https://leaderboard.incentiv.io`)
/// - `UPSTREAM_ORIGIN`: Portal origin sent as `Origin`/`Referer` (default: `https://portal.incentiv.io`)
/// - `UPSTREAM_TIMEOUT_SECS`: Request timeout (default: 0, transport default)
///
/// # Example
///
/// ```
/// use xpgate::config::get_upstream_config;
///
/// let config = get_upstream_config();
/// println!("Timeout: {}", config.timeout_display());
/// ```
pub fn get_upstream_config() -> &'static UpstreamConfig {
    &UPSTREAM_CONFIG
}

/// Computes upstream configuration from environment variables.
fn compute_upstream_config<F>(env_var: F) -> UpstreamConfig
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let mut config = UpstreamConfig::default();

    if let Some(base_url) = string_env_var(&env_var, env_vars::UPSTREAM_BASE_URL) {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(origin) = string_env_var(&env_var, env_vars::UPSTREAM_ORIGIN) {
        config.origin = origin.trim_end_matches('/').to_string();
    }

    let timeout_secs = parse_env_var_or_default(
        &env_var,
        env_vars::UPSTREAM_TIMEOUT_SECS,
        defaults::UPSTREAM_TIMEOUT_SECS,
    );
    config.timeout = UpstreamConfig::timeout_from_secs(timeout_secs);

    if !config.is_valid() {
        warn!(base_url = %config.base_url, "Invalid upstream base URL, using default");
        config.base_url = defaults::UPSTREAM_BASE_URL.to_string();
    }

    config
}

/// Returns the cached maximum number of concurrent connections.
///
/// Configuration is read from `MAX_CONNECTIONS` environment variable on first access.
///
/// # Returns
///
/// - `0`: Unlimited connections
/// - `> 0`: Maximum number of concurrent connections
///
/// **Default**: `10000`
pub fn get_max_connections() -> usize {
    *MAX_CONNECTIONS
}

/// Computes maximum connections from environment variable.
fn compute_max_connections<F>(env_var: F) -> usize
where
    F: Fn(&str) -> Result<String, VarError>,
{
    parse_env_var_or_default(
        &env_var,
        env_vars::MAX_CONNECTIONS,
        defaults::MAX_CONNECTIONS,
    )
}

// ============================================================================
// EnvVarConfig - configuration provider backed by environment variables
// ============================================================================

/// Configuration provider that reads from environment variables.
///
/// This is the configuration provider used by the xpgate binary.
/// All values come from the global lazy statics above.
///
/// # Example
///
/// ```
/// use xpgate::config::EnvVarConfig;
/// use xpgate::types::RateLimitingProvider;
///
/// let config = EnvVarConfig::new();
/// println!("Max requests: {}", config.rate_limit_config().max_requests);
/// ```
#[derive(Clone, Debug)]
pub struct EnvVarConfig {
    _private: (),
}

impl EnvVarConfig {
    /// Creates a new configuration provider from environment variables.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for EnvVarConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitingProvider for EnvVarConfig {
    fn rate_limit_config(&self) -> &RateLimitConfig {
        get_rate_limit_config()
    }
}

impl UpstreamProvider for EnvVarConfig {
    fn upstream_config(&self) -> &UpstreamConfig {
        get_upstream_config()
    }
}

impl ConnectionProvider for EnvVarConfig {
    fn max_connections(&self) -> usize {
        get_max_connections()
    }
}
