//! Environment variable names used throughout xpgate configuration

/// Rate limiting configuration
pub const RATE_LIMIT_REQUESTS: &str = "RATE_LIMIT_REQUESTS";
pub const RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";

/// Upstream leaderboard API configuration
pub const UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";
pub const UPSTREAM_ORIGIN: &str = "UPSTREAM_ORIGIN";
pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";

/// Connection limits
pub const MAX_CONNECTIONS: &str = "MAX_CONNECTIONS";

/// Get all environment variable names for documentation/validation
pub fn all_env_vars() -> &'static [&'static str] {
    &[
        RATE_LIMIT_REQUESTS,
        RATE_LIMIT_WINDOW_SECS,
        UPSTREAM_BASE_URL,
        UPSTREAM_ORIGIN,
        UPSTREAM_TIMEOUT_SECS,
        MAX_CONNECTIONS,
    ]
}
