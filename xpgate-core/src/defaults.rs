//! Default configuration values for xpgate.
//!
//! This module centralizes all default values used throughout xpgate,
//! ensuring consistency between production code and tests.

use std::time::Duration;

/// Default request allowance per window.
///
/// A client is denied once its count *exceeds* this value, so the effective
/// allowance is `RATE_LIMIT_REQUESTS + 1` checks per window.
pub const RATE_LIMIT_REQUESTS: u32 = 20;

/// Default rate limit window duration in seconds.
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Default rate limit window duration.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(RATE_LIMIT_WINDOW_SECS);

/// Default upstream leaderboard API base URL.
pub const UPSTREAM_BASE_URL: &str = "https://leaderboard.incentiv.io";

/// Default portal origin presented to the upstream.
pub const UPSTREAM_ORIGIN: &str = "https://portal.incentiv.io";

/// Browser user agent presented to the upstream.
pub const UPSTREAM_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default upstream timeout in seconds (0 = transport default, no override).
pub const UPSTREAM_TIMEOUT_SECS: u64 = 0;

/// Page size requested from the mystery-box listing.
pub const MYSTERY_BOX_PAGE_SIZE: u32 = 20;

/// Page requested from the mystery-box listing.
pub const MYSTERY_BOX_PAGE: u32 = 1;

/// Client identifier used when no `x-forwarded-for` header is present.
pub const LOOPBACK_CLIENT_ID: &str = "127.0.0.1";

/// Path of the single proxied route.
pub const PROXY_ROUTE: &str = "/api/proxy";

/// Default maximum concurrent connections.
pub const MAX_CONNECTIONS: usize = 10_000;

/// Default listen port.
pub const LISTEN_PORT: u16 = 3000;

/// Grace period for in-flight connections on shutdown.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);
