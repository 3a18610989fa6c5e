//! Rate limiting implementation for xpgate.
//!
//! Provides per-client rate limiting by counting in-window requests, with
//! each allowed request giving its credit back once the window has elapsed.
//!
//! # Algorithm
//!
//! - Each client has a counter, created lazily at zero
//! - If the counter exceeds the configured limit, the request is denied and
//!   the counter is left untouched
//! - Otherwise the counter is incremented, the request is allowed, and one
//!   release is scheduled to decrement the counter after the window
//!
//! This approximates a rolling window: short bursts are possible when many
//! requests land before any release fires, and with a limit of `N` the
//! `N + 2`-th request inside a window is the first one denied.
//!
//! # Memory Management
//!
//! Counters never go below zero. A client whose counter decays back to zero
//! is evicted, so the table only holds clients with requests still inside
//! their window.
//!
//! # Thread Safety
//!
//! Uses `tokio::sync::Mutex` for async-friendly locking that won't block
//! the Tokio thread pool. State is local to the process; several instances
//! behind a load balancer each enforce their own limit.
//!
//! # Example
//!
//! ```ignore
//! use xpgate_core::{rate_limiter, ClientId, RateLimiter};
//!
//! let limiter = RateLimiter::new();
//!
//! if rate_limiter::check_rate_limit(&limiter, &ClientId::new("192.0.2.1"), &config)
//!     .await
//!     .is_allowed()
//! {
//!     // Request allowed
//! } else {
//!     // Rate limit exceeded
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::debug;

use crate::types::{ClientId, RateLimitingProvider};

/// Outcome of a rate limit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request may proceed; one release has been scheduled.
    Allowed,
    /// The client is over its limit (HTTP 429).
    Denied,
}

impl RateLimitDecision {
    /// Returns `true` for [`RateLimitDecision::Allowed`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Thread-safe rate limiter state shared across all connections.
///
/// Wraps a HashMap mapping client identifiers to their in-window request
/// counts. Cloning is cheap and shares the same state.
///
/// # Example
///
/// ```
/// use xpgate_core::RateLimiter;
///
/// let limiter = RateLimiter::new();
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    counts: Arc<Mutex<HashMap<ClientId, u32>>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl RateLimiter {
    /// Creates a new empty rate limiter.
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            counts: Arc::new(Mutex::new(HashMap::new())),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Returns the current count for `client` (0 if untracked).
    #[cfg(test)]
    pub(crate) async fn count(&self, client: &ClientId) -> u32 {
        self.counts.lock().await.get(client).copied().unwrap_or(0)
    }

    /// Returns the number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.counts.lock().await.len()
    }

    /// Gives one request credit back to `client`.
    ///
    /// The count saturates at zero; an entry reaching zero is evicted.
    /// Releasing an untracked client is a no-op.
    pub async fn release(&self, client: &ClientId) {
        let mut counts = self.counts.lock().await;
        if let Some(count) = counts.get_mut(client) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(client);
                debug!(
                    client = %client,
                    remaining_entries = counts.len(),
                    "Rate limiter entry evicted"
                );
            }
        }
    }

    /// Cancels every pending release.
    ///
    /// Counts are frozen from this point on; checks keep working but no
    /// longer schedule releases.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Returns `true` once [`RateLimiter::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Spawns the deferred release of one credit for `client`.
    ///
    /// Nothing is scheduled once the limiter is shut down.
    fn schedule_release(&self, client: ClientId, window: Duration) {
        if self.is_shut_down() {
            return;
        }

        let deadline = Instant::now() + window;
        let mut stopped = self.shutdown.subscribe();
        let limiter = self.clone();

        tokio::spawn(async move {
            // The watch guard must not outlive its branch: it is not Send
            let cancelled = async move {
                let _ = stopped.wait_for(|stopped| *stopped).await;
            };

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => limiter.release(&client).await,
                _ = cancelled => {}
            }
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks if a request from the given client should be allowed.
///
/// # Algorithm
///
/// 1. If the client's count exceeds `max_requests`, deny without counting
/// 2. Otherwise increment the count, allow, and schedule one release
///    `window_duration` from now
///
/// Must be called from within a Tokio runtime.
///
/// # Arguments
///
/// * `limiter` - Shared rate limiter state
/// * `client` - Client identifier to check
/// * `config` - Configuration provider for rate limit settings
///
/// # Example
///
/// ```ignore
/// use xpgate_core::rate_limiter::check_rate_limit;
///
/// if !check_rate_limit(&limiter, &client, &config).await.is_allowed() {
///     return Err(ProxyError::RateLimited(client));
/// }
/// ```
pub async fn check_rate_limit(
    limiter: &RateLimiter,
    client: &ClientId,
    config: &impl RateLimitingProvider,
) -> RateLimitDecision {
    let rate_config = config.rate_limit_config();

    {
        let mut counts = limiter.counts.lock().await;
        let count = counts.entry(client.clone()).or_insert(0);

        if *count > rate_config.max_requests {
            debug!(client = %client, count = *count, "Rate limit exceeded");
            return RateLimitDecision::Denied;
        }

        *count += 1;
    }

    limiter.schedule_release(client.clone(), rate_config.window_duration);
    RateLimitDecision::Allowed
}
