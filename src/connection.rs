//! Connection management for xpgate.
//!
//! - [`ConnectionLimiter`] caps concurrent connections with a semaphore
//! - [`ConnectionTracker`] counts live connections so shutdown can drain them
//! - [`drain`] runs the shutdown sequence

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use xpgate_core::RateLimiter;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tracks active connections for graceful shutdown.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
}

/// Marks one live connection; the count drops when the guard does.
#[derive(Debug)]
pub struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConnectionTracker {
    /// Create a new connection tracker.
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Registers a connection until the returned guard is dropped.
    pub fn track(&self) -> ConnectionGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            active: self.active.clone(),
        }
    }

    /// Get current active connection count.
    pub fn count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for all connections to finish with timeout.
    /// Returns true if all connections finished, false if timeout reached.
    pub async fn wait_for_shutdown(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while self.count() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }

        true
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`ConnectionLimiter::admit`].
#[derive(Debug)]
pub enum Admission {
    /// Limiting is disabled
    Unlimited,
    /// A slot was reserved until the permit is dropped
    Permitted(OwnedSemaphorePermit),
    /// Every slot is taken
    AtCapacity,
}

/// Caps the number of concurrent connections.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    semaphore: Option<Arc<Semaphore>>,
    max_connections: usize,
}

impl ConnectionLimiter {
    /// Create a new connection limiter.
    /// If max_connections is 0, no limit is enforced.
    pub fn new(max_connections: usize) -> Self {
        let semaphore = (max_connections > 0).then(|| Arc::new(Semaphore::new(max_connections)));

        Self {
            semaphore,
            max_connections,
        }
    }

    /// Check if connection limiting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.semaphore.is_some()
    }

    /// Get the maximum number of connections (0 means unlimited).
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Tries to reserve a slot for a new connection without waiting.
    pub fn admit(&self) -> Admission {
        match &self.semaphore {
            None => Admission::Unlimited,
            Some(sem) => match sem.clone().try_acquire_owned() {
                Ok(permit) => Admission::Permitted(permit),
                Err(_) => Admission::AtCapacity,
            },
        }
    }
}

/// Waits up to `grace_period` for open connections, then cancels the rate
/// limiter's pending releases.
///
/// Requests served while draining still get their credits back. Returns
/// `false` if connections were still open when the grace period ran out.
pub async fn drain(
    tracker: &ConnectionTracker,
    limiter: &RateLimiter,
    grace_period: Duration,
) -> bool {
    let drained = tracker.wait_for_shutdown(grace_period).await;
    limiter.shutdown();
    drained
}
