//! Wait Mechanisms
//!
//! Polling primitives shared by the assertion helpers. A condition is
//! re-evaluated every poll interval until it holds or the timeout elapses;
//! the driver is queried afresh on each poll.

use crate::result::PomResult;
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for network alias waits (20 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// Default timeout for assertion retries (4 seconds)
pub const DEFAULT_ASSERTION_TIMEOUT_MS: u64 = 4_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_ASSERTION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the condition held before the timeout
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub attempts: u32,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub const fn success(elapsed: Duration, attempts: u32) -> Self {
        Self {
            success: true,
            elapsed,
            attempts,
        }
    }

    /// Create a timed-out wait result
    #[must_use]
    pub const fn timeout(elapsed: Duration, attempts: u32) -> Self {
        Self {
            success: false,
            elapsed,
            attempts,
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Re-evaluate `condition` until it returns `true` or the timeout elapses.
///
/// The condition is always evaluated at least once. Driver errors abort the
/// wait immediately; a timeout is reported through [`WaitResult::success`].
pub async fn poll_until<F, Fut>(options: &WaitOptions, mut condition: F) -> PomResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PomResult<bool>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut attempts = 0;

    loop {
        attempts += 1;
        if condition().await? {
            return Ok(WaitResult::success(start.elapsed(), attempts));
        }
        if start.elapsed() >= timeout {
            return Ok(WaitResult::timeout(start.elapsed(), attempts));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Wait for a fixed duration (prefer a condition where one exists)
pub async fn wait_timeout(duration_ms: u64) {
    if duration_ms > 0 {
        tokio::time::sleep(Duration::from_millis(duration_ms)).await;
    }
}
