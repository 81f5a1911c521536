//! Polling wait engine.
//!
//! Single-threaded cooperative synchronization: a condition closure is the
//! only probe, re-evaluated every poll interval until it reports true or the
//! deadline passes. There are no push events anywhere in the harness; every
//! "wait until X" in the page objects funnels through [`wait_for`].

use crate::result::{RecorrerError, RecorrerResult};
use std::time::{Duration, Instant};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// What a timeout should say was being waited for
    pub message: Option<String>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            message: None,
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

    /// Set timeout in whole seconds
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_ms = secs * 1_000;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the timeout description
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
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

    fn timeout_error(&self) -> RecorrerError {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "condition was not satisfied".to_string());
        RecorrerError::timeout(message, self.timeout())
    }
}

/// Result of a completed wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a satisfied wait result
    #[must_use]
    pub fn satisfied(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

/// Wait for a fallible condition to report true.
///
/// The condition is evaluated at least once, even with a zero timeout, so a
/// state that is already good never times out. A condition error aborts the
/// wait immediately; only exhausting the deadline produces
/// [`RecorrerError::Timeout`], whose rendered message names the bound.
pub fn wait_for<F>(mut condition: F, options: &WaitOptions) -> RecorrerResult<WaitResult>
where
    F: FnMut() -> RecorrerResult<bool>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval();
    let description = options
        .message
        .clone()
        .unwrap_or_else(|| "condition".to_string());

    loop {
        if condition()? {
            return Ok(WaitResult::satisfied(start.elapsed(), description));
        }
        if start.elapsed() >= timeout {
            tracing::debug!(
                timeout_ms = options.timeout_ms,
                waited_for = %description,
                "wait deadline exhausted"
            );
            return Err(options.timeout_error());
        }
        std::thread::sleep(poll_interval);
    }
}

/// Wait for an infallible predicate with default options.
pub fn wait_until<F>(mut predicate: F, timeout_ms: u64) -> RecorrerResult<WaitResult>
where
    F: FnMut() -> bool,
{
    let options = WaitOptions::new().with_timeout(timeout_ms);
    wait_for(|| Ok(predicate()), &options)
}
