//! Stabilization Poller
//!
//! Wait-until-condition primitives with explicit budgets. Everything here
//! runs on `tokio::time`, so tests can drive the clock with
//! `#[tokio::test(start_paused = true)]`.
//!
//! - [`wait_until`]: boolean predicate, evaluated immediately and then every
//!   poll interval until true or the budget is spent.
//! - [`poll_until`]: same loop for probes that produce a value.
//! - [`wait_for_displayed`] / [`wait_for_exists`]: element state waits.
//! - [`wait_for_stable_count`]: count-convergence for lists that grow
//!   asynchronously.
//!
//! A timeout is never reported before the budget has elapsed.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::driver::UiDriver;
use crate::element::ElementRef;
use crate::result::{PagekitError, PagekitResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Wait for the opposite state (hidden / detached)
    pub reverse: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reverse: false,
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

    /// Wait for the element to disappear instead of appear
    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
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

/// Outcome of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the predicate ran
    pub evaluations: usize,
    /// Description of what was waited for
    pub waited_for: String,
}

/// What a probe saw on one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// Condition met, carrying the value
    Ready(T),
    /// Not yet; the string describes what was observed
    Pending(String),
}

/// Budget bookkeeping shared by the polling loops
#[derive(Debug)]
struct Deadline {
    start: Instant,
    timeout: Duration,
    interval: Duration,
}

impl Deadline {
    fn new(options: &WaitOptions) -> Self {
        Self {
            start: Instant::now(),
            timeout: options.timeout(),
            interval: options.poll_interval(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Sleep one interval, clamped to the deadline
    async fn pause(&self) {
        let remaining = self.timeout.saturating_sub(self.elapsed());
        tokio::time::sleep(self.interval.min(remaining)).await;
    }
}

// =============================================================================
// POLLING LOOPS
// =============================================================================

/// Poll `probe` until it is ready or the budget is spent
pub async fn poll_until<T, F, Fut>(
    mut probe: F,
    options: &WaitOptions,
    waited_for: &str,
) -> PagekitResult<(T, WaitResult)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PagekitResult<Probe<T>>>,
{
    let deadline = Deadline::new(options);
    let mut evaluations = 0;
    loop {
        evaluations += 1;
        match probe().await? {
            Probe::Ready(value) => {
                let result = WaitResult {
                    elapsed: deadline.elapsed(),
                    evaluations,
                    waited_for: waited_for.to_string(),
                };
                trace!(
                    waited_for,
                    evaluations,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "wait satisfied"
                );
                return Ok((value, result));
            }
            Probe::Pending(observed) => {
                if deadline.expired() {
                    return Err(PagekitError::Timeout {
                        ms: options.timeout_ms,
                        waited_for: waited_for.to_string(),
                        last_observed: observed,
                    });
                }
                trace!(waited_for, evaluations, %observed, "still waiting");
                deadline.pause().await;
            }
        }
    }
}

/// Wait for a boolean predicate to become true
pub async fn wait_until<F, Fut>(
    mut predicate: F,
    options: &WaitOptions,
    waited_for: &str,
) -> PagekitResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PagekitResult<bool>>,
{
    let (_, result) = poll_until(
        || {
            let fut = predicate();
            async move {
                Ok::<_, PagekitError>(if fut.await? {
                    Probe::Ready(())
                } else {
                    Probe::Pending("false".to_string())
                })
            }
        },
        options,
        waited_for,
    )
    .await?;
    Ok(result)
}

/// Wait until `handle` is displayed (or hidden with `options.reverse`).
///
/// An absent element counts as hidden.
pub async fn wait_for_displayed<D: UiDriver>(
    driver: &D,
    handle: &ElementRef,
    options: &WaitOptions,
) -> PagekitResult<WaitResult> {
    let want = !options.reverse;
    let waited_for = if want {
        format!("{handle} to be displayed")
    } else {
        format!("{handle} to be hidden")
    };
    wait_until(
        move || async move {
            Ok::<_, PagekitError>(handle.is_displayed_or_absent(driver).await? == want)
        },
        options,
        &waited_for,
    )
    .await
}

/// Wait until `handle` resolves (or stops resolving with `options.reverse`)
pub async fn wait_for_exists<D: UiDriver>(
    driver: &D,
    handle: &ElementRef,
    options: &WaitOptions,
) -> PagekitResult<WaitResult> {
    let want = !options.reverse;
    let waited_for = if want {
        format!("{handle} to exist")
    } else {
        format!("{handle} to be removed")
    };
    wait_until(
        move || async move { Ok::<_, PagekitError>(handle.exists(driver).await? == want) },
        options,
        &waited_for,
    )
    .await
}

/// Count-convergence wait.
///
/// Reads once for a baseline, then re-reads every poll interval. Two
/// consecutive equal sizes mean the collection has settled; otherwise the new
/// size becomes the baseline. Returns the settled size.
pub async fn wait_for_stable_count<F, Fut>(
    mut read: F,
    options: &WaitOptions,
    waited_for: &str,
) -> PagekitResult<usize>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PagekitResult<usize>>,
{
    let mut baseline = read().await?;
    let deadline = Deadline::new(options);
    loop {
        let current = read().await?;
        if current == baseline {
            trace!(waited_for, count = current, "count settled");
            return Ok(current);
        }
        trace!(waited_for, previous = baseline, current, "count still changing");
        baseline = current;
        if deadline.expired() {
            return Err(PagekitError::Timeout {
                ms: options.timeout_ms,
                waited_for: waited_for.to_string(),
                last_observed: current.to_string(),
            });
        }
        deadline.pause().await;
    }
}

/// Fixed settle delay for UI that exposes no "done rendering" signal
pub async fn settle(duration_ms: u64) {
    trace!(duration_ms, "settle delay");
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
}

// =============================================================================
// TESTS
// =============================================================================
