//! Wait Mechanisms
//!
//! Settle delays, load states and a polling helper shared by the drivers and
//! the page adapter.
//!
//! The hosted page converts reactively as the input changes, with no submit
//! action, so most waits here are fixed settle delays rather than conditions.

use crate::result::{SwiftError, SwiftResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default per-test timeout (30 seconds)
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for element actions (15 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 15_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Wait for the `load` event to fire
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    #[default]
    NetworkIdle,
}

impl LoadState {
    /// Get the name of this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// `document.readyState` values that satisfy this state
    #[must_use]
    pub const fn ready_states(&self) -> &'static [&'static str] {
        match self {
            Self::DomContentLoaded => &["interactive", "complete"],
            Self::Load | Self::NetworkIdle => &["complete"],
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// TIMINGS
// =============================================================================

/// Settle delays and timeouts for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Wait after clearing the input so the output clears
    pub clear_settle_ms: u64,
    /// Wait after filling the input for the page's conversion
    pub type_settle_ms: u64,
    /// Extra wait in functional scenarios before reading output
    pub functional_settle_ms: u64,
    /// Extra wait in UI scenarios before reading output
    pub ui_settle_ms: u64,
    /// Delay between keystrokes when typing key by key
    pub key_delay_ms: u64,
    /// Navigation timeout
    pub navigation_timeout_ms: u64,
    /// Quiet period that counts as network idle
    pub network_idle_ms: u64,
    /// Timeout for element waits such as reading output
    pub action_timeout_ms: u64,
    /// Timeout for each element in the responsiveness probe
    pub probe_timeout_ms: u64,
    /// Timeout for a whole test case
    pub test_timeout_ms: u64,
    /// Polling interval for condition waits
    pub poll_interval_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            clear_settle_ms: 500,
            type_settle_ms: 3000,
            functional_settle_ms: 1500,
            ui_settle_ms: 2000,
            key_delay_ms: 100,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            network_idle_ms: NETWORK_IDLE_THRESHOLD_MS,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            probe_timeout_ms: 5000,
            test_timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timings {
    /// No settle delays and short timeouts, for driving in-memory pages
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            clear_settle_ms: 0,
            type_settle_ms: 0,
            functional_settle_ms: 0,
            ui_settle_ms: 0,
            key_delay_ms: 0,
            navigation_timeout_ms: 1000,
            network_idle_ms: 0,
            action_timeout_ms: 200,
            probe_timeout_ms: 100,
            test_timeout_ms: 5000,
            poll_interval_ms: 1,
        }
    }

    /// Set the per-test timeout
    #[must_use]
    pub const fn with_test_timeout(mut self, ms: u64) -> Self {
        self.test_timeout_ms = ms;
        self
    }

    /// Set the post-type settle delay
    #[must_use]
    pub const fn with_type_settle(mut self, ms: u64) -> Self {
        self.type_settle_ms = ms;
        self
    }

    /// Clear settle delay
    #[must_use]
    pub const fn clear_settle(&self) -> Duration {
        Duration::from_millis(self.clear_settle_ms)
    }

    /// Type settle delay
    #[must_use]
    pub const fn type_settle(&self) -> Duration {
        Duration::from_millis(self.type_settle_ms)
    }

    /// Functional scenario settle delay
    #[must_use]
    pub const fn functional_settle(&self) -> Duration {
        Duration::from_millis(self.functional_settle_ms)
    }

    /// UI scenario settle delay
    #[must_use]
    pub const fn ui_settle(&self) -> Duration {
        Duration::from_millis(self.ui_settle_ms)
    }

    /// Keystroke delay
    #[must_use]
    pub const fn key_delay(&self) -> Duration {
        Duration::from_millis(self.key_delay_ms)
    }

    /// Navigation timeout
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Network idle window
    #[must_use]
    pub const fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    /// Element action timeout
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Responsiveness probe timeout
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Per-test timeout
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Sleep for a settle delay; a zero delay returns immediately
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Requests a page has started but not yet finished.
///
/// The network counts as idle once nothing has been in flight for the idle
/// threshold.
#[derive(Debug)]
pub struct InflightRequests {
    pending: HashSet<String>,
    quiet_since: Option<Instant>,
}

impl InflightRequests {
    /// Empty tracker, quiet from `now`
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            pending: HashSet::new(),
            quiet_since: Some(now),
        }
    }

    /// A request was sent
    pub fn started(&mut self, id: impl Into<String>) {
        let _ = self.pending.insert(id.into());
        self.quiet_since = None;
    }

    /// A request finished or failed; unknown ids are ignored
    pub fn finished(&mut self, id: &str, now: Instant) {
        if self.pending.remove(id) && self.pending.is_empty() {
            self.quiet_since = Some(now);
        }
    }

    /// Restart the quiet period at `now` when nothing is in flight
    pub fn restart_quiet(&mut self, now: Instant) {
        if self.pending.is_empty() {
            self.quiet_since = Some(now);
        }
    }

    /// Requests still in flight
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Nothing in flight for at least `idle_for`
    #[must_use]
    pub fn is_idle(&self, now: Instant, idle_for: Duration) -> bool {
        self.quiet_since
            .is_some_and(|since| now.saturating_duration_since(since) >= idle_for)
    }
}

/// Poll `condition` until it reports `true` or `timeout` elapses.
///
/// Errors from the condition abort the wait and are returned unchanged.
///
/// # Errors
///
/// Returns [`SwiftError::Timeout`] named after `operation` when the deadline
/// passes, or the condition's own error.
pub async fn wait_until<F, Fut>(
    operation: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut condition: F,
) -> SwiftResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SwiftResult<bool>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await? {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(SwiftError::timeout(operation, timeout.as_millis() as u64));
        }
        if poll_interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(poll_interval).await;
        }
    }
}
