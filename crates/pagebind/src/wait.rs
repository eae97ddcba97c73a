//! Wait Engine
//!
//! Synchronous polling until a predicate holds or a timeout elapses.
//!
//! Every wait names a [`WaitCondition`]. The condition picks the driver check
//! for element waits and is carried in the timeout error so a report can tell
//! "never appeared" apart from "appeared but never settled".
//!
//! The loop blocks the calling thread. Time is read and slept through a
//! [`Clock`], so tests drive it with [`crate::clock::ManualClock`].

use crate::clock::{Clock, SystemClock};
use crate::config::AutomationConfig;
use crate::driver::{BoundingBox, BrowserDriver, ControlHandle};
use crate::result::{AutomationError, AutomationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Shortest polling interval; smaller intervals are raised to it
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// WAIT CONDITION
// =============================================================================

/// States an element can be waited into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitCondition {
    /// Element is attached to the document
    Exists,
    /// Element position is unchanged across consecutive samples
    NotMoving,
    /// Element accepts input
    BecomesEnabled,
    /// Element is displayed
    BecomesVisible,
    /// Element is no longer attached
    NotExists,
}

impl WaitCondition {
    /// Condition name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exists => "Exists",
            Self::NotMoving => "NotMoving",
            Self::BecomesEnabled => "BecomesEnabled",
            Self::BecomesVisible => "BecomesVisible",
            Self::NotExists => "NotExists",
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Condition that was satisfied
    pub condition: WaitCondition,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the predicate was evaluated
    pub polls: u32,
}

// =============================================================================
// WAIT ENGINE
// =============================================================================

/// Polls predicates with a bounded timeout
#[derive(Debug, Clone)]
pub struct WaitEngine {
    timeout: Duration,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for WaitEngine {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        )
    }
}

impl WaitEngine {
    /// Create an engine on the system clock.
    ///
    /// `poll_interval` is raised to [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Create an engine from the configuration snapshot
    #[must_use]
    pub fn from_config(config: &AutomationConfig) -> Self {
        Self::new(config.default_element_timeout, config.poll_interval)
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Default timeout applied when a call does not override it
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Interval between predicate evaluations
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll `predicate` until it returns true.
    ///
    /// The predicate is evaluated at least once, even with a zero timeout.
    /// Predicate errors end the wait immediately.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationError::Timeout`] when the timeout elapses first.
    pub fn wait_for<F>(
        &self,
        predicate: F,
        condition: WaitCondition,
        timeout: Option<Duration>,
    ) -> AutomationResult<WaitOutcome>
    where
        F: FnMut() -> AutomationResult<bool>,
    {
        self.poll(predicate, condition, None, timeout)
    }

    /// Like [`WaitEngine::wait_for`], naming `element` in the timeout error
    pub fn wait_for_named<F>(
        &self,
        predicate: F,
        condition: WaitCondition,
        element: &str,
        timeout: Option<Duration>,
    ) -> AutomationResult<WaitOutcome>
    where
        F: FnMut() -> AutomationResult<bool>,
    {
        self.poll(predicate, condition, Some(element), timeout)
    }

    /// Wait for a located control to reach `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationError::Timeout`] naming `element` when the control
    /// does not get there in time, or the driver's error.
    pub fn wait_for_element(
        &self,
        driver: &dyn BrowserDriver,
        handle: &ControlHandle,
        element: &str,
        condition: WaitCondition,
        timeout: Option<Duration>,
    ) -> AutomationResult<WaitOutcome> {
        match condition {
            WaitCondition::Exists => {
                self.poll(|| driver.is_present(handle), condition, Some(element), timeout)
            }
            WaitCondition::NotExists => self.poll(
                || driver.is_present(handle).map(|present| !present),
                condition,
                Some(element),
                timeout,
            ),
            WaitCondition::BecomesEnabled => {
                self.poll(|| driver.is_enabled(handle), condition, Some(element), timeout)
            }
            WaitCondition::BecomesVisible => {
                self.poll(|| driver.is_visible(handle), condition, Some(element), timeout)
            }
            WaitCondition::NotMoving => {
                let mut previous: Option<BoundingBox> = None;
                self.poll(
                    || {
                        let current = driver.bounding_box(handle)?;
                        let still = current.is_some() && current == previous;
                        previous = current;
                        Ok(still)
                    },
                    condition,
                    Some(element),
                    timeout,
                )
            }
        }
    }

    fn poll<F>(
        &self,
        mut predicate: F,
        condition: WaitCondition,
        element: Option<&str>,
        timeout: Option<Duration>,
    ) -> AutomationResult<WaitOutcome>
    where
        F: FnMut() -> AutomationResult<bool>,
    {
        let timeout = timeout.unwrap_or(self.timeout);
        let start = self.clock.now();
        let mut polls = 0;

        loop {
            polls += 1;
            if predicate()? {
                return Ok(WaitOutcome {
                    condition,
                    elapsed: self.clock.now().saturating_sub(start),
                    polls,
                });
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= timeout {
                tracing::warn!(
                    condition = %condition,
                    element = element.unwrap_or("<predicate>"),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "wait timed out"
                );
                return Err(AutomationError::Timeout {
                    condition,
                    element: element.map(str::to_string),
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }

            self.clock.sleep(self.poll_interval.min(timeout - elapsed));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
