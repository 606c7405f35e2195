//! Readiness polling.
//!
//! Every wait here is the same loop: check, and if the check is not yet
//! satisfied sleep for the poll interval, until the timeout elapses. Polls
//! block the calling thread; there is no cancellation other than the timeout,
//! and a session that goes away mid-poll ends the poll with
//! [`PagewireError::SessionUnavailable`] rather than a timeout.
//!
//! | wait                  | default timeout | default interval |
//! |-----------------------|-----------------|------------------|
//! | [`await_visible`]     | 10 s            | 500 ms           |
//! | [`await_page_loaded`] | 30 s            | 5 s              |
//! | [`await_present`]     | 180 s           | 3 s              |

use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::resolver::resolve_one;
use crate::result::{PagewireError, PagewireResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default visibility timeout (10 seconds)
pub const DEFAULT_VISIBILITY_TIMEOUT_MS: u64 = 10_000;

/// Default visibility polling interval (500ms)
pub const DEFAULT_VISIBILITY_POLL_MS: u64 = 500;

/// Default page-load timeout (30 seconds)
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Default page-load polling interval (5 seconds)
pub const DEFAULT_PAGE_LOAD_POLL_MS: u64 = 5_000;

/// Default presence timeout (60 polls of 3 seconds)
pub const DEFAULT_PRESENCE_TIMEOUT_MS: u64 = 180_000;

/// Default presence polling interval (3 seconds)
pub const DEFAULT_PRESENCE_POLL_MS: u64 = 3_000;

/// Floor applied to every polling interval
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Script polled for document readiness
pub const READY_STATE_SCRIPT: &str = "return document.readyState;";

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Timeout and polling interval for one kind of wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::visibility()
    }
}

impl WaitOptions {
    /// Create wait options
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Defaults for visibility waits
    #[must_use]
    pub const fn visibility() -> Self {
        Self::new(DEFAULT_VISIBILITY_TIMEOUT_MS, DEFAULT_VISIBILITY_POLL_MS)
    }

    /// Defaults for page-load waits
    #[must_use]
    pub const fn page_load() -> Self {
        Self::new(DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_PAGE_LOAD_POLL_MS)
    }

    /// Defaults for presence waits
    #[must_use]
    pub const fn presence() -> Self {
        Self::new(DEFAULT_PRESENCE_TIMEOUT_MS, DEFAULT_PRESENCE_POLL_MS)
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

    /// Get poll interval as Duration, never below [`MIN_POLL_INTERVAL_MS`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            Duration::from_millis(MIN_POLL_INTERVAL_MS)
        } else {
            Duration::from_millis(self.poll_interval_ms)
        }
    }

    /// Reject a zero polling interval
    ///
    /// # Errors
    ///
    /// [`PagewireError::Config`] naming `name` when `poll_interval_ms` is 0.
    pub fn validate(&self, name: &str) -> PagewireResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PagewireError::config(format!(
                "waits.{name}.poll_interval_ms must be greater than 0"
            )));
        }
        Ok(())
    }
}

/// Wait options for each kind of wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitConfig {
    /// Element visibility before interaction
    pub visibility: WaitOptions,
    /// Document readiness
    pub page_load: WaitOptions,
    /// Element presence without visibility
    pub presence: WaitOptions,
}

impl WaitConfig {
    /// Check every wait
    ///
    /// # Errors
    ///
    /// [`PagewireError::Config`] for the first wait with a zero interval.
    pub fn validate(&self) -> PagewireResult<()> {
        self.visibility.validate("visibility")?;
        self.page_load.validate("page_load")?;
        self.presence.validate("presence")
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            visibility: WaitOptions::visibility(),
            page_load: WaitOptions::page_load(),
            presence: WaitOptions::presence(),
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it yields a value or the timeout elapses.
///
/// `Ok(None)` and errors other than session loss count as "not yet". The
/// check always runs at least once, and runs one last time when the timeout
/// is reached, so a failure is reported only after at least `timeout`.
///
/// # Errors
///
/// [`PagewireError::TimeoutExceeded`] naming `waiting_for`, or
/// [`PagewireError::SessionUnavailable`] as soon as the check reports it.
pub fn poll_until<T, F>(
    waiting_for: impl Display,
    options: &WaitOptions,
    mut check: F,
) -> PagewireResult<T>
where
    F: FnMut() -> PagewireResult<Option<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval();
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        match check() {
            Ok(Some(value)) => {
                debug!(
                    waiting_for = %waiting_for,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "wait satisfied"
                );
                return Ok(value);
            }
            Ok(None) => trace!(waiting_for = %waiting_for, attempts, "not ready"),
            Err(e) if e.is_session_loss() => return Err(e),
            Err(e) => trace!(waiting_for = %waiting_for, attempts, error = %e, "check failed"),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            break;
        }
        std::thread::sleep(poll_interval.min(timeout - elapsed));
    }

    debug!(waiting_for = %waiting_for, attempts, timeout_ms = options.timeout_ms, "wait timed out");
    Err(PagewireError::TimeoutExceeded {
        locator: waiting_for.to_string(),
        timeout_ms: options.timeout_ms,
    })
}

/// Wait until the first element matching `locator` is present and displayed.
pub fn await_visible<D: Driver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: &WaitOptions,
) -> PagewireResult<ElementHandle> {
    poll_until(locator, options, || {
        let handle = resolve_one(driver, locator)?;
        Ok(driver.is_displayed(&handle)?.then_some(handle))
    })
}

/// Wait until an element matching `locator` exists, visible or not.
pub fn await_present<D: Driver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: &WaitOptions,
) -> PagewireResult<ElementHandle> {
    poll_until(locator, options, || resolve_one(driver, locator).map(Some))
}

/// Wait until `document.readyState` reports `complete`.
pub fn await_page_loaded<D: Driver + ?Sized>(
    driver: &mut D,
    options: &WaitOptions,
) -> PagewireResult<()> {
    poll_until("document.readyState == complete", options, || {
        let state = driver.execute_script(READY_STATE_SCRIPT, &[])?;
        Ok((state.as_str() == Some("complete")).then_some(()))
    })
}

// =============================================================================
// TESTS
// =============================================================================
