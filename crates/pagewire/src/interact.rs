//! Interaction facade.
//!
//! Every element operation runs the same pipeline:
//!
//! ```text
//! Locator ──► await_visible ──► evidence ──► action ──► InteractionRecord ──► Reporter
//!                  │                            │              ▲
//!                  └──── Err ──────┬──── Err ───┘              │
//!                                  ▼                           │
//!                     page screenshot <label>-failure.png ─────┘
//! ```
//!
//! A failed step carries the page-level failure screenshot instead of the
//! highlighted one.
//!
//! Evidence and reporting never decide whether a step passes. A screenshot
//! that cannot be taken or a reporter that cannot write is logged and the
//! action goes ahead.

use crate::codec;
use crate::config::HarnessConfig;
use crate::driver::{Driver, ElementHandle, Point};
use crate::evidence::{EvidenceCapture, EvidenceConfig};
use crate::locator::Locator;
use crate::reporter::{Action, InteractionRecord, Outcome, Reporter};
use crate::resolver;
use crate::result::{PagewireError, PagewireResult};
use crate::session::Session;
use crate::wait::{await_page_loaded, await_present, await_visible, WaitConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Element and window operations against a [`Session`]
#[derive(Debug)]
pub struct Interactions<R: Reporter> {
    waits: WaitConfig,
    evidence: EvidenceCapture,
    reporter: R,
}

impl<R: Reporter> Interactions<R> {
    /// Create a facade from explicit parts
    ///
    /// # Errors
    ///
    /// Returns error if the evidence capturer cannot be built.
    pub fn new(waits: WaitConfig, evidence: EvidenceConfig, reporter: R) -> PagewireResult<Self> {
        Ok(Self {
            waits,
            evidence: EvidenceCapture::new(evidence)?,
            reporter,
        })
    }

    /// Create a facade from a harness configuration
    ///
    /// # Errors
    ///
    /// Returns error if the evidence capturer cannot be built.
    pub fn from_config(config: &HarnessConfig, reporter: R) -> PagewireResult<Self> {
        Self::new(config.waits, config.evidence.clone(), reporter)
    }

    /// Wait settings in use
    #[must_use]
    pub const fn waits(&self) -> &WaitConfig {
        &self.waits
    }

    /// The reporter
    #[must_use]
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    // =========================================================================
    // Element operations
    // =========================================================================

    /// Click the element
    pub fn click<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        label: &str,
    ) -> PagewireResult<()> {
        self.perform(session, locator, Action::Click, label, |d, e| d.click(e))
    }

    /// Double-click the element
    pub fn double_click<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        label: &str,
    ) -> PagewireResult<()> {
        self.perform(session, locator, Action::DoubleClick, label, |d, e| {
            d.double_click(e)
        })
    }

    /// Type `text` into the element
    pub fn send_keys<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        text: &str,
        label: &str,
    ) -> PagewireResult<()> {
        self.perform(session, locator, Action::SendKeys, label, |d, e| {
            d.send_keys(e, text)
        })
    }

    /// Clear an editable element
    pub fn clear<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        label: &str,
    ) -> PagewireResult<()> {
        self.perform(session, locator, Action::Clear, label, |d, e| d.clear(e))
    }

    /// Read an attribute; `None` when the element lacks it
    pub fn get_attribute<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        name: &str,
        label: &str,
    ) -> PagewireResult<Option<String>> {
        self.perform(session, locator, Action::GetAttribute, label, |d, e| {
            d.attribute(e, name)
        })
    }

    /// Read the rendered text
    pub fn text<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        label: &str,
    ) -> PagewireResult<String> {
        self.perform(session, locator, Action::Text, label, |d, e| d.text(e))
    }

    /// Choose the `<option>` whose value is `value`
    pub fn select_by_value<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        value: &str,
        label: &str,
    ) -> PagewireResult<()> {
        self.perform(session, locator, Action::SelectByValue, label, |d, e| {
            d.select_by_value(e, value)
        })
    }

    /// Move the pointer over the element
    pub fn hover<D: Driver>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        label: &str,
    ) -> PagewireResult<()> {
        self.perform(session, locator, Action::Hover, label, |d, e| d.hover(e))
    }

    /// Whether an element matches right now; no waiting, no evidence
    pub fn is_present<D: Driver>(
        &self,
        session: &Session<D>,
        locator: &Locator,
    ) -> PagewireResult<bool> {
        resolver::is_present(session.driver()?, locator)
    }

    /// Wait for presence with the presence wait settings
    pub fn wait_for_presence<D: Driver>(
        &self,
        session: &Session<D>,
        locator: &Locator,
    ) -> PagewireResult<ElementHandle> {
        await_present(session.driver()?, locator, &self.waits.presence)
    }

    // =========================================================================
    // Page, window and alert operations
    // =========================================================================

    /// Navigate and wait for the document to finish loading
    pub fn open<D: Driver>(&self, session: &mut Session<D>, url: &str) -> PagewireResult<()> {
        let driver = session.driver_mut()?;
        driver.navigate(url)?;
        info!(url, "navigated");
        await_page_loaded(driver, &self.waits.page_load)
    }

    /// Wait until `document.readyState` is `complete`
    pub fn wait_until_page_load<D: Driver>(&self, session: &mut Session<D>) -> PagewireResult<()> {
        await_page_loaded(session.driver_mut()?, &self.waits.page_load)
    }

    /// Accept an open alert. Returns `false` when none is showing.
    pub fn switch_to_alert<D: Driver>(&self, session: &mut Session<D>) -> PagewireResult<bool> {
        let driver = session.driver_mut()?;
        let Some(text) = driver.alert_text()? else {
            debug!("no alert to accept");
            return Ok(false);
        };
        driver.accept_alert()?;
        info!(alert = %text, "alert accepted");
        Ok(true)
    }

    /// Switch to every window other than `parent`, in enumeration order.
    ///
    /// With several candidates the last one wins. Returns the handle focused
    /// afterwards, which is the current one when no other window exists.
    pub fn switch_to_new_window<D: Driver>(
        &self,
        session: &mut Session<D>,
        parent: &str,
    ) -> PagewireResult<String> {
        let driver = session.driver_mut()?;
        let handles = driver.window_handles()?;
        debug!(windows = handles.len(), "switching away from parent window");

        let mut focused = None;
        for handle in handles.iter().filter(|h| h.as_str() != parent) {
            driver.switch_to_window(handle)?;
            focused = Some(handle.clone());
        }

        let focused = match focused {
            Some(handle) => handle,
            None => driver.window_handle()?,
        };
        info!(window = %focused, title = %driver.title().unwrap_or_default(), "window focused");
        Ok(focused)
    }

    /// Return focus to a known window, typically the parent
    pub fn switch_to_window<D: Driver>(
        &self,
        session: &mut Session<D>,
        handle: &str,
    ) -> PagewireResult<()> {
        session.driver_mut()?.switch_to_window(handle)
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Swipe along the vertical axis.
    ///
    /// `start` and `end` are fractions of the window height, `anchor` the
    /// fraction of the width the finger stays on. `swipe_vertical(s, 0.8,
    /// 0.2, 0.5, ..)` scrolls content up from the lower part of the screen.
    pub fn swipe_vertical<D: Driver>(
        &self,
        session: &mut Session<D>,
        start: f64,
        end: f64,
        anchor: f64,
        duration: Duration,
    ) -> PagewireResult<()> {
        check_fractions(&[start, end, anchor])?;
        let driver = session.driver_mut()?;
        let size = driver.window_size()?;
        let x = scale(size.width, anchor);
        let from = Point::new(x, scale(size.height, start));
        let to = Point::new(x, scale(size.height, end));
        debug!(?from, ?to, "vertical swipe");
        driver.swipe(from, to, duration)
    }

    /// Swipe along the horizontal axis.
    ///
    /// `start` and `end` are fractions of the window width, `anchor` the
    /// fraction of the height the finger stays on.
    pub fn swipe_horizontal<D: Driver>(
        &self,
        session: &mut Session<D>,
        start: f64,
        end: f64,
        anchor: f64,
        duration: Duration,
    ) -> PagewireResult<()> {
        check_fractions(&[start, end, anchor])?;
        let driver = session.driver_mut()?;
        let size = driver.window_size()?;
        let y = scale(size.height, anchor);
        let from = Point::new(scale(size.width, start), y);
        let to = Point::new(scale(size.width, end), y);
        debug!(?from, ?to, "horizontal swipe");
        driver.swipe(from, to, duration)
    }

    /// Decode a hex-encoded credential
    pub fn decrypt_string(&self, encoded: &str) -> PagewireResult<String> {
        codec::decrypt_string(encoded)
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn perform<D, T, F>(
        &self,
        session: &mut Session<D>,
        locator: &Locator,
        action: Action,
        label: &str,
        act: F,
    ) -> PagewireResult<T>
    where
        D: Driver,
        F: FnOnce(&mut D, &ElementHandle) -> PagewireResult<T>,
    {
        let driver = session.driver_mut()?;
        let mut evidence = None;

        let result = match await_visible(&*driver, locator, &self.waits.visibility) {
            Ok(element) => {
                if captures_after(action) {
                    let result = act(&mut *driver, &element);
                    evidence = self.capture(driver, &element, label);
                    result
                } else {
                    evidence = self.capture(driver, &element, label);
                    act(&mut *driver, &element)
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            if !matches!(e, PagewireError::SessionUnavailable { .. }) {
                evidence = self.capture_failure(driver, label).or(evidence);
            }
        }

        let record = InteractionRecord::new(label, action, locator.clone())
            .with_evidence(evidence)
            .with_outcome(Outcome::of(&result));
        if let Err(e) = self.reporter.record(&record) {
            warn!(step = label, error = %e, "reporter rejected step record");
        }
        result
    }

    fn capture_failure<D: Driver>(&self, driver: &mut D, label: &str) -> Option<PathBuf> {
        match self.evidence.capture_page(driver, label) {
            Ok(path) => path,
            Err(e) => {
                warn!(step = label, error = %e, "failure screenshot not taken");
                None
            }
        }
    }

    fn capture<D: Driver>(
        &self,
        driver: &mut D,
        element: &ElementHandle,
        label: &str,
    ) -> Option<PathBuf> {
        match self.evidence.capture(driver, element, label) {
            Ok(path) => path,
            Err(e) => {
                warn!(step = label, error = %e, "evidence capture failed");
                None
            }
        }
    }
}

fn check_fractions(values: &[f64]) -> PagewireResult<()> {
    match values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        Some(bad) => Err(PagewireError::driver(
            "swipe",
            format!("screen fraction {bad} is outside 0.0..=1.0"),
        )),
        None => Ok(()),
    }
}

/// Fraction of a screen dimension, truncated to whole pixels
fn scale(length: u32, fraction: f64) -> i64 {
    (f64::from(length) * fraction) as i64
}

/// Typing is captured afterwards so the screenshot shows the entered text
const fn captures_after(action: Action) -> bool {
    matches!(action, Action::SendKeys | Action::Clear)
}
