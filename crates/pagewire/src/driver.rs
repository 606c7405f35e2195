//! Driver - Abstract Session Collaborator
//!
//! Everything Pagewire does against a live browser or device goes through the
//! [`Driver`] trait. The trait is deliberately narrow: one find primitive keyed
//! by [`Strategy`], per-element actions, script execution, window and alert
//! control, and screenshots.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Driver (trait)                                                    │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐  ┌──────────────────────┐               │
//! │  │  WebDriverSession    │  │  MockDriver          │               │
//! │  │  (feature webdriver) │  │  (unit tests)        │               │
//! │  │  W3C / Appium HTTP   │  │  scripted elements   │               │
//! │  └──────────────────────┘  └──────────────────────┘               │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are synchronous. Queries take `&self`; anything that changes page
//! or session state takes `&mut self`.

use crate::locator::{Locator, Strategy};
use crate::result::{PagewireError, PagewireResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime};

/// PNG file signature
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Reference to a live element, valid only inside the session that produced it.
///
/// Handles go stale when the page navigates; nothing re-resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    /// Wrap a driver-assigned element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Driver-assigned element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check the payload starts with the PNG signature
    #[must_use]
    pub fn is_png(&self) -> bool {
        self.data.starts_with(&PNG_MAGIC)
    }
}

/// A point in window coordinates (CSS pixels on the web, points on devices)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge
    pub x: i64,
    /// Vertical offset from the top edge
    pub y: i64,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Size of the current window or device screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl WindowSize {
    /// Create a size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A live browser or device session.
///
/// # Implementations
///
/// - `WebDriverSession` - W3C WebDriver / Appium over HTTP (feature `webdriver`)
/// - [`MockDriver`] - scripted, in-process, for unit tests
pub trait Driver {
    /// All elements matching `value` under `strategy`, in driver order
    fn find_elements(&self, strategy: Strategy, value: &str) -> PagewireResult<Vec<ElementHandle>>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: &ElementHandle) -> PagewireResult<bool>;

    /// Click element
    fn click(&mut self, element: &ElementHandle) -> PagewireResult<()>;

    /// Double-click element
    fn double_click(&mut self, element: &ElementHandle) -> PagewireResult<()>;

    /// Type text into element
    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> PagewireResult<()>;

    /// Clear an editable element
    fn clear(&mut self, element: &ElementHandle) -> PagewireResult<()>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, element: &ElementHandle, name: &str) -> PagewireResult<Option<String>>;

    /// Rendered text of the element
    fn text(&self, element: &ElementHandle) -> PagewireResult<String>;

    /// Pick the `<option>` with the given value inside a `<select>`
    fn select_by_value(&mut self, element: &ElementHandle, value: &str) -> PagewireResult<()>;

    /// Move the pointer over the element
    fn hover(&mut self, element: &ElementHandle) -> PagewireResult<()>;

    /// Execute a script; elements in `args` are exposed as `arguments[i]`
    fn execute_script(
        &mut self,
        script: &str,
        args: &[&ElementHandle],
    ) -> PagewireResult<serde_json::Value>;

    /// Handle of the focused window or context
    fn window_handle(&self) -> PagewireResult<String>;

    /// All window or context handles, in driver order
    fn window_handles(&self) -> PagewireResult<Vec<String>>;

    /// Move focus to a window
    fn switch_to_window(&mut self, handle: &str) -> PagewireResult<()>;

    /// Text of the open alert, `None` when no alert is showing
    fn alert_text(&self) -> PagewireResult<Option<String>>;

    /// Accept the open alert
    fn accept_alert(&mut self) -> PagewireResult<()>;

    /// Take screenshot
    fn screenshot(&self) -> PagewireResult<Screenshot>;

    /// Size of the current window or screen
    fn window_size(&self) -> PagewireResult<WindowSize>;

    /// Touch press at `from`, move to `to` over `duration`, release
    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> PagewireResult<()>;

    /// Navigate to URL
    fn navigate(&mut self, url: &str) -> PagewireResult<()>;

    /// Title of the current page
    fn title(&self) -> PagewireResult<String>;

    /// End the session
    fn quit(&mut self) -> PagewireResult<()>;
}

// ============================================================================
// MockDriver
// ============================================================================

/// A scripted element inside a [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Handle returned by queries
    pub handle: ElementHandle,
    /// Locator the element answers to
    pub locator: Locator,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Rendered text
    pub text: String,
    /// `<option>` values when the element is a select
    pub options: Vec<String>,
    /// Element shows up in queries this long after the driver was created
    pub present_after: Duration,
    /// Element becomes visible this long after creation; `None` means never
    pub visible_after: Option<Duration>,
}

impl MockElement {
    /// Visible, immediately present element
    #[must_use]
    pub fn new(id: impl Into<String>, locator: Locator) -> Self {
        Self {
            handle: ElementHandle::new(id),
            locator,
            attributes: HashMap::new(),
            text: String::new(),
            options: Vec::new(),
            present_after: Duration::ZERO,
            visible_after: Some(Duration::ZERO),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Make the element a select with these option values
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Delay presence in the tree
    #[must_use]
    pub const fn present_after(mut self, delay: Duration) -> Self {
        self.present_after = delay;
        self
    }

    /// Delay visibility
    #[must_use]
    pub const fn visible_after(mut self, delay: Duration) -> Self {
        self.visible_after = Some(delay);
        self
    }

    /// Present but never visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible_after = None;
        self
    }
}

/// Mock driver for unit testing
#[derive(Debug)]
pub struct MockDriver {
    started: Instant,
    /// Scripted elements
    pub elements: Vec<MockElement>,
    /// Window handles in enumeration order
    pub windows: Vec<String>,
    /// Focused window
    pub current_window: String,
    /// Open alert text
    pub alert: Option<String>,
    /// `document.readyState` reports `complete` after this delay
    pub ready_after: Duration,
    /// Screenshot bytes returned by [`Driver::screenshot`]
    pub screenshot_data: Vec<u8>,
    /// Screenshots fail with a driver error
    pub fail_screenshots: bool,
    /// Scripts fail with a script error
    pub fail_scripts: bool,
    /// `quit` fails (the session still ends)
    pub fail_quit: bool,
    /// Current URL
    pub current_url: String,
    /// Page title
    pub page_title: String,
    /// Reported window size
    pub window_size: WindowSize,
    /// Swipes performed, in order
    pub swipes: Vec<(Point, Point, Duration)>,
    /// Text typed into each element, keyed by element id
    pub typed: HashMap<String, String>,
    /// Selected option value, keyed by element id
    pub selected: HashMap<String, String>,
    /// Call history for verification
    pub call_history: Vec<String>,
    closed: bool,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            elements: Vec::new(),
            windows: vec!["main".to_string()],
            current_window: "main".to_string(),
            alert: None,
            ready_after: Duration::ZERO,
            screenshot_data: [PNG_MAGIC.as_slice(), b"mock".as_slice()].concat(),
            fail_screenshots: false,
            fail_scripts: false,
            fail_quit: false,
            current_url: String::new(),
            page_title: String::new(),
            window_size: WindowSize::new(1080, 1920),
            swipes: Vec::new(),
            typed: HashMap::new(),
            selected: HashMap::new(),
            call_history: Vec::new(),
            closed: false,
        }
    }
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock element
    pub fn add_element(&mut self, element: MockElement) {
        self.elements.push(element);
    }

    /// Builder form of [`MockDriver::add_element`]
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.add_element(element);
        self
    }

    /// Open an extra window after the current ones
    #[must_use]
    pub fn with_window(mut self, handle: impl Into<String>) -> Self {
        self.windows.push(handle.into());
        self
    }

    /// Show an alert
    #[must_use]
    pub fn with_alert(mut self, text: impl Into<String>) -> Self {
        self.alert = Some(text.into());
        self
    }

    /// Delay document readiness
    #[must_use]
    pub const fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_after = delay;
        self
    }

    /// Report a different window size
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = WindowSize::new(width, height);
        self
    }

    /// Make every screenshot fail
    #[must_use]
    pub const fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    /// Make every script fail
    #[must_use]
    pub const fn failing_scripts(mut self) -> Self {
        self.fail_scripts = true;
        self
    }

    /// Make `quit` report an error
    #[must_use]
    pub const fn failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// How many recorded calls start with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    /// Whether `quit` has run
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> PagewireResult<()> {
        if self.closed {
            Err(PagewireError::session_unavailable("mock session has quit"))
        } else {
            Ok(())
        }
    }

    fn element(&self, handle: &ElementHandle) -> PagewireResult<&MockElement> {
        self.ensure_open()?;
        self.elements
            .iter()
            .find(|e| &e.handle == handle)
            .ok_or_else(|| {
                PagewireError::driver("element", format!("stale element {}", handle.id()))
            })
    }

    fn record(&mut self, call: String) {
        self.call_history.push(call);
    }
}

impl Driver for MockDriver {
    fn find_elements(&self, strategy: Strategy, value: &str) -> PagewireResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        let elapsed = self.started.elapsed();
        Ok(self
            .elements
            .iter()
            .filter(|e| {
                e.locator.strategy() == strategy
                    && e.locator.value() == value
                    && elapsed >= e.present_after
            })
            .map(|e| e.handle.clone())
            .collect())
    }

    fn is_displayed(&self, element: &ElementHandle) -> PagewireResult<bool> {
        let elapsed = self.started.elapsed();
        let element = self.element(element)?;
        Ok(element.visible_after.is_some_and(|after| elapsed >= after))
    }

    fn click(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.element(element)?;
        self.record(format!("click:{}", element.id()));
        Ok(())
    }

    fn double_click(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.element(element)?;
        self.record(format!("double_click:{}", element.id()));
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> PagewireResult<()> {
        let _ = self.element(element)?;
        self.typed
            .entry(element.id().to_string())
            .or_default()
            .push_str(text);
        self.record(format!("send_keys:{}", element.id()));
        Ok(())
    }

    fn clear(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.element(element)?;
        let _ = self.typed.remove(element.id());
        self.record(format!("clear:{}", element.id()));
        Ok(())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> PagewireResult<Option<String>> {
        Ok(self.element(element)?.attributes.get(name).cloned())
    }

    fn text(&self, element: &ElementHandle) -> PagewireResult<String> {
        Ok(self.element(element)?.text.clone())
    }

    fn select_by_value(&mut self, element: &ElementHandle, value: &str) -> PagewireResult<()> {
        let known = self.element(element)?.options.iter().any(|o| o == value);
        if !known {
            return Err(PagewireError::driver(
                "select_by_value",
                format!("no option with value {value:?}"),
            ));
        }
        let _ = self
            .selected
            .insert(element.id().to_string(), value.to_string());
        self.record(format!("select_by_value:{}", element.id()));
        Ok(())
    }

    fn hover(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.element(element)?;
        self.record(format!("hover:{}", element.id()));
        Ok(())
    }

    fn execute_script(
        &mut self,
        script: &str,
        args: &[&ElementHandle],
    ) -> PagewireResult<serde_json::Value> {
        self.ensure_open()?;
        self.record(format!("execute_script:{script}"));
        if self.fail_scripts {
            return Err(PagewireError::Script {
                message: "mock script failure".to_string(),
            });
        }
        for arg in args {
            let _ = self.element(arg)?;
        }
        if script.contains("document.readyState") {
            let state = if self.started.elapsed() >= self.ready_after {
                "complete"
            } else {
                "loading"
            };
            return Ok(serde_json::Value::String(state.to_string()));
        }
        Ok(serde_json::Value::Null)
    }

    fn window_handle(&self) -> PagewireResult<String> {
        self.ensure_open()?;
        Ok(self.current_window.clone())
    }

    fn window_handles(&self) -> PagewireResult<Vec<String>> {
        self.ensure_open()?;
        Ok(self.windows.clone())
    }

    fn switch_to_window(&mut self, handle: &str) -> PagewireResult<()> {
        self.ensure_open()?;
        if !self.windows.iter().any(|w| w == handle) {
            return Err(PagewireError::NoSuchWindow {
                handle: handle.to_string(),
            });
        }
        self.current_window = handle.to_string();
        self.record(format!("switch_to_window:{handle}"));
        Ok(())
    }

    fn alert_text(&self) -> PagewireResult<Option<String>> {
        self.ensure_open()?;
        Ok(self.alert.clone())
    }

    fn accept_alert(&mut self) -> PagewireResult<()> {
        self.ensure_open()?;
        if self.alert.take().is_none() {
            return Err(PagewireError::driver("accept_alert", "no such alert"));
        }
        self.record("accept_alert".to_string());
        Ok(())
    }

    fn screenshot(&self) -> PagewireResult<Screenshot> {
        self.ensure_open()?;
        if self.fail_screenshots {
            return Err(PagewireError::driver("screenshot", "mock screenshot failure"));
        }
        Ok(Screenshot::new(self.screenshot_data.clone()))
    }

    fn window_size(&self) -> PagewireResult<WindowSize> {
        self.ensure_open()?;
        Ok(self.window_size)
    }

    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> PagewireResult<()> {
        self.ensure_open()?;
        self.record(format!("swipe:{},{}->{},{}", from.x, from.y, to.x, to.y));
        self.swipes.push((from, to, duration));
        Ok(())
    }

    fn navigate(&mut self, url: &str) -> PagewireResult<()> {
        self.ensure_open()?;
        self.record(format!("navigate:{url}"));
        self.current_url = url.to_string();
        Ok(())
    }

    fn title(&self) -> PagewireResult<String> {
        self.ensure_open()?;
        Ok(self.page_title.clone())
    }

    fn quit(&mut self) -> PagewireResult<()> {
        self.ensure_open()?;
        self.record("quit".to_string());
        self.closed = true;
        if self.fail_quit {
            return Err(PagewireError::driver("quit", "mock quit failure"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let elem = ElementHandle::new("btn-1");
            assert_eq!(elem.id(), "btn-1");
        }
    }

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_screenshot_is_png() {
            let mut data = PNG_MAGIC.to_vec();
            data.extend_from_slice(&[0, 1]);
            let png = Screenshot::new(data);
            assert!(png.is_png());
            assert_eq!(png.size_bytes(), 10);

            let jpeg = Screenshot::new(vec![0xFF, 0xD8, 0xFF]);
            assert!(!jpeg.is_png());
        }
    }

    mod mock_driver_tests {
        use super::*;

        fn login_button() -> MockElement {
            MockElement::new("e1", Locator::id("loginButton")).with_text("Log in")
        }

        #[test]
        fn test_mock_driver_creation() {
            let driver = MockDriver::new();
            assert!(driver.elements.is_empty());
            assert!(driver.history().is_empty());
            assert_eq!(driver.window_handle().unwrap(), "main");
        }

        #[test]
        fn test_find_matches_strategy_and_value() {
            let driver = MockDriver::new().with_element(login_button());
            assert_eq!(
                driver.find_elements(Strategy::Id, "loginButton").unwrap(),
                vec![ElementHandle::new("e1")]
            );
            assert!(driver
                .find_elements(Strategy::Name, "loginButton")
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_delayed_presence() {
            let driver = MockDriver::new()
                .with_element(login_button().present_after(Duration::from_secs(60)));
            assert!(driver
                .find_elements(Strategy::Id, "loginButton")
                .unwrap()
                .is_empty());
        }

        #[test]
        fn test_hidden_element_is_not_displayed() {
            let driver = MockDriver::new().with_element(login_button().hidden());
            assert!(!driver.is_displayed(&ElementHandle::new("e1")).unwrap());
        }

        #[test]
        fn test_actions_are_recorded() {
            let mut driver = MockDriver::new().with_element(login_button());
            let handle = ElementHandle::new("e1");
            driver.click(&handle).unwrap();
            driver.send_keys(&handle, "abc").unwrap();
            driver.send_keys(&handle, "def").unwrap();

            assert!(driver.was_called("click:e1"));
            assert_eq!(driver.call_count("send_keys"), 2);
            assert_eq!(driver.typed.get("e1").map(String::as_str), Some("abcdef"));
        }

        #[test]
        fn test_select_unknown_option_fails() {
            let mut driver = MockDriver::new().with_element(
                MockElement::new("s1", Locator::name("country")).with_options(["in", "us"]),
            );
            let handle = ElementHandle::new("s1");
            assert!(driver.select_by_value(&handle, "fr").is_err());
            driver.select_by_value(&handle, "us").unwrap();
            assert_eq!(driver.selected.get("s1").map(String::as_str), Some("us"));
        }

        #[test]
        fn test_ready_state_script() {
            let mut driver = MockDriver::new();
            let state = driver
                .execute_script("return document.readyState;", &[])
                .unwrap();
            assert_eq!(state, serde_json::json!("complete"));

            let mut slow = MockDriver::new().ready_after(Duration::from_secs(60));
            let state = slow.execute_script("return document.readyState;", &[]).unwrap();
            assert_eq!(state, serde_json::json!("loading"));
        }

        #[test]
        fn test_alert_accept() {
            let mut driver = MockDriver::new().with_alert("Saved");
            assert_eq!(driver.alert_text().unwrap().as_deref(), Some("Saved"));
            driver.accept_alert().unwrap();
            assert!(driver.alert_text().unwrap().is_none());
            assert!(driver.accept_alert().is_err());
        }

        #[test]
        fn test_quit_closes_session() {
            let mut driver = MockDriver::new();
            driver.quit().unwrap();
            assert!(driver.is_closed());
            assert!(matches!(
                driver.window_handles(),
                Err(PagewireError::SessionUnavailable { .. })
            ));
        }

        #[test]
        fn test_switch_to_unknown_window() {
            let mut driver = MockDriver::new();
            assert!(matches!(
                driver.switch_to_window("popup"),
                Err(PagewireError::NoSuchWindow { .. })
            ));
        }

        #[test]
        fn test_window_size_and_swipe_recorded() {
            let mut driver = MockDriver::new().with_window_size(720, 1280);
            assert_eq!(driver.window_size().unwrap(), WindowSize::new(720, 1280));

            driver
                .swipe(Point::new(360, 1000), Point::new(360, 200), Duration::from_millis(300))
                .unwrap();
            assert!(driver.was_called("swipe:360,1000->360,200"));
            assert_eq!(driver.swipes[0].2, Duration::from_millis(300));
        }
    }
}
