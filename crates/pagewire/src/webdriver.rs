//! W3C WebDriver / Appium client.
//!
//! A blocking HTTP implementation of [`Driver`] against any remote end that
//! speaks the W3C WebDriver protocol: chromedriver, geckodriver, Selenium Grid
//! or an Appium server.
//!
//! ```text
//! WebDriverSession ──HTTP/JSON──► {server_url}/session/{id}/...
//!        │
//!        ├── Dialect::W3c     id / name / class ──► css selector
//!        └── Dialect::Appium  id / name / class ──► native strategies
//! ```
//!
//! Remote errors are mapped by their W3C error code. `invalid session id` and
//! transport failures become [`PagewireError::SessionUnavailable`], so pollers
//! stop immediately when the remote end goes away.

use crate::config::{Dialect, SessionConfig};
use crate::driver::{Driver, ElementHandle, Point, Screenshot, WindowSize};
use crate::locator::Strategy;
use crate::result::{PagewireError, PagewireResult};
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// W3C element reference key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// HTTP timeout for a single command
const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Failure of one wire command, before it is mapped to a [`PagewireError`]
#[derive(Debug)]
enum WireFailure {
    Transport(String),
    Remote { code: String, message: String },
}

impl WireFailure {
    fn is_code(&self, expected: &str) -> bool {
        matches!(self, Self::Remote { code, .. } if code == expected)
    }

    fn into_error(self, command: &str) -> PagewireError {
        match self {
            Self::Transport(message) => PagewireError::session_unavailable(message),
            Self::Remote { code, message } => map_remote_error(command, &code, message),
        }
    }
}

/// Map a W3C error code to a [`PagewireError`]
fn map_remote_error(command: &str, code: &str, message: String) -> PagewireError {
    match code {
        "invalid session id" | "session not created" => {
            PagewireError::session_unavailable(format!("{code}: {message}"))
        }
        "no such window" => PagewireError::NoSuchWindow { handle: message },
        "javascript error" | "script timeout" => PagewireError::Script { message },
        _ => PagewireError::driver(command, format!("{code}: {message}")),
    }
}

/// Wire strategy and selector for a locator under a dialect
fn wire_locator(dialect: Dialect, strategy: Strategy, value: &str) -> (&'static str, String) {
    match (dialect, strategy) {
        (_, Strategy::XPath) => ("xpath", value.to_string()),
        (_, Strategy::LinkText) => ("link text", value.to_string()),
        (_, Strategy::Css) => ("css selector", value.to_string()),
        (Dialect::Appium, Strategy::Id) => ("id", value.to_string()),
        (Dialect::Appium, Strategy::Name) => ("name", value.to_string()),
        (Dialect::Appium, Strategy::Class) => ("class name", value.to_string()),
        (Dialect::W3c, Strategy::Id) => ("css selector", format!("[id={}]", css_string(value))),
        (Dialect::W3c, Strategy::Name) => {
            ("css selector", format!("[name={}]", css_string(value)))
        }
        (Dialect::W3c, Strategy::Class) => {
            ("css selector", format!("[class~={}]", css_string(value)))
        }
    }
}

/// Quote a value as a CSS string literal
fn css_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\a "),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn element_ref(element: &ElementHandle) -> Value {
    json!({ ELEMENT_KEY: element.id() })
}

fn element_from(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementHandle::new)
}

fn pointer_actions(element: &ElementHandle, clicks: usize) -> Value {
    let mut steps = vec![json!({
        "type": "pointerMove",
        "duration": 0,
        "origin": element_ref(element),
        "x": 0,
        "y": 0,
    })];
    for _ in 0..clicks {
        steps.push(json!({ "type": "pointerDown", "button": 0 }));
        steps.push(json!({ "type": "pointerUp", "button": 0 }));
    }
    json!({
        "actions": [{
            "type": "pointer",
            "id": "pagewire-mouse",
            "parameters": { "pointerType": "mouse" },
            "actions": steps,
        }]
    })
}

fn touch_swipe_actions(from: Point, to: Point, duration: Duration) -> Value {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    json!({
        "actions": [{
            "type": "pointer",
            "id": "pagewire-finger",
            "parameters": { "pointerType": "touch" },
            "actions": [
                {
                    "type": "pointerMove",
                    "duration": 0,
                    "origin": "viewport",
                    "x": from.x,
                    "y": from.y,
                },
                { "type": "pointerDown", "button": 0 },
                { "type": "pause", "duration": millis },
                {
                    "type": "pointerMove",
                    "duration": millis,
                    "origin": "viewport",
                    "x": to.x,
                    "y": to.y,
                },
                { "type": "pointerUp", "button": 0 },
            ],
        }]
    })
}

fn window_size_from(value: &Value) -> Option<WindowSize> {
    let dimension = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_f64)
            .map(|v| v.max(0.0) as u32)
    };
    Some(WindowSize::new(dimension("width")?, dimension("height")?))
}

/// A remote WebDriver session
#[derive(Debug)]
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
    dialect: Dialect,
    closed: bool,
}

impl WebDriverSession {
    /// Start a new remote session
    ///
    /// # Errors
    ///
    /// [`PagewireError::SessionUnavailable`] when the server cannot be reached
    /// or refuses the capabilities.
    pub fn connect(config: &SessionConfig) -> PagewireResult<Self> {
        let client = Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(|e| PagewireError::session_unavailable(format!("http client: {e}")))?;
        let base_url = config.server_url.trim_end_matches('/').to_string();
        let capabilities = Value::Object(config.effective_capabilities());
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });

        let value = send(&client, Method::POST, &format!("{base_url}/session"), Some(&body))
            .map_err(|e| e.into_error("new session"))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PagewireError::session_unavailable("new session response has no sessionId")
            })?
            .to_string();

        info!(
            server = %base_url,
            session = %session_id,
            platform = ?config.platform,
            "remote session started"
        );
        Ok(Self {
            client,
            base_url,
            session_id,
            dialect: config.effective_dialect(),
            closed: false,
        })
    }

    /// Remote session id
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Locator dialect in use
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn raw(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, WireFailure> {
        if self.closed {
            return Err(WireFailure::Transport(format!(
                "session {} has quit",
                self.session_id
            )));
        }
        let url = format!("{}/session/{}{path}", self.base_url, self.session_id);
        send(&self.client, method, &url, body)
    }

    fn get(&self, command: &str, path: &str) -> PagewireResult<Value> {
        self.raw(Method::GET, path, None)
            .map_err(|e| e.into_error(command))
    }

    fn post(&self, command: &str, path: &str, body: &Value) -> PagewireResult<Value> {
        self.raw(Method::POST, path, Some(body))
            .map_err(|e| e.into_error(command))
    }

    fn find_within(
        &self,
        path: &str,
        using: &str,
        selector: &str,
    ) -> PagewireResult<Vec<ElementHandle>> {
        let value = self.post(
            "find elements",
            path,
            &json!({ "using": using, "value": selector }),
        )?;
        Ok(value
            .as_array()
            .map(|items| items.iter().filter_map(element_from).collect())
            .unwrap_or_default())
    }
}

fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> Result<Value, WireFailure> {
    debug!(%method, url, "webdriver command");
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request
        .send()
        .map_err(|e| WireFailure::Transport(e.to_string()))?;
    let status = response.status();
    let payload: Value = response
        .json()
        .map_err(|e| WireFailure::Transport(format!("malformed response: {e}")))?;
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(WireFailure::Remote { code, message })
}

impl Driver for WebDriverSession {
    fn find_elements(&self, strategy: Strategy, value: &str) -> PagewireResult<Vec<ElementHandle>> {
        let (using, selector) = wire_locator(self.dialect, strategy, value);
        self.find_within("/elements", using, &selector)
    }

    fn is_displayed(&self, element: &ElementHandle) -> PagewireResult<bool> {
        let value = self.get("is displayed", &format!("/element/{}/displayed", element.id()))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn click(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.post("click", &format!("/element/{}/click", element.id()), &json!({}))?;
        Ok(())
    }

    fn double_click(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.post("double click", "/actions", &pointer_actions(element, 2))?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> PagewireResult<()> {
        let _ = self.post(
            "send keys",
            &format!("/element/{}/value", element.id()),
            &json!({ "text": text }),
        )?;
        Ok(())
    }

    fn clear(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.post("clear", &format!("/element/{}/clear", element.id()), &json!({}))?;
        Ok(())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> PagewireResult<Option<String>> {
        let value = self.get(
            "get attribute",
            &format!("/element/{}/attribute/{name}", element.id()),
        )?;
        Ok(value.as_str().map(str::to_string))
    }

    fn text(&self, element: &ElementHandle) -> PagewireResult<String> {
        let value = self.get("get text", &format!("/element/{}/text", element.id()))?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn select_by_value(&mut self, element: &ElementHandle, value: &str) -> PagewireResult<()> {
        let selector = format!("option[value={}]", css_string(value));
        let options = self.find_within(
            &format!("/element/{}/elements", element.id()),
            "css selector",
            &selector,
        )?;
        let Some(option) = options.first() else {
            return Err(PagewireError::driver(
                "select by value",
                format!("no option with value {value:?}"),
            ));
        };
        self.click(option)
    }

    fn hover(&mut self, element: &ElementHandle) -> PagewireResult<()> {
        let _ = self.post("hover", "/actions", &pointer_actions(element, 0))?;
        Ok(())
    }

    fn execute_script(
        &mut self,
        script: &str,
        args: &[&ElementHandle],
    ) -> PagewireResult<Value> {
        let args: Vec<Value> = args.iter().map(|e| element_ref(e)).collect();
        self.post(
            "execute script",
            "/execute/sync",
            &json!({ "script": script, "args": args }),
        )
    }

    fn window_handle(&self) -> PagewireResult<String> {
        let value = self.get("get window handle", "/window")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn window_handles(&self) -> PagewireResult<Vec<String>> {
        let value = self.get("get window handles", "/window/handles")?;
        Ok(value
            .as_array()
            .map(|handles| {
                handles
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn switch_to_window(&mut self, handle: &str) -> PagewireResult<()> {
        match self.raw(Method::POST, "/window", Some(&json!({ "handle": handle }))) {
            Ok(_) => Ok(()),
            Err(e) if e.is_code("no such window") => Err(PagewireError::NoSuchWindow {
                handle: handle.to_string(),
            }),
            Err(e) => Err(e.into_error("switch to window")),
        }
    }

    fn alert_text(&self) -> PagewireResult<Option<String>> {
        match self.raw(Method::GET, "/alert/text", None) {
            Ok(value) => Ok(Some(value.as_str().unwrap_or_default().to_string())),
            Err(e) if e.is_code("no such alert") => Ok(None),
            Err(e) => Err(e.into_error("get alert text")),
        }
    }

    fn accept_alert(&mut self) -> PagewireResult<()> {
        let _ = self.post("accept alert", "/alert/accept", &json!({}))?;
        Ok(())
    }

    fn screenshot(&self) -> PagewireResult<Screenshot> {
        let value = self.get("take screenshot", "/screenshot")?;
        let encoded = value
            .as_str()
            .ok_or_else(|| PagewireError::driver("take screenshot", "response is not a string"))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| PagewireError::driver("take screenshot", e.to_string()))?;
        Ok(Screenshot::new(data))
    }

    fn window_size(&self) -> PagewireResult<WindowSize> {
        let value = self.get("get window rect", "/window/rect")?;
        window_size_from(&value)
            .ok_or_else(|| PagewireError::driver("get window rect", "response has no size"))
    }

    fn swipe(&mut self, from: Point, to: Point, duration: Duration) -> PagewireResult<()> {
        let _ = self.post("swipe", "/actions", &touch_swipe_actions(from, to, duration))?;
        debug!(from_x = from.x, from_y = from.y, to_x = to.x, to_y = to.y, "swiped");
        Ok(())
    }

    fn navigate(&mut self, url: &str) -> PagewireResult<()> {
        let _ = self.post("navigate to", "/url", &json!({ "url": url }))?;
        Ok(())
    }

    fn title(&self) -> PagewireResult<String> {
        let value = self.get("get title", "/title")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn quit(&mut self) -> PagewireResult<()> {
        let result = self.raw(Method::DELETE, "", None);
        self.closed = true;
        result.map_err(|e| e.into_error("delete session"))?;
        info!(session = %self.session_id, "remote session closed");
        Ok(())
    }
}
