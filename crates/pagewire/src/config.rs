//! Harness configuration.
//!
//! Everything is optional; a missing file or an empty document yields the
//! built-in defaults. Unknown keys are rejected so typos surface early.
//!
//! ```yaml
//! waits:
//!   visibility: { timeout_ms: 10000, poll_interval_ms: 500 }
//!   page_load:  { timeout_ms: 30000, poll_interval_ms: 5000 }
//! evidence:
//!   directory: reports
//!   highlight_style: 3px solid orange
//! session:
//!   server_url: http://127.0.0.1:4723/wd/hub
//!   platform: android
//!   capabilities:
//!     deviceName: Galaxy S8
//! test_data: ExternalFiles/testData.yaml
//! ```

use crate::evidence::EvidenceConfig;
use crate::result::{PagewireError, PagewireResult};
use crate::wait::WaitConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PAGEWIRE_CONFIG";

/// Default remote end (local Appium server)
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4723/wd/hub";

/// Target platform of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android device or emulator through Appium
    Android,
    /// iOS device or simulator through Appium
    #[serde(alias = "iOS")]
    Ios,
    /// Desktop browser through a WebDriver server
    #[default]
    Browser,
}

impl Platform {
    /// Locator dialect normally spoken for this platform
    #[must_use]
    pub const fn default_dialect(self) -> Dialect {
        match self {
            Self::Android | Self::Ios => Dialect::Appium,
            Self::Browser => Dialect::W3c,
        }
    }
}

/// How locator strategies are sent over the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain W3C: `id`, `name` and `class` become CSS selectors
    W3c,
    /// Appium: `id`, `name` and `class name` are native strategies
    Appium,
}

/// Remote session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// WebDriver / Appium endpoint
    pub server_url: String,
    /// Target platform
    pub platform: Platform,
    /// Wire dialect; derived from the platform when absent
    pub dialect: Option<Dialect>,
    /// Extra capabilities, overriding the platform defaults
    pub capabilities: Map<String, Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            platform: Platform::default(),
            dialect: None,
            capabilities: Map::new(),
        }
    }
}

impl SessionConfig {
    /// Dialect in effect
    #[must_use]
    pub fn effective_dialect(&self) -> Dialect {
        self.dialect
            .unwrap_or_else(|| self.platform.default_dialect())
    }

    /// Platform defaults merged with the configured capabilities
    #[must_use]
    pub fn effective_capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        match self.platform {
            Platform::Android | Platform::Ios => {
                let name = if self.platform == Platform::Android {
                    "Android"
                } else {
                    "iOS"
                };
                let _ = caps.insert("platformName".into(), Value::from(name));
                let _ = caps.insert("appium:noReset".into(), Value::from(true));
                let _ = caps.insert("appium:newCommandTimeout".into(), Value::from(1200));
            }
            Platform::Browser => {
                let _ = caps.insert("browserName".into(), Value::from("chrome"));
            }
        }
        for (key, value) in &self.capabilities {
            let _ = caps.insert(key.clone(), value.clone());
        }
        caps
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Poll timeouts and intervals
    pub waits: WaitConfig,
    /// Step evidence
    pub evidence: EvidenceConfig,
    /// Remote session
    pub session: SessionConfig,
    /// Test-data file
    pub test_data: Option<PathBuf>,
}

impl HarnessConfig {
    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// [`PagewireError::Config`] on malformed YAML, unknown keys, or a zero
    /// polling interval.
    pub fn from_yaml_str(yaml: &str) -> PagewireResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml_ng::from_str(yaml).map_err(|e| PagewireError::config(e.to_string()))?;
        config.waits.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// [`PagewireError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PagewireResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PagewireError::config(format!("{}: {e}", path.display())))?;
        let config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(&content)
                .map_err(|e| PagewireError::config(format!("{}: {e}", path.display())))?
        };
        config.waits.validate().map_err(|e| match e {
            PagewireError::Config { message } => {
                PagewireError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load from the file named by `PAGEWIRE_CONFIG`, or defaults when unset
    ///
    /// # Errors
    ///
    /// [`PagewireError::Config`] if the named file cannot be loaded.
    pub fn from_env() -> PagewireResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> PagewireResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}
