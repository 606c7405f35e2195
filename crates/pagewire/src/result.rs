//! Result and error types for Pagewire.

use thiserror::Error;

/// Result type for Pagewire operations
pub type PagewireResult<T> = Result<T, PagewireError>;

/// Errors that can occur in Pagewire
#[derive(Debug, Error)]
pub enum PagewireError {
    /// Locator string does not follow `<strategy>==<value>`
    #[error("Invalid locator syntax {raw:?}: {reason}")]
    InvalidLocatorSyntax {
        /// The raw locator string as given
        raw: String,
        /// Why it was rejected
        reason: String,
    },

    /// Immediate query returned zero matches
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Canonical form of the locator
        locator: String,
    },

    /// Readiness poll expired
    #[error("Timed out after {timeout_ms}ms waiting for {locator}")]
    TimeoutExceeded {
        /// What was being waited for (locator or page condition)
        locator: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// The driver session is not alive
    #[error("Session unavailable: {message}")]
    SessionUnavailable {
        /// Error message
        message: String,
    },

    /// Highlight/screenshot/persist step failed; absorbed by the facade
    #[error("Evidence capture failed: {message}")]
    EvidenceCaptureFailed {
        /// Error message
        message: String,
    },

    /// Window handle no longer exists
    #[error("No such window: {handle}")]
    NoSuchWindow {
        /// Window handle
        handle: String,
    },

    /// Script execution failed inside the page
    #[error("Script error: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Driver rejected a command
    #[error("Driver command {command} failed: {message}")]
    Driver {
        /// Command name
        command: String,
        /// Error message
        message: String,
    },

    /// Hex credential could not be decoded
    #[error("Decode failed: {message}")]
    Decode {
        /// Error message
        message: String,
    },

    /// Test data lookup or load failed
    #[error("Test data error: {message}")]
    TestData {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewireError {
    /// Create an invalid locator error
    #[must_use]
    pub fn invalid_locator(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocatorSyntax {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create a session unavailable error
    #[must_use]
    pub fn session_unavailable(message: impl Into<String>) -> Self {
        Self::SessionUnavailable {
            message: message.into(),
        }
    }

    /// Create an evidence capture error
    #[must_use]
    pub fn evidence(message: impl Into<String>) -> Self {
        Self::EvidenceCaptureFailed {
            message: message.into(),
        }
    }

    /// Create a driver command error
    #[must_use]
    pub fn driver(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a test data error
    #[must_use]
    pub fn test_data(message: impl Into<String>) -> Self {
        Self::TestData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error means the session itself is gone.
    ///
    /// Pollers stop early on these instead of waiting out the timeout.
    #[must_use]
    pub const fn is_session_loss(&self) -> bool {
        matches!(self, Self::SessionUnavailable { .. })
    }
}
