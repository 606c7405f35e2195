//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A page file contains locators that do not parse
    #[error("Lint failed: {count} invalid locator(s) in {path}")]
    Lint {
        /// Page file
        path: String,
        /// Number of bad entries
        count: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pagewire library error
    #[error("{0}")]
    Pagewire(#[from] pagewire::PagewireError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a lint failure
    #[must_use]
    pub fn lint(path: impl Into<String>, count: usize) -> Self {
        Self::Lint {
            path: path.into(),
            count,
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_lint_error() {
        let err = CliError::lint("pages/login.yaml", 2);
        assert_eq!(
            err.to_string(),
            "Lint failed: 2 invalid locator(s) in pages/login.yaml"
        );
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad arg");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_library_error_passes_through() {
        let err: CliError = pagewire::PagewireError::test_data("missing key \"x\"").into();
        assert!(err.to_string().contains("missing key"));
    }
}
