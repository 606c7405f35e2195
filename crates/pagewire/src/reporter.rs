//! Reporter - Step Records for the Reporting Layer
//!
//! Every element interaction produces one [`InteractionRecord`]. What happens
//! to it is up to the [`Reporter`]:
//!
//! ```text
//! ┌──────────────┐   InteractionRecord   ┌──────────────────────────────┐
//! │ Interactions │ ────────────────────► │ Reporter (trait)              │
//! └──────────────┘                       │  TracingReporter  → log line  │
//!                                        │  MemoryReporter   → Vec       │
//!                                        │  JsonLinesReporter → .jsonl   │
//!                                        └──────────────────────────────┘
//! ```
//!
//! Reporters take `&self` so one reporter can serve every worker thread.

use crate::locator::Locator;
use crate::result::{PagewireError, PagewireResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Element interaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Single click
    Click,
    /// Double click
    DoubleClick,
    /// Typing text
    SendKeys,
    /// Clearing an input
    Clear,
    /// Reading an attribute
    GetAttribute,
    /// Reading rendered text
    Text,
    /// Choosing a select option by value
    SelectByValue,
    /// Pointer hover
    Hover,
}

impl Action {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "double_click",
            Self::SendKeys => "send_keys",
            Self::Clear => "clear",
            Self::GetAttribute => "get_attribute",
            Self::Text => "text",
            Self::SelectByValue => "select_by_value",
            Self::Hover => "hover",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Action performed
    Passed,
    /// Action failed
    Failed {
        /// Error message
        message: String,
    },
}

impl Outcome {
    /// Check if outcome is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Outcome of an action result
    #[must_use]
    pub fn of<T>(result: &PagewireResult<T>) -> Self {
        match result {
            Ok(_) => Self::Passed,
            Err(e) => Self::Failed {
                message: e.to_string(),
            },
        }
    }
}

/// One reported interaction step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Human-readable step label
    pub step_label: String,
    /// What was done
    pub action: Action,
    /// Element the action targeted
    pub locator: Locator,
    /// Screenshot written for the step, if capture succeeded
    pub evidence_path: Option<PathBuf>,
    /// When the step finished
    pub timestamp: DateTime<Utc>,
    /// Result of the step
    pub outcome: Outcome,
}

impl InteractionRecord {
    /// Create a passing record stamped now
    #[must_use]
    pub fn new(step_label: impl Into<String>, action: Action, locator: Locator) -> Self {
        Self {
            step_label: step_label.into(),
            action,
            locator,
            evidence_path: None,
            timestamp: Utc::now(),
            outcome: Outcome::Passed,
        }
    }

    /// Attach evidence
    #[must_use]
    pub fn with_evidence(mut self, path: Option<PathBuf>) -> Self {
        self.evidence_path = path;
        self
    }

    /// Set the outcome
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Consumer of interaction records
pub trait Reporter {
    /// Accept one record
    ///
    /// # Errors
    ///
    /// Implementation-specific; callers log and continue.
    fn record(&self, record: &InteractionRecord) -> PagewireResult<()>;
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn record(&self, record: &InteractionRecord) -> PagewireResult<()> {
        (**self).record(record)
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn record(&self, record: &InteractionRecord) -> PagewireResult<()> {
        (**self).record(record)
    }
}

/// Logs each record through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record(&self, record: &InteractionRecord) -> PagewireResult<()> {
        let evidence = record
            .evidence_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match &record.outcome {
            Outcome::Passed => info!(
                step = %record.step_label,
                action = %record.action,
                locator = %record.locator,
                evidence = %evidence,
                "step passed"
            ),
            Outcome::Failed { message } => warn!(
                step = %record.step_label,
                action = %record.action,
                locator = %record.locator,
                evidence = %evidence,
                error = %message,
                "step failed"
            ),
        }
        Ok(())
    }
}

/// Collects records in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    records: Mutex<Vec<InteractionRecord>>,
}

impl MemoryReporter {
    /// Create new empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records so far
    #[must_use]
    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records whose outcome is a failure
    #[must_use]
    pub fn failures(&self) -> Vec<InteractionRecord> {
        self.records()
            .into_iter()
            .filter(|r| !r.outcome.is_passed())
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, record: &InteractionRecord) -> PagewireResult<()> {
        self.records
            .lock()
            .map_err(|_| PagewireError::config("memory reporter lock poisoned"))?
            .push(record.clone());
        Ok(())
    }
}

/// Appends one JSON object per record to a file
#[derive(Debug)]
pub struct JsonLinesReporter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesReporter {
    /// Open `path` for appending, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened.
    pub fn create(path: impl AsRef<Path>) -> PagewireResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Output path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for JsonLinesReporter {
    fn record(&self, record: &InteractionRecord) -> PagewireResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = self
            .file
            .lock()
            .map_err(|_| PagewireError::config("report file lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
