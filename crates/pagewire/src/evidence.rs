//! Step evidence: highlight, screenshot, restore, persist.
//!
//! ```text
//! element ──► border = highlight_style ──► screenshot ──► border restored
//!                                               │
//!                                               ▼
//!                              <directory>/<label without whitespace>.png
//! ```
//!
//! Capture is best-effort from the caller's point of view: every failure comes
//! back as [`PagewireError::EvidenceCaptureFailed`] so the interaction layer
//! can log it and carry on with the real action.

use crate::driver::{Driver, ElementHandle};
use crate::result::{PagewireError, PagewireResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default evidence directory
pub const DEFAULT_EVIDENCE_DIR: &str = "reports";

/// Default highlight border
pub const DEFAULT_HIGHLIGHT_STYLE: &str = "3px solid orange";

/// Restores the border saved by the highlight script
const RESTORE_SCRIPT: &str = "var e = arguments[0]; \
     e.style.border = e.getAttribute('data-pagewire-border') || ''; \
     e.removeAttribute('data-pagewire-border');";

/// Evidence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvidenceConfig {
    /// Capture evidence at all
    pub enabled: bool,
    /// Where screenshots are written
    pub directory: PathBuf,
    /// CSS border value applied while the screenshot is taken
    pub highlight_style: String,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from(DEFAULT_EVIDENCE_DIR),
            highlight_style: DEFAULT_HIGHLIGHT_STYLE.to_string(),
        }
    }
}

impl EvidenceConfig {
    /// Evidence disabled
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set output directory
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set highlight border
    #[must_use]
    pub fn with_highlight_style(mut self, style: impl Into<String>) -> Self {
        self.highlight_style = style.into();
        self
    }
}

/// Captures highlighted screenshots for interaction steps
#[derive(Debug, Clone)]
pub struct EvidenceCapture {
    config: EvidenceConfig,
    whitespace: Regex,
}

impl EvidenceCapture {
    /// Create a capturer
    ///
    /// # Errors
    ///
    /// Returns [`PagewireError::Config`] if the label pattern fails to compile.
    pub fn new(config: EvidenceConfig) -> PagewireResult<Self> {
        let whitespace = Regex::new(r"\s+")
            .map_err(|e| PagewireError::config(format!("label pattern: {e}")))?;
        Ok(Self { config, whitespace })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &EvidenceConfig {
        &self.config
    }

    /// Whether capture is switched on
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// File name for a step label: whitespace removed, path separators
    /// replaced, `step` when nothing is left.
    #[must_use]
    pub fn file_name(&self, label: &str) -> String {
        let compact = self.whitespace.replace_all(label, "");
        let safe: String = compact
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        if safe.is_empty() {
            "step.png".to_string()
        } else {
            format!("{safe}.png")
        }
    }

    /// Where evidence for `label` is written
    #[must_use]
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.config.directory.join(self.file_name(label))
    }

    /// Highlight `element`, screenshot the page, restore the element, and
    /// write the screenshot.
    ///
    /// Returns `Ok(None)` when capture is disabled. A failing highlight (no
    /// script support, as in native app contexts) is logged and the plain
    /// screenshot is still taken. The restore step runs whenever the
    /// highlight did, even when the screenshot fails.
    ///
    /// # Errors
    ///
    /// [`PagewireError::EvidenceCaptureFailed`] when the screenshot cannot be
    /// taken or written.
    pub fn capture<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        element: &ElementHandle,
        label: &str,
    ) -> PagewireResult<Option<PathBuf>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let highlight = self.highlight_script()?;
        let highlighted = match driver.execute_script(&highlight, &[element]) {
            Ok(_) => true,
            Err(e) => {
                warn!(element = element.id(), error = %e, "highlight failed, capturing without it");
                false
            }
        };

        let shot = driver.screenshot();

        if highlighted {
            if let Err(e) = driver.execute_script(RESTORE_SCRIPT, &[element]) {
                warn!(element = element.id(), error = %e, "could not restore highlighted element");
            }
        }

        let shot = shot.map_err(|e| PagewireError::evidence(format!("screenshot: {e}")))?;
        self.persist(self.path_for(label), &shot.data, shot.size_bytes())
            .map(Some)
    }

    /// Screenshot the whole page with no highlight, written to
    /// `<label>-failure.png`.
    ///
    /// Used for steps that failed before an element was available.
    ///
    /// # Errors
    ///
    /// [`PagewireError::EvidenceCaptureFailed`] when the screenshot cannot be
    /// taken or written.
    pub fn capture_page<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        label: &str,
    ) -> PagewireResult<Option<PathBuf>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let shot = driver
            .screenshot()
            .map_err(|e| PagewireError::evidence(format!("screenshot: {e}")))?;
        self.persist(self.failure_path_for(label), &shot.data, shot.size_bytes())
            .map(Some)
    }

    /// Where the failure screenshot for `label` is written
    #[must_use]
    pub fn failure_path_for(&self, label: &str) -> PathBuf {
        let name = self.file_name(label);
        let stem = name.strip_suffix(".png").unwrap_or(&name);
        self.config.directory.join(format!("{stem}-failure.png"))
    }

    fn persist(&self, path: PathBuf, data: &[u8], bytes: usize) -> PagewireResult<PathBuf> {
        write_evidence(&path, data)?;
        debug!(path = %path.display(), bytes, "evidence written");
        Ok(path)
    }

    fn highlight_script(&self) -> PagewireResult<String> {
        let style = serde_json::to_string(&self.config.highlight_style)
            .map_err(|e| PagewireError::evidence(format!("highlight style: {e}")))?;
        Ok(format!(
            "var e = arguments[0]; \
             e.setAttribute('data-pagewire-border', e.style.border); \
             e.style.border = {style};"
        ))
    }
}

fn write_evidence(path: &Path, data: &[u8]) -> PagewireResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PagewireError::evidence(format!("{}: {e}", parent.display())))?;
    }
    std::fs::write(path, data)
        .map_err(|e| PagewireError::evidence(format!("{}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, PNG_MAGIC};
    use crate::locator::Locator;
    use tempfile::TempDir;

    fn capturer(dir: &Path) -> EvidenceCapture {
        EvidenceCapture::new(EvidenceConfig::default().with_directory(dir)).unwrap()
    }

    fn driver() -> MockDriver {
        MockDriver::new().with_element(MockElement::new("e1", Locator::id("loginButton")))
    }

    mod file_name_tests {
        use super::*;

        #[test]
        fn test_whitespace_removed() {
            let capture = capturer(Path::new("reports"));
            assert_eq!(capture.file_name("Click on Login"), "ClickonLogin.png");
            assert_eq!(capture.file_name(" tab\tand\nnewline "), "tabandnewline.png");
        }

        #[test]
        fn test_separators_replaced() {
            let capture = capturer(Path::new("reports"));
            assert_eq!(capture.file_name("step 1/2"), "step1_2.png");
        }

        #[test]
        fn test_empty_label() {
            let capture = capturer(Path::new("reports"));
            assert_eq!(capture.file_name("   "), "step.png");
        }

        #[test]
        fn test_path_for_joins_directory() {
            let capture = capturer(Path::new("out"));
            assert_eq!(capture.path_for("a b"), PathBuf::from("out/ab.png"));
        }
    }

    mod capture_tests {
        use super::*;

        #[test]
        fn test_capture_writes_png() {
            let dir = TempDir::new().unwrap();
            let capture = capturer(dir.path());
            let mut driver = driver();

            let path = capture
                .capture(&mut driver, &ElementHandle::new("e1"), "Enter user name")
                .unwrap()
                .unwrap();

            assert_eq!(path, dir.path().join("Enterusername.png"));
            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(&PNG_MAGIC));
            assert_eq!(driver.call_count("execute_script"), 2);
        }

        #[test]
        fn test_highlight_uses_configured_style() {
            let dir = TempDir::new().unwrap();
            let capture = EvidenceCapture::new(
                EvidenceConfig::default()
                    .with_directory(dir.path())
                    .with_highlight_style("2px dashed red"),
            )
            .unwrap();
            let mut driver = driver();
            let _ = capture
                .capture(&mut driver, &ElementHandle::new("e1"), "x")
                .unwrap();
            assert!(driver.history()[0].contains("\"2px dashed red\""));
        }

        #[test]
        fn test_disabled_does_nothing() {
            let capture = EvidenceCapture::new(EvidenceConfig::disabled()).unwrap();
            let mut driver = driver();
            let path = capture
                .capture(&mut driver, &ElementHandle::new("e1"), "x")
                .unwrap();
            assert!(path.is_none());
            assert!(driver.history().is_empty());
        }

        #[test]
        fn test_screenshot_failure_still_restores() {
            let dir = TempDir::new().unwrap();
            let capture = capturer(dir.path());
            let mut driver = driver().failing_screenshots();

            let err = capture
                .capture(&mut driver, &ElementHandle::new("e1"), "x")
                .unwrap_err();

            assert!(matches!(err, PagewireError::EvidenceCaptureFailed { .. }));
            assert_eq!(driver.call_count("execute_script"), 2);
            assert!(!dir.path().join("x.png").exists());
        }

        #[test]
        fn test_highlight_failure_still_captures() {
            let dir = TempDir::new().unwrap();
            let capture = capturer(dir.path());
            let mut driver = driver().failing_scripts();

            let path = capture
                .capture(&mut driver, &ElementHandle::new("e1"), "Tap login")
                .unwrap()
                .unwrap();

            assert_eq!(path, dir.path().join("Taplogin.png"));
            assert!(std::fs::read(&path).unwrap().starts_with(&PNG_MAGIC));
            // no restore without a highlight
            assert_eq!(driver.call_count("execute_script"), 1);
        }

        #[test]
        fn test_capture_page_writes_failure_file() {
            let dir = TempDir::new().unwrap();
            let capture = capturer(dir.path());
            let mut driver = driver();

            let path = capture.capture_page(&mut driver, "Click on Login").unwrap().unwrap();

            assert_eq!(path, dir.path().join("ClickonLogin-failure.png"));
            assert!(path.exists());
            assert_eq!(driver.call_count("execute_script"), 0);
        }

        #[test]
        fn test_capture_page_disabled() {
            let capture = EvidenceCapture::new(EvidenceConfig::disabled()).unwrap();
            let mut driver = driver();
            assert!(capture.capture_page(&mut driver, "x").unwrap().is_none());
            assert!(driver.history().is_empty());
        }

        #[test]
        fn test_capture_page_screenshot_failure() {
            let dir = TempDir::new().unwrap();
            let capture = capturer(dir.path());
            let mut driver = driver().failing_screenshots();
            let err = capture.capture_page(&mut driver, "x").unwrap_err();
            assert!(matches!(err, PagewireError::EvidenceCaptureFailed { .. }));
        }

        #[test]
        fn test_unwritable_directory() {
            let dir = TempDir::new().unwrap();
            let blocker = dir.path().join("file");
            std::fs::write(&blocker, b"").unwrap();
            let capture = capturer(&blocker);
            let mut driver = driver();
            let err = capture
                .capture(&mut driver, &ElementHandle::new("e1"), "x")
                .unwrap_err();
            assert!(matches!(err, PagewireError::EvidenceCaptureFailed { .. }));
        }
    }
}
