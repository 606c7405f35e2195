//! Page Object Model support.
//!
//! A page object names the locators of one screen. Two ways to get one:
//!
//! - `#[derive(PageObject)]` (feature `derive`) on a struct whose fields carry
//!   `#[locator = "id==username"]`; the strategy token is checked when the
//!   crate compiles.
//! - [`PageLocators`] loaded from a YAML page file at run time:
//!
//! ```yaml
//! page: login
//! locators:
//!   username: id==username
//!   password: id==password
//!   submit: xpath==//button[@type='submit']
//! ```

use crate::driver::Driver;
use crate::locator::Locator;
use crate::resolver;
use crate::result::{PagewireError, PagewireResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A page or component with named locators.
///
/// # Example
///
/// ```
/// use pagewire::{Locator, PageObject};
///
/// struct LoginPage {
///     username: Locator,
///     submit: Locator,
/// }
///
/// impl PageObject for LoginPage {
///     fn page_name(&self) -> &str {
///         "LoginPage"
///     }
///
///     fn locators(&self) -> Vec<(&str, &Locator)> {
///         vec![("username", &self.username), ("submit", &self.submit)]
///     }
/// }
///
/// let page = LoginPage {
///     username: Locator::id("username"),
///     submit: Locator::id("loginButton"),
/// };
/// assert_eq!(page.locator("submit"), Some(&Locator::id("loginButton")));
/// ```
pub trait PageObject {
    /// Page name used in logs and reports
    fn page_name(&self) -> &str;

    /// Every named locator, in declaration order
    fn locators(&self) -> Vec<(&str, &Locator)>;

    /// Locator by name
    fn locator(&self, name: &str) -> Option<&Locator> {
        self.locators()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, l)| l)
    }

    /// Whether every locator currently matches at least one element
    fn is_loaded(&self, driver: &dyn Driver) -> PagewireResult<bool> {
        for (name, locator) in self.locators() {
            if !resolver::is_present(driver, locator)? {
                debug!(page = self.page_name(), locator = name, "page not loaded yet");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// A locator entry that failed to parse
#[derive(Debug)]
pub struct LocatorIssue {
    /// Entry name
    pub name: String,
    /// Parse error
    pub error: PagewireError,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageFile {
    page: String,
    #[serde(default)]
    locators: BTreeMap<String, String>,
}

/// Named locators for one page, loaded at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocators {
    name: String,
    locators: BTreeMap<String, Locator>,
}

impl PageLocators {
    /// Create an empty page
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locators: BTreeMap::new(),
        }
    }

    /// Add a locator
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, locator: Locator) -> Self {
        let _ = self.locators.insert(name.into(), locator);
        self
    }

    /// Parse a page file, failing on the first bad locator
    ///
    /// # Errors
    ///
    /// [`PagewireError::Yaml`] on malformed YAML,
    /// [`PagewireError::InvalidLocatorSyntax`] for a bad entry.
    pub fn from_yaml_str(yaml: &str) -> PagewireResult<Self> {
        let file: PageFile = serde_yaml_ng::from_str(yaml)?;
        let mut locators = BTreeMap::new();
        for (name, raw) in file.locators {
            let locator = Locator::parse(&raw)?;
            let _ = locators.insert(name, locator);
        }
        Ok(Self {
            name: file.page,
            locators,
        })
    }

    /// Load a page file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PagewireResult<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Check every entry of a page file and report each bad one
    ///
    /// # Errors
    ///
    /// [`PagewireError::Yaml`] when the document itself is malformed.
    pub fn validate(yaml: &str) -> PagewireResult<Vec<LocatorIssue>> {
        let file: PageFile = serde_yaml_ng::from_str(yaml)?;
        Ok(file
            .locators
            .into_iter()
            .filter_map(|(name, raw)| {
                Locator::parse(&raw)
                    .err()
                    .map(|error| LocatorIssue { name, error })
            })
            .collect())
    }

    /// Locator by name
    ///
    /// # Errors
    ///
    /// [`PagewireError::Config`] when the page has no such entry.
    pub fn get(&self, name: &str) -> PagewireResult<&Locator> {
        self.locators.get(name).ok_or_else(|| {
            PagewireError::config(format!("page {} has no locator {name:?}", self.name))
        })
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

impl PageObject for PageLocators {
    fn page_name(&self) -> &str {
        &self.name
    }

    fn locators(&self) -> Vec<(&str, &Locator)> {
        self.locators.iter().map(|(n, l)| (n.as_str(), l)).collect()
    }
}
