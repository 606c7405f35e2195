//! Locator parsing.
//!
//! Page objects and test scripts keep their element queries as compact strings
//! of the form `<strategy>==<value>`:
//!
//! ```text
//! id==username
//! name==password
//! xpath==//*[@id='uname']
//! linkText==Forgot password?
//! class==btn-primary
//! css==form > button[type='submit']
//! ```
//!
//! The string syntax stays at the boundary. Internally every query is a
//! [`Locator`] carrying a closed [`Strategy`] enum, so resolution is an
//! exhaustive match and a typo in a strategy token fails once, at parse time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{PagewireError, PagewireResult};

/// Separator between strategy token and value
pub const SEPARATOR: &str = "==";

/// How the driver should look an element up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// Element `id` attribute (Appium: resource id)
    Id,
    /// Element `name` attribute
    Name,
    /// XPath expression
    XPath,
    /// Exact anchor text
    LinkText,
    /// Single class name
    Class,
    /// CSS selector
    Css,
}

impl Strategy {
    /// Every strategy, in token order
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::XPath,
        Self::LinkText,
        Self::Class,
        Self::Css,
    ];

    /// Canonical token used in locator strings
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::XPath => "xpath",
            Self::LinkText => "linkText",
            Self::Class => "class",
            Self::Css => "css",
        }
    }

    /// Look a token up, ignoring ASCII case
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A typed element query: strategy plus value.
///
/// Serializes as its canonical `<token>==<value>` string, so page files and
/// reports keep the familiar syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    strategy: Strategy,
    value: String,
}

impl Locator {
    /// Create a locator from already-typed parts
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Parse `<strategy>==<value>`.
    ///
    /// Splits on the first `==` and trims both halves. The strategy token is
    /// matched case-insensitively.
    ///
    /// # Errors
    ///
    /// [`PagewireError::InvalidLocatorSyntax`] when the separator is missing,
    /// either half is empty, or the strategy token is unknown.
    pub fn parse(raw: &str) -> PagewireResult<Self> {
        let Some((tag, value)) = raw.split_once(SEPARATOR) else {
            return Err(PagewireError::invalid_locator(
                raw,
                format!("missing {SEPARATOR:?} separator"),
            ));
        };

        let tag = tag.trim();
        let value = value.trim();

        if tag.is_empty() {
            return Err(PagewireError::invalid_locator(raw, "empty strategy"));
        }
        if value.is_empty() {
            return Err(PagewireError::invalid_locator(raw, "empty value"));
        }

        let strategy = Strategy::from_token(tag).ok_or_else(|| {
            PagewireError::invalid_locator(raw, format!("unknown strategy {tag:?}"))
        })?;

        Ok(Self::new(strategy, value))
    }

    /// `id==<value>`
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// `name==<value>`
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// `xpath==<value>`
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// `linkText==<value>`
    #[must_use]
    pub fn link_text(value: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    /// `class==<value>`
    #[must_use]
    pub fn class(value: impl Into<String>) -> Self {
        Self::new(Strategy::Class, value)
    }

    /// `css==<value>`
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.strategy, self.value)
    }
}

impl FromStr for Locator {
    type Err = PagewireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locator {
    type Error = PagewireError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Locator {
    type Error = PagewireError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.to_string()
    }
}
