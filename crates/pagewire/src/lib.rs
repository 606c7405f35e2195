//! Pagewire: Locator-Driven UI Test Harness
//!
//! Page objects keep their element queries as compact `strategy==value`
//! strings. Pagewire parses those into typed [`Locator`]s, resolves them
//! against a live [`Driver`] session, gates every interaction on a bounded
//! readiness poll, and records a highlighted screenshot for each step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        PAGEWIRE Architecture                         │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  "id==username"                                                      │
//! │        │                                                             │
//! │        ▼                                                             │
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌──────────────┐   │
//! │  │ Locator   │──►│ Resolver  │──►│ Poller    │──►│ Interactions │   │
//! │  │ parse     │   │ find      │   │ wait      │   │ act+evidence │   │
//! │  └───────────┘   └───────────┘   └───────────┘   └──────┬───────┘   │
//! │                        ▲                                 │           │
//! │                        │                                 ▼           │
//! │                 ┌──────┴──────┐                   ┌────────────┐     │
//! │                 │ Session<D>  │                   │ Reporter   │     │
//! │                 │ (per worker)│                   │            │     │
//! │                 └─────────────┘                   └────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pagewire::prelude::*;
//!
//! let driver = MockDriver::new()
//!     .with_element(MockElement::new("e1", Locator::id("loginButton")));
//! let mut session = Session::new(driver);
//! let steps = Interactions::new(
//!     WaitConfig::default(),
//!     EvidenceConfig::disabled(),
//!     MemoryReporter::new(),
//! )
//! .unwrap();
//!
//! let login: Locator = "id==loginButton".parse().unwrap();
//! steps.click(&mut session, &login, "Click on Login").unwrap();
//! assert_eq!(steps.reporter().len(), 1);
//! ```

#![warn(missing_docs)]

mod codec;
mod config;
mod driver;
mod evidence;
mod interact;
mod locator;
mod page_object;
mod reporter;
mod resolver;
mod result;
mod session;
mod testdata;
mod wait;
#[cfg(feature = "webdriver")]
mod webdriver;

pub use codec::{decrypt_string, encrypt_string};
pub use config::{
    Dialect, HarnessConfig, Platform, SessionConfig, CONFIG_ENV_VAR, DEFAULT_SERVER_URL,
};
pub use driver::{
    Driver, ElementHandle, MockDriver, MockElement, Point, Screenshot, WindowSize, PNG_MAGIC,
};
pub use evidence::{EvidenceCapture, EvidenceConfig, DEFAULT_EVIDENCE_DIR, DEFAULT_HIGHLIGHT_STYLE};
pub use interact::Interactions;
pub use locator::{Locator, Strategy, SEPARATOR};
pub use page_object::{LocatorIssue, PageLocators, PageObject};
pub use reporter::{
    Action, InteractionRecord, JsonLinesReporter, MemoryReporter, Outcome, Reporter,
    TracingReporter,
};
pub use resolver::{is_present, resolve_many, resolve_one, Elements};
pub use result::{PagewireError, PagewireResult};
pub use session::{Session, SessionRegistry, SharedSession};
pub use testdata::{DataSource, TestData, DEFAULT_TEST_DATA_PATH};
pub use wait::{
    await_page_loaded, await_present, await_visible, poll_until, WaitConfig, WaitOptions,
    DEFAULT_PAGE_LOAD_POLL_MS, DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_PRESENCE_POLL_MS,
    DEFAULT_PRESENCE_TIMEOUT_MS, DEFAULT_VISIBILITY_POLL_MS, DEFAULT_VISIBILITY_TIMEOUT_MS,
    READY_STATE_SCRIPT,
};
#[cfg(feature = "webdriver")]
pub use webdriver::{WebDriverSession, ELEMENT_KEY};

// Re-export the derive macro when the `derive` feature is enabled
#[cfg(feature = "derive")]
pub use pagewire_derive::PageObject;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::codec::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::evidence::*;
    pub use super::interact::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::reporter::*;
    pub use super::resolver::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::testdata::*;
    pub use super::wait::*;
    #[cfg(feature = "webdriver")]
    pub use super::webdriver::*;
}
