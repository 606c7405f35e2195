//! Element resolution against a live session.
//!
//! `resolve_one` is first-match-wins: when several elements match, the first
//! one in driver order is returned. That order is driver-defined and not
//! guaranteed stable between queries; callers that care should tighten the
//! locator rather than rely on position.

use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::result::{PagewireError, PagewireResult};
use tracing::debug;

/// Result of a multi-element query.
///
/// Consuming and single-pass. Re-enumerating needs a fresh [`resolve_many`].
#[derive(Debug)]
pub struct Elements {
    inner: std::vec::IntoIter<ElementHandle>,
}

impl Elements {
    fn new(handles: Vec<ElementHandle>) -> Self {
        Self {
            inner: handles.into_iter(),
        }
    }
}

impl Iterator for Elements {
    type Item = ElementHandle;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Elements {}

/// Resolve the first element matching `locator`.
///
/// # Errors
///
/// [`PagewireError::ElementNotFound`] on zero matches; driver errors pass
/// through unchanged.
pub fn resolve_one<D: Driver + ?Sized>(
    driver: &D,
    locator: &Locator,
) -> PagewireResult<ElementHandle> {
    let handles = driver.find_elements(locator.strategy(), locator.value())?;
    let count = handles.len();
    let first = handles
        .into_iter()
        .next()
        .ok_or_else(|| PagewireError::ElementNotFound {
            locator: locator.to_string(),
        })?;
    debug!(%locator, matches = count, element = first.id(), "resolved element");
    Ok(first)
}

/// Resolve every element matching `locator`. Zero matches is an empty result.
pub fn resolve_many<D: Driver + ?Sized>(driver: &D, locator: &Locator) -> PagewireResult<Elements> {
    let handles = driver.find_elements(locator.strategy(), locator.value())?;
    debug!(%locator, matches = handles.len(), "resolved elements");
    Ok(Elements::new(handles))
}

/// Whether at least one element matches right now
pub fn is_present<D: Driver + ?Sized>(driver: &D, locator: &Locator) -> PagewireResult<bool> {
    Ok(resolve_many(driver, locator)?.len() > 0)
}
