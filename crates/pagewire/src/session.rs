//! Session ownership and the per-worker registry.
//!
//! A [`Session`] owns exactly one live driver. Parallel test workers each get
//! their own session; [`SessionRegistry`] keys them by [`ThreadId`] so a
//! lookup from one worker can never observe another worker's session.
//!
//! ```text
//!  worker A ──► registry[ThreadId(A)] ──► Session { driver A }
//!  worker B ──► registry[ThreadId(B)] ──► Session { driver B }
//! ```
//!
//! Teardown is idempotent. After it, every driver access reports
//! [`PagewireError::SessionUnavailable`].

use crate::driver::Driver;
use crate::result::{PagewireError, PagewireResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use tracing::{info, warn};
use uuid::Uuid;

/// One live driver session
pub struct Session<D: Driver> {
    id: Uuid,
    started_at: DateTime<Utc>,
    driver: Option<D>,
}

impl<D: Driver> Session<D> {
    /// Take ownership of a started driver
    #[must_use]
    pub fn new(driver: D) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "session started");
        Self {
            id,
            started_at: Utc::now(),
            driver: Some(driver),
        }
    }

    /// Unique session id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// When the session was created
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whether teardown has not run yet
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.driver.is_some()
    }

    /// Borrow the driver
    ///
    /// # Errors
    ///
    /// [`PagewireError::SessionUnavailable`] after teardown.
    pub fn driver(&self) -> PagewireResult<&D> {
        self.driver.as_ref().ok_or_else(|| self.unavailable())
    }

    /// Borrow the driver mutably
    ///
    /// # Errors
    ///
    /// [`PagewireError::SessionUnavailable`] after teardown.
    pub fn driver_mut(&mut self) -> PagewireResult<&mut D> {
        let id = self.id;
        self.driver.as_mut().ok_or_else(|| {
            PagewireError::session_unavailable(format!("session {id} was torn down"))
        })
    }

    /// End the session. Safe to call more than once; `quit` failures are
    /// logged, not returned.
    pub fn teardown(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };
        match driver.quit() {
            Ok(()) => info!(session = %self.id, "session torn down"),
            Err(e) => warn!(session = %self.id, error = %e, "driver quit failed during teardown"),
        }
    }

    fn unavailable(&self) -> PagewireError {
        PagewireError::session_unavailable(format!("session {} was torn down", self.id))
    }
}

impl<D: Driver> Drop for Session<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: Driver> fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("started_at", &self.started_at)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Shared handle to a worker's session
pub type SharedSession<D> = Arc<Mutex<Session<D>>>;

/// Per-worker session registry
pub struct SessionRegistry<D: Driver> {
    sessions: Mutex<HashMap<ThreadId, SharedSession<D>>>,
}

impl<D: Driver> Default for SessionRegistry<D> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl<D: Driver> fmt::Debug for SessionRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .finish()
    }
}

impl<D: Driver> SessionRegistry<D> {
    /// Create new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PagewireResult<MutexGuard<'_, HashMap<ThreadId, SharedSession<D>>>> {
        self.sessions
            .lock()
            .map_err(|_| PagewireError::session_unavailable("session registry lock poisoned"))
    }

    /// Start a session for the calling worker.
    ///
    /// A session already registered for this worker is torn down first.
    ///
    /// # Errors
    ///
    /// [`PagewireError::SessionUnavailable`] if the registry lock is poisoned.
    pub fn register(&self, driver: D) -> PagewireResult<SharedSession<D>> {
        let session = Arc::new(Mutex::new(Session::new(driver)));
        let previous = self
            .lock()?
            .insert(thread::current().id(), Arc::clone(&session));
        if let Some(previous) = previous {
            warn!("worker registered a second session; tearing down the first");
            teardown_shared(&previous);
        }
        Ok(session)
    }

    /// The calling worker's session
    ///
    /// # Errors
    ///
    /// [`PagewireError::SessionUnavailable`] when this worker has none.
    pub fn current(&self) -> PagewireResult<SharedSession<D>> {
        self.lock()?
            .get(&thread::current().id())
            .cloned()
            .ok_or_else(|| PagewireError::session_unavailable("no session for this worker"))
    }

    /// Run `f` against the calling worker's session
    ///
    /// # Errors
    ///
    /// [`PagewireError::SessionUnavailable`] when this worker has none, or
    /// whatever `f` returns.
    pub fn with_current<T, F>(&self, f: F) -> PagewireResult<T>
    where
        F: FnOnce(&mut Session<D>) -> PagewireResult<T>,
    {
        let shared = self.current()?;
        let mut session = shared
            .lock()
            .map_err(|_| PagewireError::session_unavailable("session lock poisoned"))?;
        f(&mut session)
    }

    /// Tear down and forget the calling worker's session. No-op when there is
    /// none.
    pub fn teardown_current(&self) {
        let removed = match self.lock() {
            Ok(mut sessions) => sessions.remove(&thread::current().id()),
            Err(e) => {
                warn!(error = %e, "could not tear down session");
                None
            }
        };
        if let Some(session) = removed {
            teardown_shared(&session);
        }
    }

    /// Tear down every registered session
    pub fn teardown_all(&self) {
        let drained: Vec<SharedSession<D>> = match self.lock() {
            Ok(mut sessions) => sessions.drain().map(|(_, s)| s).collect(),
            Err(e) => {
                warn!(error = %e, "could not tear down sessions");
                Vec::new()
            }
        };
        for session in &drained {
            teardown_shared(session);
        }
    }

    /// Number of registered sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if no sessions are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn teardown_shared<D: Driver>(session: &SharedSession<D>) {
    match session.lock() {
        Ok(mut session) => session.teardown(),
        Err(poisoned) => poisoned.into_inner().teardown(),
    }
}
