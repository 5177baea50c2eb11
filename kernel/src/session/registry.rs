//! In-memory session store.

use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::history::{ClosedSession, SessionHistory};
use super::types::{DiffSession, DiffSource, SessionId};

/// Hands out strictly increasing ids derived from the wall clock.
#[derive(Debug, Default)]
struct IdClock {
    last: u64,
}

impl IdClock {
    fn next(&mut self) -> SessionId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        self.last = now.max(self.last + 1);
        SessionId::from_millis(self.last)
    }
}

/// Stores open diff sessions keyed by id, in creation order.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, DiffSession>,
    history: SessionHistory,
    clock: IdClock,
}

impl SessionRegistry {
    /// Creates an empty registry remembering up to `history_capacity` closed
    /// sessions.
    #[must_use]
    pub fn new(history_capacity: usize) -> Self {
        Self {
            sessions: BTreeMap::new(),
            history: SessionHistory::new(history_capacity),
            clock: IdClock::default(),
        }
    }

    /// Registers a new session and returns it.
    #[instrument(skip(self, source), fields(left = ?source.left_path, right = ?source.right_path))]
    pub fn create(&mut self, source: DiffSource) -> DiffSession {
        let id = self.clock.next();
        let session = DiffSession {
            id,
            left_path: source.left_path,
            right_path: source.right_path,
            left_content: source.left_content,
            right_content: source.right_content,
            created_at: Utc::now(),
        };
        self.sessions.insert(id, session.clone());
        info!(session_id = %id, total = self.sessions.len(), "Diff session created");
        session
    }

    /// The open session with `id`.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&DiffSession> {
        self.sessions.get(&id)
    }

    /// Removes a session, moving it into the closed history.
    ///
    /// Returns `None` if no session has that id.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: SessionId) -> Option<DiffSession> {
        let session = self.sessions.remove(&id)?;
        self.history.record(session.clone());
        info!(session_id = %id, remaining = self.sessions.len(), "Diff session closed");
        Some(session)
    }

    /// All open sessions in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<DiffSession> {
        self.sessions.values().cloned().collect()
    }

    /// The open session with the newest id.
    #[must_use]
    pub fn latest(&self) -> Option<&DiffSession> {
        self.sessions.values().next_back()
    }

    /// Number of open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Stores fresh on-disk content for every side backed by `path`, in open
    /// and closed sessions alike, so a reopened session shows the file as it
    /// is now.
    ///
    /// Returns the number of open sessions that reference the path.
    pub fn apply_file_change(&mut self, path: &Path, content: &str) -> usize {
        let touched = self
            .sessions
            .values_mut()
            .map(|session| session.refresh(path, content))
            .filter(|matched| *matched)
            .count();
        let closed = self.history.apply_file_change(path, content);
        debug!(path = %path.display(), touched, closed, "Applied file change to sessions");
        touched
    }

    /// Moves a closed session back into the registry under its original id.
    #[instrument(skip(self))]
    pub fn reopen(&mut self, id: SessionId) -> Option<DiffSession> {
        let session = self.history.take(id)?;
        self.sessions.insert(id, session.clone());
        info!(session_id = %id, "Diff session reopened");
        Some(session)
    }

    /// Closed sessions, most recently closed first.
    #[must_use]
    pub fn closed(&self) -> Vec<ClosedSession> {
        self.history.list()
    }

    /// Forgets every closed session.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(50)
    }
}
