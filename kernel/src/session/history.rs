//! Bounded history of closed sessions, most recent first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::types::{DiffSession, SessionId};

/// A session that was closed and can be reopened.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedSession {
    /// Id the session had while open; reopening keeps it.
    pub id: SessionId,
    /// Left file, if any.
    pub left_path: Option<PathBuf>,
    /// Right file, if any.
    pub right_path: Option<PathBuf>,
    /// When the session was closed.
    pub closed_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) session: DiffSession,
}

/// Closed sessions kept for reopening.
#[derive(Debug)]
pub struct SessionHistory {
    entries: VecDeque<ClosedSession>,
    capacity: usize,
}

impl SessionHistory {
    /// Creates an empty history that remembers at most `capacity` sessions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Records a closed session, evicting the oldest entry past capacity.
    pub fn record(&mut self, session: DiffSession) {
        if self.capacity == 0 {
            return;
        }
        self.entries.retain(|e| e.id != session.id);
        self.entries.push_front(ClosedSession {
            id: session.id,
            left_path: session.left_path.clone(),
            right_path: session.right_path.clone(),
            closed_at: Utc::now(),
            session,
        });
        self.entries.truncate(self.capacity);
    }

    /// Removes and returns the closed session with `id`.
    pub fn take(&mut self, id: SessionId) -> Option<DiffSession> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index).map(|e| e.session)
    }

    /// Closed sessions, most recently closed first.
    #[must_use]
    pub fn list(&self) -> Vec<ClosedSession> {
        self.entries.iter().cloned().collect()
    }

    /// Stores `content` in every closed session backed by `path`. Returns
    /// how many matched.
    pub fn apply_file_change(&mut self, path: &Path, content: &str) -> usize {
        self.entries
            .iter_mut()
            .map(|entry| entry.session.refresh(path, content))
            .filter(|matched| *matched)
            .count()
    }

    /// Forgets every closed session.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of closed sessions kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been closed, or the history was cleared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
