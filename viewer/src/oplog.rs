//! Unified operation log across a buffer pair.

use crate::buffer::Range;

/// Which buffer of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSide {
    /// The original text, the one saved to disk.
    Left,
    /// The modified (proposed) text.
    Right,
}

/// One undoable operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationLogEntry {
    /// A user edit to one buffer.
    RegularEdit {
        /// Buffer that was edited.
        side: BufferSide,
    },
    /// A chunk accepted from right into left.
    AcceptChange {
        /// Left-side range the chunk covered before the accept.
        original_range: Range,
        /// Left-side text that was replaced.
        original_text: String,
        /// Right-side range the text was copied from.
        modified_range: Range,
        /// Right-side text that was copied.
        modified_text: String,
    },
}

/// Most recent operation last.
#[derive(Debug, Clone, Default)]
pub struct OperationLog {
    entries: Vec<OperationLogEntry>,
}

impl OperationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: OperationLogEntry) {
        self.entries.push(entry);
    }

    /// Removes and returns the most recent entry.
    pub fn pop(&mut self) -> Option<OperationLogEntry> {
        self.entries.pop()
    }

    /// The most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&OperationLogEntry> {
        self.entries.last()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OperationLogEntry> {
        self.entries.iter()
    }
}
