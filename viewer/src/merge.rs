//! Accepting diff chunks from the right buffer into the left one, with a
//! single undo history across both buffers.
//!
//! Both buffers are owned by [`ChunkMerger`]; callers edit them only through
//! it, so every change is either logged as a [`OperationLogEntry::RegularEdit`]
//! or is part of an accept. [`ChunkMerger::undo_last_operation`] is the only
//! place that calls the buffers' native undo.

use tracing::{debug, instrument};

use crate::buffer::{Range, TextBuffer};
use crate::chunk::{DiffChunk, find_chunk_for_line};
use crate::oplog::{BufferSide, OperationLog, OperationLogEntry};

/// Result of [`ChunkMerger::accept_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The chunk was copied into the left buffer.
    Applied,
    /// No chunk covers the requested line.
    NoMatch,
    /// The chunk no longer fits the live buffers, or is already applied.
    Stale,
    /// The left buffer already holds the chunk's text.
    Unchanged,
}

/// The left-side edit an accept resolves to.
struct AcceptPlan {
    range: Range,
    text: String,
    modified_range: Range,
    modified_text: String,
}

/// A left/right buffer pair with chunk accepting and unified undo.
#[derive(Debug, Clone, Default)]
pub struct ChunkMerger {
    left: TextBuffer,
    right: TextBuffer,
    log: OperationLog,
    /// Chunks applied by accepts still on the log, oldest first.
    accepted: Vec<DiffChunk>,
}

impl ChunkMerger {
    /// Creates a merger over fresh buffers.
    #[must_use]
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: TextBuffer::new(left),
            right: TextBuffer::new(right),
            log: OperationLog::new(),
            accepted: Vec::new(),
        }
    }

    /// The left (original) buffer.
    #[must_use]
    pub fn left(&self) -> &TextBuffer {
        &self.left
    }

    /// The right (modified) buffer.
    #[must_use]
    pub fn right(&self) -> &TextBuffer {
        &self.right
    }

    /// The buffer on `side`.
    #[must_use]
    pub fn buffer(&self, side: BufferSide) -> &TextBuffer {
        match side {
            BufferSide::Left => &self.left,
            BufferSide::Right => &self.right,
        }
    }

    /// The operation log.
    #[must_use]
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Replaces both texts, e.g. when a new session arrives, and forgets all
    /// history.
    pub fn load(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.left.set_value(left);
        self.right.set_value(right);
        self.left.drain_changes();
        self.right.drain_changes();
        self.log.clear();
        self.accepted.clear();
    }

    /// Replaces the right text only, keeping the left buffer and its
    /// history. Used when the right file changes on disk.
    pub fn reload_right(&mut self, right: impl Into<String>) {
        self.right.set_value(right);
        self.right.drain_changes();
        self.accepted.clear();
    }

    /// Applies a user edit to one buffer. Returns false if nothing changed.
    pub fn edit(&mut self, side: BufferSide, range: Range, text: &str) -> bool {
        let changed = self.buffer_mut(side).push_edit(range, text);
        self.track_changes();
        changed
    }

    /// Redoes the last undone step of one buffer. Redos are not logged.
    pub fn redo(&mut self, side: BufferSide) -> bool {
        let redone = self.buffer_mut(side).redo();
        self.track_changes();
        redone
    }

    /// Copies the chunk covering `current_line` (on the right side) into the
    /// left buffer as one undoable operation.
    #[instrument(skip(self, chunks), fields(chunks = chunks.len()))]
    pub fn accept_change(&mut self, current_line: u32, chunks: &[DiffChunk]) -> AcceptOutcome {
        let Some(chunk) = find_chunk_for_line(current_line, chunks).copied() else {
            debug!("No change found for line");
            return AcceptOutcome::NoMatch;
        };
        if self.accepted.contains(&chunk) {
            debug!(?chunk, "Chunk already accepted");
            return AcceptOutcome::Stale;
        }
        let Some(plan) = self.plan(&chunk) else {
            debug!(?chunk, "Chunk does not fit the current buffers");
            return AcceptOutcome::Stale;
        };

        let original_range = plan.range;
        let original_text = self.left.value_in_range(original_range).to_string();
        if !self.left.push_edit(plan.range, &plan.text) {
            return AcceptOutcome::Unchanged;
        }
        self.left.drain_changes();
        self.right.push_checkpoint();

        self.log.push(OperationLogEntry::AcceptChange {
            original_range,
            original_text,
            modified_range: plan.modified_range,
            modified_text: plan.modified_text,
        });
        self.accepted.push(chunk);
        AcceptOutcome::Applied
    }

    /// Undoes the most recent logged operation and returns it. An empty log
    /// is a no-op.
    pub fn undo_last_operation(&mut self) -> Option<OperationLogEntry> {
        let entry = self.log.pop()?;
        match &entry {
            OperationLogEntry::RegularEdit { side } => {
                self.buffer_mut(*side).undo();
            }
            OperationLogEntry::AcceptChange { .. } => {
                self.left.undo();
                self.right.undo();
                self.accepted.pop();
            }
        }
        self.track_changes();
        Some(entry)
    }

    fn buffer_mut(&mut self, side: BufferSide) -> &mut TextBuffer {
        match side {
            BufferSide::Left => &mut self.left,
            BufferSide::Right => &mut self.right,
        }
    }

    /// Logs a regular edit for each change that is not an undo or redo.
    fn track_changes(&mut self) {
        for side in [BufferSide::Left, BufferSide::Right] {
            let changes = self.buffer_mut(side).drain_changes();
            for change in changes {
                if !change.is_undoing && !change.is_redoing {
                    self.log.push(OperationLogEntry::RegularEdit { side });
                }
            }
        }
    }

    fn plan(&self, chunk: &DiffChunk) -> Option<AcceptPlan> {
        if chunk.is_insert() && chunk.is_delete() {
            return None;
        }

        let (modified_range, modified_text) = if chunk.is_delete() {
            let line = chunk.modified_start_line_number.max(1);
            (Range::caret(line, 1), String::new())
        } else {
            let start = chunk.modified_start_line_number;
            let end = chunk.modified_end_line_number;
            if start < 1 || end < start || end > self.right.line_count() {
                return None;
            }
            let range = Range::new(start, 1, end, self.right.line_max_column(end));
            (range, self.right.value_in_range(range).to_string())
        };

        let left_lines = self.left.line_count();
        let (range, text) = if left_lines == 0 {
            if modified_text.is_empty() {
                return None;
            }
            (Range::caret(1, 1), format!("{modified_text}\n"))
        } else if chunk.is_insert() {
            let anchor = chunk.original_start_line_number;
            if anchor == 0 {
                (Range::caret(1, 1), format!("{modified_text}\n"))
            } else if anchor > left_lines {
                return None;
            } else {
                let column = self.left.line_max_column(anchor);
                (Range::caret(anchor, column), format!("\n{modified_text}"))
            }
        } else {
            let start = chunk.original_start_line_number;
            let end = chunk.original_end_line_number;
            if start < 1 || end < start || end > left_lines {
                return None;
            }
            if chunk.is_delete() {
                (Range::new(start, 1, end + 1, 1), String::new())
            } else {
                let column = self.left.line_max_column(end);
                (Range::new(start, 1, end, column), modified_text.clone())
            }
        };

        Some(AcceptPlan {
            range,
            text,
            modified_range,
            modified_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace_line_two() -> DiffChunk {
        DiffChunk::new(2, 2, 2, 2)
    }

    #[test]
    fn replace_applies_exactly_once() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        let chunks = [replace_line_two()];

        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "A\nX\nC");

        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Stale);
        assert_eq!(merger.left().value(), "A\nX\nC");
        assert_eq!(merger.log().len(), 1);
    }

    #[test]
    fn reaccept_replace_after_unrelated_edit_is_stale() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        let chunks = [replace_line_two()];
        merger.accept_change(2, &chunks);
        merger.edit(BufferSide::Left, Range::caret(3, 2), "!");

        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Stale);
        assert_eq!(merger.left().value(), "A\nX\nC!");
    }

    #[test]
    fn reaccept_delete_after_unrelated_edit_is_stale() {
        let mut merger = ChunkMerger::new("a\nb\nc\nd\ne\nf", "a\nd\ne\nf");
        let chunks = [DiffChunk::new(2, 3, 2, 0)];
        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "a\nd\ne\nf");

        merger.edit(BufferSide::Left, Range::caret(4, 2), "!");
        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Stale);
        assert_eq!(merger.left().value(), "a\nd\ne\nf!");
        assert_eq!(merger.log().len(), 2);
    }

    #[test]
    fn reaccept_insert_after_unrelated_edit_is_stale() {
        let mut merger = ChunkMerger::new("a\nc", "a\nb\nc");
        let chunks = [DiffChunk::new(1, 0, 2, 2)];
        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Applied);

        merger.edit(BufferSide::Left, Range::caret(3, 2), "!");
        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Stale);
        assert_eq!(merger.left().value(), "a\nb\nc!");
    }

    #[test]
    fn undone_accept_can_be_accepted_again() {
        let mut merger = ChunkMerger::new("a\nc", "a\nb\nc");
        let chunks = [DiffChunk::new(1, 0, 2, 2)];
        merger.accept_change(2, &chunks);
        merger.edit(BufferSide::Left, Range::caret(1, 1), ">");

        merger.undo_last_operation();
        merger.undo_last_operation();
        assert_eq!(merger.left().value(), "a\nc");

        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "a\nb\nc");
    }

    #[test]
    fn reloading_right_forgets_applied_chunks() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        let chunks = [replace_line_two()];
        merger.accept_change(2, &chunks);

        merger.reload_right("A\nY\nC");
        assert_eq!(merger.accept_change(2, &chunks), AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "A\nY\nC");
    }

    #[test]
    fn multi_line_replace() {
        let mut merger = ChunkMerger::new("a\nb\nc\nd", "a\nX\nY\nZ\nd");
        let outcome = merger.accept_change(3, &[DiffChunk::new(2, 3, 2, 4)]);
        assert_eq!(outcome, AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "a\nX\nY\nZ\nd");
    }

    #[test]
    fn insert_into_empty_left_adds_one_line_break() {
        let mut merger = ChunkMerger::new("", "hello\nworld");
        let outcome = merger.accept_change(1, &[DiffChunk::new(0, 0, 1, 2)]);
        assert_eq!(outcome, AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "hello\nworld\n");
    }

    #[test]
    fn empty_left_overrides_chunk_shape() {
        let mut merger = ChunkMerger::new("", "new");
        let outcome = merger.accept_change(1, &[DiffChunk::new(1, 1, 1, 1)]);
        assert_eq!(outcome, AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "new\n");
    }

    #[test]
    fn insert_at_top_of_non_empty_left() {
        let mut merger = ChunkMerger::new("b\nc", "a\nb\nc");
        merger.accept_change(1, &[DiffChunk::new(0, 0, 1, 1)]);
        assert_eq!(merger.left().value(), "a\nb\nc");
    }

    #[test]
    fn insert_after_anchor_line() {
        let mut merger = ChunkMerger::new("a\nc", "a\nb\nc");
        let outcome = merger.accept_change(2, &[DiffChunk::new(1, 0, 2, 2)]);
        assert_eq!(outcome, AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "a\nb\nc");
    }

    #[test]
    fn delete_removes_lines_with_their_break() {
        let mut merger = ChunkMerger::new("a\nb\nc\nd", "a\nd");
        let outcome = merger.accept_change(2, &[DiffChunk::new(2, 3, 2, 0)]);
        assert_eq!(outcome, AcceptOutcome::Applied);
        assert_eq!(merger.left().value(), "a\nd");
    }

    #[test]
    fn delete_of_last_line_clamps_to_end() {
        let mut merger = ChunkMerger::new("a\nb", "a");
        merger.accept_change(1, &[DiffChunk::new(2, 2, 1, 0)]);
        assert_eq!(merger.left().value(), "a\n");
    }

    #[test]
    fn line_outside_every_chunk_is_no_match() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        assert_eq!(
            merger.accept_change(3, &[replace_line_two()]),
            AcceptOutcome::NoMatch
        );
        assert_eq!(merger.accept_change(1, &[]), AcceptOutcome::NoMatch);
        assert!(merger.log().is_empty());
    }

    #[test]
    fn chunk_beyond_buffer_is_stale() {
        let mut merger = ChunkMerger::new("a", "a\nb\nc");
        assert_eq!(
            merger.accept_change(3, &[DiffChunk::new(5, 0, 3, 3)]),
            AcceptOutcome::Stale
        );
        assert_eq!(
            merger.accept_change(2, &[DiffChunk::new(2, 4, 2, 3)]),
            AcceptOutcome::Stale
        );
        assert_eq!(merger.left().value(), "a");
    }

    #[test]
    fn undo_after_accept_restores_both_buffers() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        merger.edit(BufferSide::Right, Range::caret(3, 2), "?");
        let right_before = merger.right().value().to_string();

        merger.accept_change(2, &[replace_line_two()]);
        let entry = merger.undo_last_operation().unwrap();

        assert!(matches!(entry, OperationLogEntry::AcceptChange { .. }));
        assert_eq!(merger.left().value(), "A\nB\nC");
        assert_eq!(merger.right().value(), right_before);
        assert_eq!(merger.log().len(), 1);
    }

    #[test]
    fn accept_entry_records_both_sides() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        merger.accept_change(2, &[replace_line_two()]);
        assert_eq!(
            merger.log().last(),
            Some(&OperationLogEntry::AcceptChange {
                original_range: Range::new(2, 1, 2, 2),
                original_text: "B".to_string(),
                modified_range: Range::new(2, 1, 2, 2),
                modified_text: "X".to_string(),
            })
        );
    }

    #[test]
    fn undo_after_plain_edit_touches_only_that_buffer() {
        let mut merger = ChunkMerger::new("left", "right");
        merger.edit(BufferSide::Right, Range::caret(1, 1), ">");
        merger.edit(BufferSide::Left, Range::caret(1, 5), "!");

        assert_eq!(
            merger.undo_last_operation(),
            Some(OperationLogEntry::RegularEdit {
                side: BufferSide::Left
            })
        );
        assert_eq!(merger.left().value(), "left");
        assert_eq!(merger.right().value(), ">right");
    }

    #[test]
    fn undo_walks_back_through_mixed_operations() {
        let mut merger = ChunkMerger::new("A\nB\nC", "A\nX\nC");
        merger.edit(BufferSide::Left, Range::caret(1, 2), "1");
        merger.accept_change(2, &[replace_line_two()]);
        merger.edit(BufferSide::Left, Range::caret(3, 2), "3");
        assert_eq!(merger.left().value(), "A1\nX\nC3");

        merger.undo_last_operation();
        assert_eq!(merger.left().value(), "A1\nX\nC");
        merger.undo_last_operation();
        assert_eq!(merger.left().value(), "A1\nB\nC");
        merger.undo_last_operation();
        assert_eq!(merger.left().value(), "A\nB\nC");
        assert_eq!(merger.right().value(), "A\nX\nC");
        assert!(merger.undo_last_operation().is_none());
    }

    #[test]
    fn undo_on_empty_log_is_noop() {
        let mut merger = ChunkMerger::new("a", "b");
        assert!(merger.undo_last_operation().is_none());
        assert_eq!(merger.left().value(), "a");
        assert_eq!(merger.right().value(), "b");
    }

    #[test]
    fn redo_is_not_logged() {
        let mut merger = ChunkMerger::new("a", "b");
        merger.edit(BufferSide::Left, Range::caret(1, 2), "c");
        merger.undo_last_operation();
        assert!(merger.redo(BufferSide::Left));
        assert_eq!(merger.left().value(), "ac");
        assert!(merger.log().is_empty());
    }

    #[test]
    fn load_resets_log() {
        let mut merger = ChunkMerger::new("a", "b");
        merger.edit(BufferSide::Left, Range::caret(1, 1), "x");
        merger.load("new left", "new right");
        assert!(merger.log().is_empty());
        assert!(merger.undo_last_operation().is_none());
        assert_eq!(merger.left().value(), "new left");
    }
}
