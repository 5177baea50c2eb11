//! Line/column addressed text buffer with an undo history.
//!
//! Lines and columns are 1-based and columns count characters, not bytes.
//! Every position handed to the buffer is clamped to its current bounds.

use std::fmt;

/// A position in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, in characters.
    pub column: u32,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span between two positions; `start` may equal `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Range {
    /// Creates a range from line/column pairs.
    #[must_use]
    pub const fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    /// An empty range at `position`.
    #[must_use]
    pub const fn caret(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// A change notification emitted after the buffer content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// Replaced range, in coordinates before the change.
    pub range: Range,
    /// Inserted text.
    pub text: String,
    /// The change was produced by [`TextBuffer::undo`].
    pub is_undoing: bool,
    /// The change was produced by [`TextBuffer::redo`].
    pub is_redoing: bool,
}

/// A replacement expressed in byte offsets, invertible for undo.
#[derive(Debug, Clone)]
struct AppliedEdit {
    offset: usize,
    removed: String,
    inserted: String,
}

/// One undo step. An empty step is a checkpoint that undoes to nothing.
#[derive(Debug, Clone, Default)]
struct UndoStep {
    edits: Vec<AppliedEdit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    User,
    Undo,
    Redo,
}

/// Editable text with atomic undo steps and change notifications.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    undo_stack: Vec<UndoStep>,
    redo_stack: Vec<UndoStep>,
    changes: Vec<ContentChange>,
}

impl TextBuffer {
    /// Creates a buffer holding `text` with an empty history.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// The whole content.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Replaces the whole content and forgets the history.
    pub fn set_value(&mut self, text: impl Into<String>) {
        let end = self.end_position();
        let text = text.into();
        self.changes.push(ContentChange {
            range: Range {
                start: Position::new(1, 1),
                end,
            },
            text: text.clone(),
            is_undoing: false,
            is_redoing: false,
        });
        self.text = text;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Number of lines; 0 for an empty buffer.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        if self.text.is_empty() {
            return 0;
        }
        saturating_u32(self.text.matches('\n').count() + 1)
    }

    /// Column just past the last character of `line` (clamped).
    #[must_use]
    pub fn line_max_column(&self, line: u32) -> u32 {
        let Some((start, end)) = self.line_span(line) else {
            return 1;
        };
        saturating_u32(self.text[start..end].chars().count() + 1)
    }

    /// Text inside `range`, after clamping.
    #[must_use]
    pub fn value_in_range(&self, range: Range) -> &str {
        let (start, end) = self.offsets(range);
        &self.text[start..end]
    }

    /// Clamps a position to the buffer bounds. Lines past the end clamp to
    /// the end of the buffer.
    #[must_use]
    pub fn clamp_position(&self, position: Position) -> Position {
        let count = self.line_count();
        if count == 0 {
            return Position::new(1, 1);
        }
        if position.line < 1 {
            return Position::new(1, 1);
        }
        if position.line > count {
            return Position::new(count, self.line_max_column(count));
        }
        let column = position.column.clamp(1, self.line_max_column(position.line));
        Position::new(position.line, column)
    }

    /// Applies one edit as its own undo step.
    ///
    /// Returns false, recording nothing, when the edit would not change the
    /// content.
    pub fn push_edit(&mut self, range: Range, text: &str) -> bool {
        let (start, end) = self.offsets(range);
        if self.text[start..end] == *text {
            return false;
        }
        let edit = self.replace(start, end, text, Origin::User);
        self.undo_stack.push(UndoStep { edits: vec![edit] });
        self.redo_stack.clear();
        true
    }

    /// Pushes an undo step that changes nothing, so the next undo on this
    /// buffer is consumed without touching the text.
    pub fn push_checkpoint(&mut self) {
        self.undo_stack.push(UndoStep::default());
        self.redo_stack.clear();
    }

    /// Reverts the most recent undo step. Returns false if there is none.
    pub fn undo(&mut self) -> bool {
        let Some(step) = self.undo_stack.pop() else {
            return false;
        };
        let mut redo = UndoStep::default();
        for edit in step.edits.iter().rev() {
            let end = edit.offset + edit.inserted.len();
            redo.edits
                .push(self.replace(edit.offset, end, &edit.removed, Origin::Undo));
        }
        redo.edits.reverse();
        self.redo_stack.push(redo);
        true
    }

    /// Reapplies the most recently undone step. Returns false if there is none.
    pub fn redo(&mut self) -> bool {
        let Some(step) = self.redo_stack.pop() else {
            return false;
        };
        let mut undo = UndoStep::default();
        for edit in step.edits.iter().rev() {
            let end = edit.offset + edit.inserted.len();
            undo.edits
                .push(self.replace(edit.offset, end, &edit.removed, Origin::Redo));
        }
        undo.edits.reverse();
        self.undo_stack.push(undo);
        true
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Takes the change notifications emitted since the last call.
    pub fn drain_changes(&mut self) -> Vec<ContentChange> {
        std::mem::take(&mut self.changes)
    }

    fn replace(&mut self, start: usize, end: usize, text: &str, origin: Origin) -> AppliedEdit {
        let range = Range {
            start: self.position_at(start),
            end: self.position_at(end),
        };
        let removed = self.text[start..end].to_string();
        self.text.replace_range(start..end, text);
        self.changes.push(ContentChange {
            range,
            text: text.to_string(),
            is_undoing: origin == Origin::Undo,
            is_redoing: origin == Origin::Redo,
        });
        AppliedEdit {
            offset: start,
            removed,
            inserted: text.to_string(),
        }
    }

    fn end_position(&self) -> Position {
        let count = self.line_count().max(1);
        Position::new(count, self.line_max_column(count))
    }

    /// Byte span of `line` without its line break, after clamping the line.
    fn line_span(&self, line: u32) -> Option<(usize, usize)> {
        let count = self.line_count();
        if count == 0 {
            return None;
        }
        let target = line.clamp(1, count) as usize;
        let start = if target == 1 {
            0
        } else {
            self.text
                .match_indices('\n')
                .nth(target - 2)
                .map_or(self.text.len(), |(i, _)| i + 1)
        };
        let end = self.text[start..]
            .find('\n')
            .map_or(self.text.len(), |i| start + i);
        Some((start, end))
    }

    fn offset_at(&self, position: Position) -> usize {
        let clamped = self.clamp_position(position);
        let Some((start, end)) = self.line_span(clamped.line) else {
            return 0;
        };
        let skip = (clamped.column - 1) as usize;
        self.text[start..end]
            .char_indices()
            .nth(skip)
            .map_or(end, |(i, _)| start + i)
    }

    fn offsets(&self, range: Range) -> (usize, usize) {
        let a = self.offset_at(range.start);
        let b = self.offset_at(range.end);
        if a <= b { (a, b) } else { (b, a) }
    }

    fn position_at(&self, offset: usize) -> Position {
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Position::new(saturating_u32(line), saturating_u32(column))
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
