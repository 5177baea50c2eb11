//! Diff chunks as produced by the viewer's diff computation.

use serde::{Deserialize, Serialize};

/// One contiguous change between the left (original) and right (modified)
/// texts.
///
/// Line numbers are 1-based. An end line of 0 marks an empty side: a pure
/// insert has `original_end_line_number == 0` and its
/// `original_start_line_number` is the anchor line the text goes after
/// (0 for the top of the file); a pure delete has
/// `modified_end_line_number == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffChunk {
    /// First original line, or the anchor line for an insert.
    pub original_start_line_number: u32,
    /// Last original line, 0 if the original side is empty.
    pub original_end_line_number: u32,
    /// First modified line.
    pub modified_start_line_number: u32,
    /// Last modified line, 0 if the modified side is empty.
    pub modified_end_line_number: u32,
}

impl DiffChunk {
    /// Creates a chunk from its four line numbers.
    #[must_use]
    pub const fn new(
        original_start_line_number: u32,
        original_end_line_number: u32,
        modified_start_line_number: u32,
        modified_end_line_number: u32,
    ) -> Self {
        Self {
            original_start_line_number,
            original_end_line_number,
            modified_start_line_number,
            modified_end_line_number,
        }
    }

    /// The original side is empty.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        self.original_end_line_number == 0
    }

    /// The modified side is empty.
    #[must_use]
    pub const fn is_delete(&self) -> bool {
        self.modified_end_line_number == 0
    }

    /// Whether `line` on the modified side falls inside this chunk. A pure
    /// delete covers only its start line.
    #[must_use]
    pub fn contains_modified_line(&self, line: u32) -> bool {
        let end = if self.is_delete() {
            self.modified_start_line_number
        } else {
            self.modified_end_line_number
        };
        (self.modified_start_line_number..=end).contains(&line)
    }
}

/// The first chunk, in list order, covering `line` on the modified side.
#[must_use]
pub fn find_chunk_for_line(line: u32, chunks: &[DiffChunk]) -> Option<&DiffChunk> {
    chunks.iter().find(|chunk| chunk.contains_modified_line(line))
}
