//! Jumping between chunks on the modified side.

use crate::chunk::DiffChunk;

/// Start line of the first chunk that begins after `line`.
#[must_use]
pub fn next_change(line: u32, chunks: &[DiffChunk]) -> Option<u32> {
    chunks
        .iter()
        .map(|chunk| chunk.modified_start_line_number)
        .find(|&start| start > line)
}

/// Start line of the last chunk that begins before `line`.
#[must_use]
pub fn previous_change(line: u32, chunks: &[DiffChunk]) -> Option<u32> {
    chunks
        .iter()
        .rev()
        .map(|chunk| chunk.modified_start_line_number)
        .find(|&start| start < line)
}
