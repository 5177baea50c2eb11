//! Smooths over line-break noise between the two sides before diffing.

/// Adjusts `right` so that incidental line-break differences from `left` do
/// not show up as chunks.
///
/// A leading line break on the right is dropped when the left has none, and
/// when the trailing line-break counts differ by exactly one the right takes
/// the left's count. If either side is empty `right` is returned unchanged.
#[must_use]
pub fn normalize_content(left: &str, right: &str) -> String {
    if left.is_empty() || right.is_empty() {
        return right.to_string();
    }

    let mut right = match right.strip_prefix('\n') {
        Some(rest) if !left.starts_with('\n') => rest,
        _ => right,
    };

    let left_trailing = trailing_newlines(left);
    let right_trailing = trailing_newlines(right);
    if left_trailing.abs_diff(right_trailing) != 1 {
        return right.to_string();
    }

    right = right.trim_end_matches('\n');
    let mut out = String::with_capacity(right.len() + left_trailing);
    out.push_str(right);
    out.extend(std::iter::repeat_n('\n', left_trailing));
    out
}

fn trailing_newlines(text: &str) -> usize {
    text.len() - text.trim_end_matches('\n').len()
}
