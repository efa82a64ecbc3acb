//! Reporting context around a located span.
//!
//! Once a span is found in the flat text, callers presenting the result
//! (the CLI, logs) want more than two offsets: a short excerpt around
//! the span, a line and column for orientation, and a fingerprint of
//! the matched slice so later drift can be detected by comparison.
//! All offsets here are flat-text char offsets.

use sha2::{Digest, Sha256};

/// Line and column position (1-indexed for editor compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Convert a flat char offset to a line/column position.
///
/// Line and column are 1-indexed for editor compatibility.
pub fn offset_to_line_col(text: &str, offset: usize) -> LineCol {
    let mut line = 1;
    let mut col = 1;
    for c in text.chars().take(offset) {
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    LineCol { line, col }
}

/// Extract anchor text around a span.
///
/// Returns roughly `window` chars of context centered on the span, with
/// ellipses marking truncation on either side.
///
/// # Arguments
/// * `text` - The flat text the span was located in
/// * `start` - Span start char offset
/// * `end` - Span end char offset
/// * `window` - Total chars of context to aim for
pub fn anchor_text(text: &str, start: usize, end: usize, window: usize) -> String {
    let total = text.chars().count();
    let end = end.min(total);
    let start = start.min(end);

    let span_len = end - start;
    let each_side = window.saturating_sub(span_len) / 2;

    let anchor_start = start.saturating_sub(each_side);
    let anchor_end = (end + each_side).min(total);

    let excerpt: String = text
        .chars()
        .skip(anchor_start)
        .take(anchor_end - anchor_start)
        .collect();

    let prefix = if anchor_start > 0 { "..." } else { "" };
    let suffix = if anchor_end < total { "..." } else { "" };

    format!("{}{}{}", prefix, excerpt, suffix)
}

/// Compute a fingerprint of the slice `[start, end)` of the flat text.
///
/// Returns a hex SHA256 in the format "sha256:abc123...". Comparing
/// fingerprints across relocation calls reveals whether the located
/// text itself has drifted between them.
pub fn slice_fingerprint(text: &str, start: usize, end: usize) -> String {
    let slice: String = text
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(slice.as_bytes());
    let digest = hasher.finalize();
    format!("sha256:{}", hex::encode(digest))
}
