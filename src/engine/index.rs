//! Flat text index over a structured document.
//!
//! Searching happens in a single concatenated string, but the result
//! must land back in document coordinates. The index records, per leaf
//! text run, where the run's text sits in the flat string and where the
//! run starts in the document, so offsets can be translated in both
//! directions.
//!
//! # Design Decisions
//!
//! - **Char offsets**: all flat offsets count characters, not bytes.
//!   Windowed fuzzy search slices the flat text at arbitrary offsets
//!   and must never split a UTF-8 sequence.
//! - **Built fresh per call**: the document may change between
//!   relocation calls, so an index is never cached or shared. Positions
//!   are only valid against the snapshot the index was built from.
//! - **Empty runs are skipped**: they contribute no searchable text and
//!   would create zero-width segments.

use crate::document::DocumentContent;

/// One leaf text run's mapping between flat offsets and a document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Document coordinate position of the run's first character.
    pub document_position: usize,
    /// Offset of the run's first character in the flat text.
    pub flat_start: usize,
    /// Offset one past the run's last character in the flat text.
    pub flat_end: usize,
}

impl Segment {
    /// Length of the run in characters.
    pub fn run_len(&self) -> usize {
        self.flat_end - self.flat_start
    }
}

/// The flattened text of a document plus its segment table.
///
/// Segments are contiguous, strictly increasing in `flat_start`, and
/// the last segment's `flat_end` equals the char length of `text`.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    /// Concatenation of every non-empty leaf text run, in document order.
    pub text: String,
    /// Ordered, non-overlapping run mappings.
    pub segments: Vec<Segment>,
}

impl FlatIndex {
    /// Build an index by walking a document's leaf text runs once.
    ///
    /// An empty document yields an empty text and no segments.
    pub fn build(content: &impl DocumentContent) -> Self {
        let mut text = String::new();
        let mut segments = Vec::new();
        let mut offset = 0usize;

        for run in content.text_runs() {
            if run.text.is_empty() {
                continue;
            }
            let run_len = run.text.chars().count();
            text.push_str(run.text);
            segments.push(Segment {
                document_position: run.position,
                flat_start: offset,
                flat_end: offset + run_len,
            });
            offset += run_len;
        }

        Self { text, segments }
    }

    /// Total char length of the flat text.
    pub fn flat_len(&self) -> usize {
        self.segments.last().map(|s| s.flat_end).unwrap_or(0)
    }

    /// Translate a flat-text offset to a document coordinate position.
    ///
    /// An offset equal to the flat length translates to the position
    /// immediately after the last character, so a match ending exactly
    /// at end-of-document still resolves. Offsets past the end, or any
    /// offset against an empty index, yield `None`.
    pub fn to_position(&self, offset: usize) -> Option<usize> {
        let last = self.segments.last()?;
        let total = last.flat_end;

        if offset > total {
            return None;
        }
        if offset == total {
            return Some(last.document_position + last.run_len());
        }

        // Segments are sorted by flat_start, so the owner is the first
        // segment whose flat_end exceeds the offset.
        let idx = self.segments.partition_point(|s| s.flat_end <= offset);
        let segment = &self.segments[idx];
        Some(segment.document_position + (offset - segment.flat_start))
    }

    /// Translate a document coordinate position back to a flat offset.
    ///
    /// The inverse of [`to_position`](Self::to_position) for positions
    /// that fall inside (or immediately after) a text run. Positions on
    /// structural boundaries have no flat counterpart and yield `None`.
    pub fn to_flat_offset(&self, position: usize) -> Option<usize> {
        for segment in &self.segments {
            let run_end = segment.document_position + segment.run_len();
            if position >= segment.document_position && position <= run_end {
                return Some(segment.flat_start + (position - segment.document_position));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockDocument;

    #[test]
    fn test_build_skips_empty_runs() {
        let doc = BlockDocument::from_paragraphs(["ab", "", "cd"]);
        let index = FlatIndex::build(&doc);
        assert_eq!(index.text, "abcd");
        assert_eq!(index.segments.len(), 2);
        assert_eq!(index.segments[0].flat_start, 0);
        assert_eq!(index.segments[0].flat_end, 2);
        assert_eq!(index.segments[1].flat_start, 2);
        assert_eq!(index.segments[1].flat_end, 4);
    }

    #[test]
    fn test_build_empty_document() {
        let doc = BlockDocument::from_paragraphs(Vec::<String>::new());
        let index = FlatIndex::build(&doc);
        assert_eq!(index.text, "");
        assert!(index.segments.is_empty());
        assert_eq!(index.flat_len(), 0);
    }

    #[test]
    fn test_segments_are_contiguous() {
        let doc = BlockDocument::from_paragraphs(["one", "two", "three"]);
        let index = FlatIndex::build(&doc);
        for pair in index.segments.windows(2) {
            assert_eq!(pair[0].flat_end, pair[1].flat_start);
        }
        assert_eq!(index.segments.last().unwrap().flat_end, index.flat_len());
    }

    #[test]
    fn test_to_position_within_runs() {
        // Runs "ab" at position 1 and "cd" at position 5.
        let doc = BlockDocument::from_paragraphs(["ab", "cd"]);
        let index = FlatIndex::build(&doc);

        assert_eq!(index.to_position(0), Some(1));
        assert_eq!(index.to_position(1), Some(2));
        assert_eq!(index.to_position(2), Some(5));
        assert_eq!(index.to_position(3), Some(6));
    }

    #[test]
    fn test_to_position_end_of_text() {
        let doc = BlockDocument::from_paragraphs(["ab", "cd"]);
        let index = FlatIndex::build(&doc);
        // One past the last character of the last run.
        assert_eq!(index.to_position(4), Some(7));
    }

    #[test]
    fn test_to_position_out_of_bounds() {
        let doc = BlockDocument::from_paragraphs(["ab"]);
        let index = FlatIndex::build(&doc);
        assert_eq!(index.to_position(3), None);

        let empty = FlatIndex::build(&BlockDocument::from_paragraphs(Vec::<String>::new()));
        assert_eq!(empty.to_position(0), None);
    }

    #[test]
    fn test_to_flat_offset_round_trip() {
        let doc = BlockDocument::from_paragraphs(["ab", "cd"]);
        let index = FlatIndex::build(&doc);
        for offset in 0..=index.flat_len() {
            let position = index.to_position(offset).unwrap();
            assert_eq!(index.to_flat_offset(position), Some(offset));
        }
    }

    #[test]
    fn test_to_flat_offset_structural_gap() {
        let doc = BlockDocument::from_paragraphs(["ab", "cd"]);
        let index = FlatIndex::build(&doc);
        // Coordinate 4 is the second block's opening marker.
        assert_eq!(index.to_flat_offset(4), None);
        assert_eq!(index.to_flat_offset(0), None);
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let doc = BlockDocument::from_paragraphs(["héllo", "wörld"]);
        let index = FlatIndex::build(&doc);
        assert_eq!(index.flat_len(), 10);
        // 'ö' is flat offset 6, the second character of the run starting
        // at coordinate 8.
        assert_eq!(index.to_position(6), Some(9));
    }
}
