//! A block-structured document for CLI usage and tests.
//!
//! `BlockDocument` is a minimal host document: an ordered list of
//! paragraph blocks. Coordinate addressing follows the convention of
//! rich-text editors where structural boundaries consume address space:
//! each block contributes an opening position, one position per
//! character, and a closing position. A document of blocks "ab" and "c"
//! therefore has coordinate length 4 + 3 = 7, and the flat text "abc"
//! maps to coordinates 1, 2, and 5.
//!
//! Command semantics mirror a real editor host: selection and highlight
//! ranges are clamped into the document rather than rejected, and a
//! replacement spanning several blocks collapses the covered tail into
//! the block where the range starts.

use super::traits::{DocRange, DocumentCommands, DocumentContent, TemporaryHighlight, TextRun};

/// A single paragraph block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    text: String,
}

impl Block {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Highlight currently active on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHighlight {
    pub range: DocRange,
    pub duration_ms: u64,
}

/// An in-memory block-structured document.
#[derive(Debug, Clone, Default)]
pub struct BlockDocument {
    blocks: Vec<Block>,
    selection: Option<DocRange>,
    scrolled: bool,
    highlight: Option<ActiveHighlight>,
}

impl BlockDocument {
    /// Create a document from an ordered list of paragraph texts.
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocks: paragraphs.into_iter().map(Block::new).collect(),
            selection: None,
            scrolled: false,
            highlight: None,
        }
    }

    /// Parse plain text into a document, splitting blocks on blank lines.
    ///
    /// Interior newlines within a paragraph are preserved. Leading and
    /// trailing blank lines contribute no blocks.
    pub fn from_text(source: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current = String::new();

        for line in source.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(Block::new(std::mem::take(&mut current)));
                }
            } else {
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(line);
            }
        }
        if !current.is_empty() {
            blocks.push(Block::new(current));
        }

        Self {
            blocks,
            selection: None,
            scrolled: false,
            highlight: None,
        }
    }

    /// Render the document back to plain text, one blank line between blocks.
    pub fn to_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_text(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(|b| b.text.as_str())
    }

    /// The selection last issued by `select_range`, if any.
    pub fn selection(&self) -> Option<DocRange> {
        self.selection
    }

    /// Whether `scroll_into_view` has been issued.
    pub fn scrolled(&self) -> bool {
        self.scrolled
    }

    /// The highlight last issued, if any.
    pub fn active_highlight(&self) -> Option<ActiveHighlight> {
        self.highlight
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// Extract the text covered by a coordinate range.
    ///
    /// Structural positions inside the range contribute nothing; only
    /// characters of text runs that overlap the range are collected.
    pub fn slice(&self, range: DocRange) -> String {
        let mut out = String::new();
        let mut pos = 0usize;
        for block in &self.blocks {
            let len = block.char_len();
            let text_start = pos + 1;
            let text_end = text_start + len;
            let lo = range.from.max(text_start);
            let hi = range.to.min(text_end);
            if lo < hi {
                out.extend(block.text.chars().skip(lo - text_start).take(hi - lo));
            }
            pos = text_end + 1;
        }
        out
    }

    /// Map a coordinate position to (block index, char offset in block).
    ///
    /// Positions on structural boundaries clamp to the nearest text
    /// offset of the owning block; positions past the end clamp to the
    /// end of the last block.
    fn locate(&self, pos: usize) -> (usize, usize) {
        let mut start = 0usize;
        for (i, block) in self.blocks.iter().enumerate() {
            let len = block.char_len();
            let end = start + len + 2;
            if pos < end {
                let text_start = start + 1;
                return (i, pos.saturating_sub(text_start).min(len));
            }
            start = end;
        }
        let last = self.blocks.len().saturating_sub(1);
        let len = self.blocks.last().map(|b| b.char_len()).unwrap_or(0);
        (last, len)
    }

    fn clamp(&self, range: DocRange) -> DocRange {
        let max = self.coordinate_len();
        let from = range.from.min(max);
        let to = range.to.min(max).max(from);
        DocRange { from, to }
    }
}

/// Replace the char range `[from, to)` of `s` with `replacement`.
fn splice_chars(s: &str, from: usize, to: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(s.len() + replacement.len());
    out.extend(s.chars().take(from));
    out.push_str(replacement);
    out.extend(s.chars().skip(to));
    out
}

impl DocumentContent for BlockDocument {
    fn coordinate_len(&self) -> usize {
        self.blocks.iter().map(|b| b.char_len() + 2).sum()
    }

    fn text_runs(&self) -> Box<dyn Iterator<Item = TextRun<'_>> + '_> {
        let mut pos = 0usize;
        Box::new(self.blocks.iter().map(move |block| {
            let run = TextRun {
                position: pos + 1,
                text: block.text.as_str(),
            };
            pos += block.char_len() + 2;
            run
        }))
    }
}

impl DocumentCommands for BlockDocument {
    fn select_range(&mut self, range: DocRange) {
        self.selection = Some(self.clamp(range));
        self.scrolled = false;
    }

    fn scroll_into_view(&mut self) {
        self.scrolled = true;
    }

    fn insert_content_at(&mut self, range: DocRange, replacement: &str) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(replacement));
            return;
        }

        let range = self.clamp(range);
        let (bi, off_from) = self.locate(range.from);
        let (bj, off_to) = self.locate(range.to);

        if bi == bj {
            let text = &self.blocks[bi].text;
            self.blocks[bi].text = splice_chars(text, off_from, off_to, replacement);
        } else {
            // Collapse the covered blocks into the one where the range starts.
            let prefix: String = self.blocks[bi].text.chars().take(off_from).collect();
            let suffix: String = self.blocks[bj].text.chars().skip(off_to).collect();
            self.blocks[bi].text = format!("{}{}{}", prefix, replacement, suffix);
            self.blocks.drain(bi + 1..=bj);
        }
    }

    fn highlighter(&mut self) -> Option<&mut dyn TemporaryHighlight> {
        Some(self)
    }
}

impl TemporaryHighlight for BlockDocument {
    fn set_temporary_highlight(&mut self, range: DocRange, duration_ms: u64) {
        self.highlight = Some(ActiveHighlight {
            range: self.clamp(range),
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_len() {
        let doc = BlockDocument::from_paragraphs(["ab", "c"]);
        assert_eq!(doc.coordinate_len(), 7);

        let empty = BlockDocument::from_paragraphs(Vec::<String>::new());
        assert_eq!(empty.coordinate_len(), 0);
    }

    #[test]
    fn test_text_runs_positions() {
        let doc = BlockDocument::from_paragraphs(["ab", "c"]);
        let runs: Vec<(usize, String)> = doc
            .text_runs()
            .map(|r| (r.position, r.text.to_string()))
            .collect();
        assert_eq!(runs, vec![(1, "ab".to_string()), (5, "c".to_string())]);
    }

    #[test]
    fn test_from_text_splits_on_blank_lines() {
        let doc = BlockDocument::from_text("first paragraph\n\nsecond\nstill second\n\n\nthird\n");
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.block_text(0), Some("first paragraph"));
        assert_eq!(doc.block_text(1), Some("second\nstill second"));
        assert_eq!(doc.block_text(2), Some("third"));
    }

    #[test]
    fn test_slice_skips_structural_positions() {
        let doc = BlockDocument::from_paragraphs(["ab", "cd"]);
        // Runs at 1..3 and 5..7; a range across the block boundary picks
        // up only the characters.
        assert_eq!(doc.slice(DocRange::new(2, 6)), "bc");
        assert_eq!(doc.slice(DocRange::new(1, 3)), "ab");
    }

    #[test]
    fn test_replace_within_block() {
        let mut doc = BlockDocument::from_paragraphs(["hello world"]);
        doc.insert_content_at(DocRange::new(7, 12), "there");
        assert_eq!(doc.block_text(0), Some("hello there"));
    }

    #[test]
    fn test_replace_across_blocks_collapses() {
        let mut doc = BlockDocument::from_paragraphs(["one two", "three four"]);
        // "two" starts at coordinate 5; "three" ends at coordinate 15.
        doc.insert_content_at(DocRange::new(5, 15), "2 3");
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.block_text(0), Some("one 2 3 four"));
    }

    #[test]
    fn test_selection_and_highlight_clamped() {
        let mut doc = BlockDocument::from_paragraphs(["abc"]);
        doc.select_range(DocRange::new(2, 99));
        assert_eq!(doc.selection(), Some(DocRange::new(2, 5)));

        doc.set_temporary_highlight(DocRange::new(50, 99), 1500);
        let hl = doc.active_highlight().unwrap();
        assert_eq!(hl.range, DocRange::new(5, 5));
        assert_eq!(hl.duration_ms, 1500);
    }

    #[test]
    fn test_round_trip_text() {
        let source = "alpha\n\nbeta gamma";
        let doc = BlockDocument::from_text(source);
        assert_eq!(doc.to_text(), source);
    }
}
