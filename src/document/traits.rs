//! Boundary traits between the relocation engine and a host document.
//!
//! The engine never owns a document. It consumes two narrow interfaces:
//! a read side that yields leaf text runs in order, and a command side
//! for selection, scrolling, highlighting, and content replacement.
//! Any editor or document model can participate by implementing these.

use serde::{Deserialize, Serialize};

/// A half-open range in document coordinate space.
///
/// Document coordinates are distinct from flat-text offsets because
/// structural boundaries (block open/close markers) consume address
/// space of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRange {
    pub from: usize,
    pub to: usize,
}

impl DocRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// One leaf text run yielded by document traversal.
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    /// Document coordinate position of the run's first character.
    pub position: usize,
    /// The run's text content.
    pub text: &'a str,
}

/// Read access to a document's text content.
///
/// The traversal must be total: every leaf text run appears exactly
/// once, in document order, with no overlaps.
pub trait DocumentContent {
    /// Total length of the document in coordinate space.
    fn coordinate_len(&self) -> usize;

    /// Iterate every leaf text run in document order.
    fn text_runs(&self) -> Box<dyn Iterator<Item = TextRun<'_>> + '_>;
}

/// Transient highlight support.
///
/// Modeled as a separate capability because not every document host
/// implements highlighting. Hosts without it return `None` from
/// [`DocumentCommands::highlighter`] and the engine skips the call.
pub trait TemporaryHighlight {
    /// Highlight a range for `duration_ms`, replacing any active highlight.
    fn set_temporary_highlight(&mut self, range: DocRange, duration_ms: u64);
}

/// Commands the engine issues against a document once a range is chosen.
pub trait DocumentCommands {
    /// Select the given coordinate range.
    fn select_range(&mut self, range: DocRange);

    /// Scroll the current selection into view.
    fn scroll_into_view(&mut self);

    /// Replace the content of a coordinate range with plain text.
    fn insert_content_at(&mut self, range: DocRange, replacement: &str);

    /// Optional transient-highlight capability.
    fn highlighter(&mut self) -> Option<&mut dyn TemporaryHighlight> {
        None
    }
}
