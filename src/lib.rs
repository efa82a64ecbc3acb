//! requote - text relocation engine
//!
//! Re-anchors verbatim quoted spans inside a live structured document
//! that may have been edited since the quote was taken.
//!
//! # Architecture
//!
//! The engine is a pure function per call:
//! - The document is flattened into one searchable string with a
//!   segment table mapping flat offsets to document coordinates
//! - An exact case-insensitive match is tried first; a bounded
//!   Levenshtein window search is the fallback
//! - A hit is translated back to document coordinates and selected;
//!   a miss is reported with a truncated echo of the lost text
//!
//! # Modules
//!
//! - `document`: Boundary traits and the block document implementation
//! - `engine`: Index, matcher, translator, and relocation orchestrator
//! - `watch`: File watcher for re-checking after edits
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Locate a quote in a document
//! requote locate draft.md "the quick brown fox"
//!
//! # Replace an exact occurrence and save
//! requote replace draft.md "old phrasing" "new phrasing" --write
//!
//! # Re-check on every edit
//! requote watch draft.md "the quick brown fox"
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod watch;

// Re-export main types at crate root for convenience
pub use document::{BlockDocument, DocRange, DocumentCommands, DocumentContent, TextRun};
pub use engine::{
    FlatIndex, MatchRange, MatcherLimits, RelocateOptions, RelocationResult, Relocator,
    ReplaceResult, Segment,
};
pub use watch::{DocumentChanged, DocumentWatcher, WatchConfig, WatchError};
