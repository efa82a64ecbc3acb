//! The text relocation engine.
//!
//! Given a quote taken from a document at some earlier time and the
//! live document it came from, find the best surviving occurrence of
//! the quote, or declare an honest miss. The document may have drifted
//! since the quote was taken: retyped words, added punctuation,
//! reflowed paragraphs.
//!
//! # Design Principles
//!
//! - **Never the wrong text**: a deterministic leftmost match within a
//!   bounded edit tolerance, or a miss with an explanation. The engine
//!   never guesses beyond its tolerance.
//! - **Fresh index per call**: the flat text index is rebuilt from the
//!   live document on every call, so stale offsets cannot exist.
//! - **Synchronous and stateless**: no I/O, no locks, no shared state.
//!   Callers may invoke it from async contexts freely.
//!
//! # Example
//!
//! ```
//! use requote::document::BlockDocument;
//! use requote::engine::Relocator;
//!
//! let mut doc = BlockDocument::from_paragraphs(["This is a TEST document with some content."]);
//! let result = Relocator::new().relocate(&mut doc, "test document");
//!
//! assert!(result.found());
//! let range = result.range().unwrap();
//! assert_eq!(doc.slice(range).to_lowercase(), "test document");
//! ```

pub mod anchor;
pub mod index;
pub mod matcher;
pub mod relocate;

pub use anchor::{anchor_text, offset_to_line_col, slice_fingerprint, LineCol};
pub use index::{FlatIndex, Segment};
pub use matcher::{exact_match, fuzzy_match, fold_case, MatchRange, MatcherLimits};
pub use relocate::{RelocateOptions, RelocationResult, Relocator, ReplaceResult};
