//! Relocation orchestrator.
//!
//! Wires the indexer, matcher, and translator together: build a fresh
//! index, try the exact match, fall back to fuzzy, translate the flat
//! offsets into document coordinates, and issue the selection, scroll,
//! and highlight commands. A miss is a normal outcome carried in the
//! result value, never an error.
//!
//! # Design Principles
//!
//! - **Honest misses**: the engine never selects or highlights a range
//!   it is not sure about. A fuzzy hit whose offsets fail to translate
//!   is demoted to a miss rather than surfaced as a different range.
//! - **No state across calls**: every call rebuilds the index from the
//!   live document, so a stale snapshot can never produce positions.
//! - **Replacement is exact-only**: silently rewriting nearby text that
//!   merely resembles the target is worse than refusing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::document::{DocRange, DocumentCommands, DocumentContent};

use super::index::FlatIndex;
use super::matcher::{self, MatchRange, MatcherLimits};

/// Warning issued when the query is empty or all whitespace.
const NO_TEXT_WARNING: &str = "No text to locate.";

/// Longest prefix of the original text echoed in a miss warning.
const WARNING_PREVIEW_CHARS: usize = 45;

/// Default transient highlight duration in milliseconds.
const DEFAULT_HIGHLIGHT_MS: u64 = 2000;

/// Options controlling relocation behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocateOptions {
    /// Fuzzy matching tolerances
    #[serde(default)]
    pub limits: MatcherLimits,

    /// Transient highlight duration (default: 2000 ms)
    #[serde(default = "default_highlight_ms")]
    pub highlight_duration_ms: u64,
}

fn default_highlight_ms() -> u64 {
    DEFAULT_HIGHLIGHT_MS
}

impl Default for RelocateOptions {
    fn default() -> Self {
        Self {
            limits: MatcherLimits::default(),
            highlight_duration_ms: DEFAULT_HIGHLIGHT_MS,
        }
    }
}

/// Outcome of a relocation attempt.
///
/// A found range and a miss warning are mutually exclusive by
/// construction; there is no state where both or neither exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationResult {
    /// The text survived; the document range it occupies now.
    Found { range: DocRange },
    /// The text could not be located; a user-safe explanation.
    NotFound { warning: String },
}

impl RelocationResult {
    pub fn found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn range(&self) -> Option<DocRange> {
        match self {
            Self::Found { range } => Some(*range),
            Self::NotFound { .. } => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Found { .. } => None,
            Self::NotFound { warning } => Some(warning),
        }
    }
}

/// Outcome of an exact-match replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceResult {
    /// The original text was found and replaced at this range.
    Replaced { range: DocRange },
    /// No exact occurrence of the original text exists; nothing changed.
    NotFound,
}

impl ReplaceResult {
    pub fn replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }

    pub fn range(&self) -> Option<DocRange> {
        match self {
            Self::Replaced { range } => Some(*range),
            Self::NotFound => None,
        }
    }
}

/// The relocation engine's entry point.
pub struct Relocator {
    options: RelocateOptions,
}

impl Default for Relocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Relocator {
    /// Create a relocator with default options.
    pub fn new() -> Self {
        Self {
            options: RelocateOptions::default(),
        }
    }

    /// Create a relocator with custom options.
    pub fn with_options(options: RelocateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RelocateOptions {
        &self.options
    }

    /// Locate `original_text` in the document and select it.
    ///
    /// Tries the exact case-insensitive match first, then the fuzzy
    /// fallback. On success the range is selected, scrolled into view,
    /// and transiently highlighted. On a miss the result carries a
    /// warning with a truncated echo of the text that was not found.
    #[instrument(skip_all, fields(query_chars = original_text.chars().count()))]
    pub fn relocate<D>(&self, document: &mut D, original_text: &str) -> RelocationResult
    where
        D: DocumentContent + DocumentCommands,
    {
        if original_text.trim().is_empty() {
            return RelocationResult::NotFound {
                warning: NO_TEXT_WARNING.to_string(),
            };
        }

        let index = FlatIndex::build(document);
        debug!(
            segments = index.segments.len(),
            flat_chars = index.flat_len(),
            "Built text index"
        );

        if let Some(hit) = matcher::exact_match(&index.text, original_text) {
            match self.translate(&index, hit) {
                Some(range) => {
                    info!(from = range.from, to = range.to, method = "exact", "Relocated text");
                    self.apply_side_effects(document, range);
                    return RelocationResult::Found { range };
                }
                None => {
                    // Should be unreachable: an exact hit lies within the
                    // index it was found in.
                    warn!(hit.from, hit.to, "Exact match failed to translate");
                }
            }
        }

        if let Some(hit) = matcher::fuzzy_match(&index.text, original_text, &self.options.limits) {
            match self.translate(&index, hit) {
                Some(range) => {
                    info!(from = range.from, to = range.to, method = "fuzzy", "Relocated text");
                    self.apply_side_effects(document, range);
                    return RelocationResult::Found { range };
                }
                None => {
                    warn!(hit.from, hit.to, "Fuzzy match failed to translate, demoting to miss");
                }
            }
        }

        debug!("No surviving occurrence found");
        RelocationResult::NotFound {
            warning: missed_warning(original_text),
        }
    }

    /// Exact-only location without side effects.
    ///
    /// This is the shared primitive behind both `relocate`'s first stage
    /// and `replace_exact`. Returns the document range of the leftmost
    /// case-insensitive occurrence, or `None`.
    pub fn find_exact_range<D>(&self, document: &D, original_text: &str) -> Option<DocRange>
    where
        D: DocumentContent,
    {
        if original_text.trim().is_empty() {
            return None;
        }
        let index = FlatIndex::build(document);
        let hit = matcher::exact_match(&index.text, original_text)?;
        self.translate(&index, hit)
    }

    /// Replace the exact occurrence of `original_text` with `replacement`.
    ///
    /// Deliberately refuses to fall back to fuzzy matching: rewriting
    /// the wrong nearby text would be worse than doing nothing.
    #[instrument(skip_all, fields(query_chars = original_text.chars().count()))]
    pub fn replace_exact<D>(
        &self,
        document: &mut D,
        original_text: &str,
        replacement: &str,
    ) -> ReplaceResult
    where
        D: DocumentContent + DocumentCommands,
    {
        match self.find_exact_range(document, original_text) {
            Some(range) => {
                info!(from = range.from, to = range.to, "Replacing located text");
                document.insert_content_at(range, replacement);
                ReplaceResult::Replaced { range }
            }
            None => {
                debug!("No exact occurrence to replace");
                ReplaceResult::NotFound
            }
        }
    }

    /// Translate both endpoints of a flat match through the same index.
    fn translate(&self, index: &FlatIndex, hit: MatchRange) -> Option<DocRange> {
        let from = index.to_position(hit.from)?;
        let to = index.to_position(hit.to)?;
        Some(DocRange { from, to })
    }

    fn apply_side_effects<D: DocumentCommands>(&self, document: &mut D, range: DocRange) {
        document.select_range(range);
        document.scroll_into_view();
        if let Some(highlighter) = document.highlighter() {
            highlighter.set_temporary_highlight(range, self.options.highlight_duration_ms);
        }
    }
}

/// Format the user-facing warning for a relocation miss.
///
/// The original text is echoed truncated to 45 chars with a trailing
/// ellipsis so the warning stays readable for long quotes.
fn missed_warning(original_text: &str) -> String {
    let truncated = if original_text.chars().count() > WARNING_PREVIEW_CHARS {
        let prefix: String = original_text.chars().take(WARNING_PREVIEW_CHARS).collect();
        format!("{}...", prefix)
    } else {
        original_text.to_string()
    };
    format!(
        "Text may have changed since the check. Original: \"{}\"",
        truncated
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missed_warning_short_text_verbatim() {
        let w = missed_warning("missing text");
        assert_eq!(
            w,
            "Text may have changed since the check. Original: \"missing text\""
        );
        assert!(!w.contains("..."));
    }

    #[test]
    fn test_missed_warning_truncates_at_45() {
        let long = "A".repeat(100);
        let w = missed_warning(&long);
        assert!(w.contains(&format!("{}...", "A".repeat(45))));
        assert!(!w.contains(&"A".repeat(46)));
    }

    #[test]
    fn test_missed_warning_exactly_45_no_ellipsis() {
        let text = "B".repeat(45);
        let w = missed_warning(&text);
        assert!(w.contains(&text));
        assert!(!w.contains("..."));
    }

    #[test]
    fn test_result_accessors_exclusive() {
        let found = RelocationResult::Found {
            range: DocRange::new(1, 4),
        };
        assert!(found.found());
        assert_eq!(found.range(), Some(DocRange::new(1, 4)));
        assert_eq!(found.warning(), None);

        let miss = RelocationResult::NotFound {
            warning: "gone".to_string(),
        };
        assert!(!miss.found());
        assert_eq!(miss.range(), None);
        assert_eq!(miss.warning(), Some("gone"));
    }
}
