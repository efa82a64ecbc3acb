//! Exact and fuzzy matching over flattened document text.
//!
//! Matching is two-stage. The exact stage is a case-insensitive
//! leftmost substring search. Only when it misses does the fuzzy stage
//! run: a Levenshtein-distance sliding window across the text, first at
//! the query's exact length, then at lengths within ten percent of it.
//!
//! # Design Decisions
//!
//! - **First within tolerance wins**: no attempt is made to find a
//!   globally minimal-distance match. Quoted spans drift by small edits
//!   far more often than by restructuring, and a deterministic leftmost
//!   policy is cheap and predictable.
//! - **Unified tolerance**: `max(3, floor(len / 10))` edits for every
//!   stage of the fuzzy search, so short queries are not over-tolerant
//!   and long queries are not under-tolerant.
//! - **Never a wrong span**: a miss is an ordinary return value, and a
//!   degenerate zero-length window can never be reported.

use serde::{Deserialize, Serialize};

/// A half-open match range in flat-text char coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub from: usize,
    pub to: usize,
}

/// Tunable tolerances for the fuzzy stage.
///
/// The defaults reproduce the engine's documented matching policy;
/// they can be overridden from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherLimits {
    /// Minimum edit tolerance regardless of query length (default: 3)
    #[serde(default = "default_tolerance_floor")]
    pub tolerance_floor: usize,

    /// Edit tolerance as a fraction of query length (default: 0.1)
    #[serde(default = "default_tolerance_ratio")]
    pub tolerance_ratio: f64,

    /// Window length variation as a fraction of query length (default: 0.1)
    #[serde(default = "default_length_variation")]
    pub length_variation_ratio: f64,
}

fn default_tolerance_floor() -> usize {
    3
}
fn default_tolerance_ratio() -> f64 {
    0.1
}
fn default_length_variation() -> f64 {
    0.1
}

impl Default for MatcherLimits {
    fn default() -> Self {
        Self {
            tolerance_floor: default_tolerance_floor(),
            tolerance_ratio: default_tolerance_ratio(),
            length_variation_ratio: default_length_variation(),
        }
    }
}

impl MatcherLimits {
    /// Maximum accepted edit distance for a query of `query_len` chars.
    pub fn max_distance(&self, query_len: usize) -> usize {
        let scaled = (query_len as f64 * self.tolerance_ratio).floor() as usize;
        self.tolerance_floor.max(scaled)
    }

    /// Inclusive window length bounds for the varied-length stage.
    fn window_bounds(&self, query_len: usize) -> (usize, usize) {
        let min = (query_len as f64 * (1.0 - self.length_variation_ratio)).floor() as usize;
        let max = (query_len as f64 * (1.0 + self.length_variation_ratio)).floor() as usize;
        (min, max)
    }
}

/// Case folding as a per-character 1:1 mapping.
///
/// Each character maps to the first character of its lowercase form, so
/// the folded text always has the same char length as the input and
/// flat offsets survive folding unchanged. This is exact for ASCII and
/// Latin-1; scripts whose lowercase expands to multiple characters fold
/// approximately. Full Unicode case folding would need an offset map
/// and is left as an extension point.
pub fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Case-folded text with a char-boundary table for window slicing.
struct FoldedText {
    folded: String,
    /// Byte offset of every char boundary; last entry is the byte length.
    boundaries: Vec<usize>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let folded = fold_case(text);
        let mut boundaries: Vec<usize> = folded.char_indices().map(|(i, _)| i).collect();
        boundaries.push(folded.len());
        Self { folded, boundaries }
    }

    fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Slice by char offsets. Always lands on valid boundaries.
    fn slice(&self, from: usize, to: usize) -> &str {
        &self.folded[self.boundaries[from]..self.boundaries[to]]
    }

    /// Convert a byte offset (known to be a char boundary) to a char offset.
    fn byte_to_char(&self, byte: usize) -> usize {
        self.boundaries.partition_point(|&b| b < byte)
    }
}

/// Find the leftmost case-insensitive occurrence of `query` in `text`.
///
/// Returns the match in flat char coordinates. The span length always
/// equals the query's char length because case folding is 1:1.
///
/// # Arguments
/// * `text` - The flattened document text
/// * `query` - The text to locate
///
/// # Returns
/// * `Some(MatchRange)` for the leftmost occurrence, `None` on a miss
///   or for an empty / all-whitespace query
pub fn exact_match(text: &str, query: &str) -> Option<MatchRange> {
    if query.trim().is_empty() {
        return None;
    }

    let content = FoldedText::new(text);
    let needle = fold_case(query);

    let byte_idx = content.folded.find(&needle)?;
    let from = content.byte_to_char(byte_idx);
    let len = needle.chars().count();

    Some(MatchRange {
        from,
        to: from + len,
    })
}

/// Find a fuzzy occurrence of `query` in `text` by windowed edit distance.
///
/// Stage one slides a window of the query's exact char length across
/// the folded text and accepts the first window within tolerance. Stage
/// two retries with window lengths from ninety to one hundred ten
/// percent of the query length (ascending, skipping the length already
/// tried); within each length, positions scan left to right, and the
/// first hit in that enumeration order wins.
///
/// # Arguments
/// * `text` - The flattened document text
/// * `query` - The text to locate
/// * `limits` - Edit tolerance and window variation settings
///
/// # Returns
/// * `Some(MatchRange)` for the first window within tolerance, `None`
///   when no window at any candidate length qualifies
pub fn fuzzy_match(text: &str, query: &str, limits: &MatcherLimits) -> Option<MatchRange> {
    if query.trim().is_empty() {
        return None;
    }

    let content = FoldedText::new(text);
    let needle = fold_case(query);
    let needle_len = needle.chars().count();
    let content_len = content.char_len();
    let max_distance = limits.max_distance(needle_len);

    // Stage one: windows of the query's exact length.
    if content_len >= needle_len {
        for i in 0..=content_len - needle_len {
            let window = content.slice(i, i + needle_len);
            if strsim::levenshtein(&needle, window) <= max_distance {
                return Some(MatchRange {
                    from: i,
                    to: i + needle_len,
                });
            }
        }
    }

    // Stage two: varied window lengths, ascending.
    let (min_len, max_len) = limits.window_bounds(needle_len);
    for len in min_len..=max_len {
        if len == needle_len || len == 0 || len > content_len {
            continue;
        }
        for i in 0..=content_len - len {
            let window = content.slice(i, i + len);
            if strsim::levenshtein(&needle, window) <= max_distance {
                return Some(MatchRange { from: i, to: i + len });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_case_insensitive() {
        let m = exact_match("This is a TEST document with some content.", "test document");
        assert_eq!(m, Some(MatchRange { from: 10, to: 23 }));
    }

    #[test]
    fn test_exact_match_leftmost_wins() {
        let m = exact_match("foo bar foo baz", "foo").unwrap();
        assert_eq!(m.from, 0);
        assert_eq!(m.to, 3);
    }

    #[test]
    fn test_exact_match_miss() {
        assert_eq!(exact_match("hello world", "xyz"), None);
    }

    #[test]
    fn test_exact_match_rejects_blank_query() {
        assert_eq!(exact_match("hello", ""), None);
        assert_eq!(exact_match("hello", "   "), None);
    }

    #[test]
    fn test_exact_match_multibyte_prefix() {
        // The match follows multibyte characters; offsets are chars.
        let m = exact_match("héllo wörld again", "WÖRLD").unwrap();
        assert_eq!(m, MatchRange { from: 6, to: 11 });
    }

    #[test]
    fn test_fuzzy_match_single_typo() {
        let limits = MatcherLimits::default();
        let m = fuzzy_match(
            "the quick brown fox jumps over the lazy dog",
            "quick browm fox",
            &limits,
        );
        let m = m.unwrap();
        assert_eq!(m.to - m.from, 15);
        assert!(m.from <= 4);
    }

    #[test]
    fn test_fuzzy_tolerance_floor() {
        // 11-char query, floor tolerance of 3 edits applies.
        let limits = MatcherLimits::default();
        assert_eq!(limits.max_distance(11), 3);
        let m = fuzzy_match("the quick brown fox", "quikc brwn", &limits);
        assert!(m.is_some());
    }

    #[test]
    fn test_fuzzy_tolerance_scales_with_length() {
        let limits = MatcherLimits::default();
        assert_eq!(limits.max_distance(30), 3);
        assert_eq!(limits.max_distance(50), 5);
    }

    #[test]
    fn test_fuzzy_miss_beyond_tolerance() {
        let limits = MatcherLimits::default();
        let m = fuzzy_match(
            "this is the current document content",
            "completely unrelated sentence overall",
            &limits,
        );
        assert_eq!(m, None);
    }

    #[test]
    fn test_fuzzy_varied_length_window() {
        let limits = MatcherLimits::default();
        // 43-char query, 4-edit budget. The live text dropped the second
        // "the ", so exact-length windows drag in four trailing chars and
        // miss; a four-char-shorter window absorbs the deletion.
        let text = "intro words the quick brown fox jumps over lazy dog tail words";
        let query = "the quick brown fox jumps over the lazy dog";
        let m = fuzzy_match(text, query, &limits);
        assert!(m.is_some());
    }

    #[test]
    fn test_fuzzy_query_longer_than_text() {
        let limits = MatcherLimits::default();
        // Stage one cannot run; stage two's shorter windows can still hit.
        let m = fuzzy_match("abcd", "abcde", &limits);
        assert_eq!(m, Some(MatchRange { from: 0, to: 4 }));
    }

    #[test]
    fn test_fuzzy_rejects_blank_query() {
        let limits = MatcherLimits::default();
        assert_eq!(fuzzy_match("content", "", &limits), None);
        assert_eq!(fuzzy_match("content", " \t ", &limits), None);
    }

    #[test]
    fn test_fold_case_preserves_length() {
        let s = "İstanbul ẞtraße";
        assert_eq!(fold_case(s).chars().count(), s.chars().count());
    }

    #[test]
    fn test_limits_defaults_from_empty_yaml() {
        let limits: MatcherLimits = serde_yaml::from_str("{}").unwrap();
        assert_eq!(limits.tolerance_floor, 3);
        assert_eq!(limits.tolerance_ratio, 0.1);
        assert_eq!(limits.length_variation_ratio, 0.1);
    }
}
