//! Approximate substring search under bounded edit-distance limits.
//!
//! Given a pattern and a text, the crate locates every substring of the text
//! whose edit distance to the pattern stays within caller-supplied bounds:
//! maximum substitutions, insertions, deletions, and total Levenshtein
//! distance, each independently optional. A match is valid only when all set
//! bounds hold at once.
//!
//! The simplest entry point is [`find_near_matches`], which picks a suitable
//! search strategy from the bounds, runs it, and consolidates overlapping
//! matches down to the best representative of each group:
//!
//! ```rust
//! use fuzzy_substring::{find_near_matches, Bytes, SearchLimits};
//!
//! let matches = find_near_matches(
//!     Bytes(b"PATTERN"),
//!     Bytes(b"aaaPATERNaaa"),
//!     SearchLimits::new().total(1),
//! )
//! .unwrap();
//! assert_eq!((matches[0].start, matches[0].end, matches[0].dist), (3, 9, 1));
//! assert_eq!(matches[0].matched.as_slice(), b"PATERN");
//! ```
//!
//! Texts too large for memory can be searched through
//! [`find_near_matches_in_reader`] (bytes) and
//! [`find_near_matches_in_chunks`] (decoded text), which window the input so
//! that no potential match is ever split across a window boundary.
//!
//! Search happens over any [`Sequence`]: [`Bytes`] for byte-like input,
//! [`Elements`] for slices of arbitrary `Eq + Hash` elements, and
//! [`find_near_matches_unicode`] for per-grapheme matching of multi-byte
//! text. The individual engines (exact, substitutions-only, Levenshtein and
//! the fully generic one) are exported as well for callers that want raw,
//! pre-consolidation output.

mod exact;
mod generic;
mod levenshtein;
mod matches;
mod sequence;
mod stream;
mod structs;
mod substitutions;

pub use exact::find_exact_matches;
pub use generic::{
    find_near_matches_generic, find_near_matches_generic_lp,
    find_near_matches_generic_ngrams,
};
pub use levenshtein::{
    find_near_matches_levenshtein, find_near_matches_levenshtein_lp,
    find_near_matches_levenshtein_ngrams,
};
pub use matches::{
    MatchGroup, best_match_in_group, consolidate_overlapping_matches, group_matches,
};
pub use sequence::{
    Bytes, Elements, SearchExact, Sequence, search_exact, search_exact_in_range,
};
pub use stream::{
    DEFAULT_CHUNK_SIZE, StreamRawMatches, find_near_matches_in_chunks,
    find_near_matches_in_chunks_with_chunk_size, find_near_matches_in_reader,
    find_near_matches_in_reader_with_chunk_size, stream_raw_matches,
    stream_raw_matches_with_chunk_size,
};
pub use structs::{Match, SearchError, SearchLimits, SearchParams};
pub use substitutions::{
    SubstitutionsLp, find_near_matches_substitutions,
    find_near_matches_substitutions_lp, find_near_matches_substitutions_ngrams,
};

use log::debug;
use unicode_segmentation::UnicodeSegmentation;

/// The engine family. The dispatcher picks the most specialized engine whose
/// preconditions hold for the normalized limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchKind {
    Exact,
    SubstitutionsOnly,
    Levenshtein,
    Generic,
}

impl SearchKind {
    pub(crate) fn select(params: &SearchParams) -> Self {
        if params.max_l_dist == 0 {
            SearchKind::Exact
        } else if params.max_insertions == 0 && params.max_deletions == 0 {
            SearchKind::SubstitutionsOnly
        } else if params.max_l_dist
            <= params
                .max_substitutions
                .min(params.max_insertions)
                .min(params.max_deletions)
        {
            SearchKind::Levenshtein
        } else {
            SearchKind::Generic
        }
    }

    /// How many elements beyond `pattern_len - 1` a chunked-search window
    /// must overlap the next one so that no match of this engine can be
    /// split across windows.
    pub(crate) fn extra_items_for_chunked_search(
        self,
        pattern_len: usize,
        params: &SearchParams,
    ) -> usize {
        match self {
            SearchKind::Exact => 0,
            SearchKind::SubstitutionsOnly => pattern_len - 1,
            SearchKind::Levenshtein | SearchKind::Generic => {
                pattern_len - 1 + params.max_l_dist
            }
        }
    }

    /// Runs the engine, returning raw matches: overlapping variants are all
    /// present and the order is engine-dependent.
    pub(crate) fn search_raw<S: Sequence>(
        self,
        pattern: S,
        text: S,
        params: &SearchParams,
    ) -> Result<Vec<Match<S>>, SearchError> {
        match self {
            SearchKind::Exact => exact::find_exact_matches(pattern, text),
            SearchKind::SubstitutionsOnly => substitutions::find_near_matches_substitutions(
                pattern,
                text,
                params.max_substitutions.min(params.max_l_dist),
            ),
            SearchKind::Levenshtein => {
                levenshtein::raw_levenshtein(pattern, text, params.max_l_dist)
            }
            SearchKind::Generic => generic::raw_generic(pattern, text, params),
        }
    }
}

/// Searches `text` for near-matches of `pattern` within `limits`.
///
/// Normalizes the limits, dispatches to the most specialized engine they
/// allow, and consolidates overlapping matches so that each group of
/// overlapping candidates is represented by its best member. The result is
/// strictly sorted by `start`.
///
/// ```rust
/// use fuzzy_substring::{find_near_matches, Bytes, SearchLimits};
///
/// // one insertion, no other edits
/// let matches = find_near_matches(
///     Bytes(b"def"),
///     Bytes(b"abcddefg"),
///     SearchLimits::new()
///         .substitutions(0)
///         .insertions(1)
///         .deletions(0)
///         .total(1),
/// )
/// .unwrap();
/// assert_eq!((matches[0].start, matches[0].end, matches[0].dist), (4, 7, 0));
/// ```
pub fn find_near_matches<S: Sequence>(
    pattern: S,
    text: S,
    limits: SearchLimits,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let params = limits.normalize()?;
    let kind = SearchKind::select(&params);
    debug!(
        "dispatching {kind:?} search, pattern length {}, text length {}",
        pattern.len(),
        text.len()
    );
    let raw = kind.search_raw(pattern, text, &params)?;
    Ok(consolidate_overlapping_matches(raw))
}

/// [`find_near_matches`] over the grapheme clusters of a string.
///
/// Edits apply to whole user-perceived characters, so a multi-byte cluster
/// counts as a single substitution rather than several byte edits. Reported
/// offsets are byte offsets into `text` and `matched` borrows from it.
///
/// ```rust
/// use fuzzy_substring::{find_near_matches_unicode, SearchLimits};
///
/// let matches =
///     find_near_matches_unicode("héllo", "say hållo!", SearchLimits::new().total(1))
///         .unwrap();
/// assert_eq!(matches[0].matched, "hållo");
/// ```
pub fn find_near_matches_unicode<'a>(
    pattern: &str,
    text: &'a str,
    limits: SearchLimits,
) -> Result<Vec<Match<&'a str>>, SearchError> {
    let pattern_clusters: Vec<&str> = pattern.graphemes(true).collect();
    let grapheme_starts: Vec<(usize, &str)> = text.grapheme_indices(true).collect();
    let text_clusters: Vec<&str> = grapheme_starts.iter().map(|&(_, g)| g).collect();

    let byte_offset = |cluster_index: usize| {
        grapheme_starts
            .get(cluster_index)
            .map_or(text.len(), |&(byte, _)| byte)
    };

    Ok(find_near_matches(
        Elements(&pattern_clusters),
        Elements(&text_clusters),
        limits,
    )?
    .into_iter()
    .map(|m| {
        let start = byte_offset(m.start);
        let end = byte_offset(m.end);
        Match {
            start,
            end,
            dist: m.dist,
            matched: &text[start..end],
        }
    })
    .collect())
}
