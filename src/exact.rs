use crate::sequence::search_exact;
use crate::{Match, SearchError, Sequence};

/// Finds every zero-error occurrence of `pattern` in `text`.
///
/// Matches are yielded in ascending `start` order, each with `dist == 0` and
/// a matched slice equal to the pattern.
pub fn find_exact_matches<S: Sequence>(
    pattern: S,
    text: S,
) -> Result<Vec<Match<S>>, SearchError> {
    let m = pattern.len();
    Ok(search_exact(pattern, text)?
        .map(|index| Match::in_text(index, index + m, 0, text))
        .collect())
}
