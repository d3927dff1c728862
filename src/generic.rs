use crate::matches::consolidate_overlapping_matches;
use crate::sequence::search_exact_in_range;
use crate::{Match, SearchError, SearchParams, Sequence};
use std::mem;

/// Minimum `pattern_len / (max_l_dist + 1)` ratio at which the n-gram search
/// pays for itself over the candidate scan.
const NGRAM_MIN_RATIO: usize = 3;

/// Partial alignment with every edit kind counted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    start: usize,
    subseq_index: usize,
    l_dist: usize,
    n_subs: usize,
    n_ins: usize,
    n_dels: usize,
}

/// Finds near-matches under independent substitution, insertion, deletion
/// and total-distance limits.
///
/// Chooses between the candidate scan and the n-gram search based on the
/// pattern length and the total budget, and consolidates overlapping
/// matches.
pub fn find_near_matches_generic<S: Sequence>(
    pattern: S,
    text: S,
    params: &SearchParams,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    if params.max_l_dist == 0 {
        return crate::exact::find_exact_matches(pattern, text);
    }
    let raw = if pattern.len() / (params.max_l_dist + 1) >= NGRAM_MIN_RATIO {
        raw_generic_ngrams(pattern, text, params)?
    } else {
        find_near_matches_generic_lp(pattern, text, params)?
    };
    Ok(consolidate_overlapping_matches(raw))
}

/// Strategy choice without the consolidation stage; used by the dispatcher,
/// which consolidates once at the end.
pub(crate) fn raw_generic<S: Sequence>(
    pattern: S,
    text: S,
    params: &SearchParams,
) -> Result<Vec<Match<S>>, SearchError> {
    if params.max_l_dist == 0 {
        crate::exact::find_exact_matches(pattern, text)
    } else if pattern.len() / (params.max_l_dist + 1) >= NGRAM_MIN_RATIO {
        raw_generic_ngrams(pattern, text, params)
    } else {
        find_near_matches_generic_lp(pattern, text, params)
    }
}

/// Candidate scan over the whole text, tracking each edit kind against its
/// own cap.
///
/// A fresh alignment is seeded at every text position. Yields a superset of
/// the minimal matches including overlapping variants; alignments reaching
/// the end of the text complete by trailing deletions when the budgets
/// allow. Consolidation is the expected final stage.
pub fn find_near_matches_generic_lp<S: Sequence>(
    pattern: S,
    text: S,
    params: &SearchParams,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let &SearchParams {
        max_substitutions,
        max_insertions,
        max_deletions,
        max_l_dist,
    } = params;
    let m = pattern.len();
    let n = text.len();

    let mut matches: Vec<Match<S>> = Vec::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut new_candidates: Vec<Candidate> = Vec::new();

    for index in 0..n {
        let element = text.item(index);
        candidates.push(Candidate {
            start: index,
            subseq_index: 0,
            l_dist: 0,
            n_subs: 0,
            n_ins: 0,
            n_dels: 0,
        });
        new_candidates.clear();

        for &cand in &candidates {
            if element == pattern.item(cand.subseq_index) {
                if cand.subseq_index + 1 == m {
                    matches.push(Match::in_text(cand.start, index + 1, cand.l_dist, text));
                } else {
                    new_candidates.push(Candidate {
                        subseq_index: cand.subseq_index + 1,
                        ..cand
                    });
                }
            } else {
                if cand.l_dist == max_l_dist {
                    continue;
                }
                if cand.n_ins < max_insertions {
                    // skip this text element
                    new_candidates.push(Candidate {
                        n_ins: cand.n_ins + 1,
                        l_dist: cand.l_dist + 1,
                        ..cand
                    });
                }
                if cand.subseq_index + 1 < m {
                    if cand.n_subs < max_substitutions {
                        // substitute it for the expected pattern element
                        new_candidates.push(Candidate {
                            n_subs: cand.n_subs + 1,
                            subseq_index: cand.subseq_index + 1,
                            l_dist: cand.l_dist + 1,
                            ..cand
                        });
                    } else if cand.n_dels < max_deletions && cand.n_ins < max_insertions {
                        // no substitutions left: emulate one by an insertion
                        // plus a deletion
                        new_candidates.push(Candidate {
                            n_ins: cand.n_ins + 1,
                            n_dels: cand.n_dels + 1,
                            subseq_index: cand.subseq_index + 1,
                            l_dist: cand.l_dist + 1,
                            ..cand
                        });
                    }
                } else if cand.n_subs < max_substitutions
                    || (cand.n_dels < max_deletions && cand.n_ins < max_insertions)
                {
                    // the last pattern element: substituting it completes a
                    // match outright
                    matches.push(Match::in_text(
                        cand.start,
                        index + 1,
                        cand.l_dist + 1,
                        text,
                    ));
                }
                // skip pattern elements until one equals this text element
                let max_skip =
                    (max_deletions - cand.n_dels).min(max_l_dist - cand.l_dist);
                for n_skipped in 1..=max_skip {
                    if cand.subseq_index + n_skipped == m {
                        matches.push(Match::in_text(
                            cand.start,
                            index + 1,
                            cand.l_dist + n_skipped,
                            text,
                        ));
                        break;
                    }
                    if pattern.item(cand.subseq_index + n_skipped) == element {
                        if cand.subseq_index + n_skipped + 1 == m {
                            matches.push(Match::in_text(
                                cand.start,
                                index + 1,
                                cand.l_dist + n_skipped,
                                text,
                            ));
                        } else {
                            new_candidates.push(Candidate {
                                n_dels: cand.n_dels + n_skipped,
                                subseq_index: cand.subseq_index + 1 + n_skipped,
                                l_dist: cand.l_dist + n_skipped,
                                ..cand
                            });
                        }
                        break;
                    }
                }
            }
        }

        mem::swap(&mut candidates, &mut new_candidates);
        candidates.sort_unstable();
        candidates.dedup();
    }

    // alignments that can finish by deleting the rest of the pattern
    for cand in candidates {
        let n_skipped = m - cand.subseq_index;
        if cand.n_dels + n_skipped <= max_deletions
            && cand.l_dist + n_skipped <= max_l_dist
        {
            matches.push(Match::in_text(
                cand.start,
                n,
                cand.l_dist + n_skipped,
                text,
            ));
        }
    }

    Ok(matches)
}

/// n-gram search: each tiling q-gram occurrence anchors a window of width
/// about `pattern_len + 2 * max_l_dist`, which the candidate scan then
/// verifies; window-relative matches are rebased into text offsets.
pub(crate) fn raw_generic_ngrams<S: Sequence>(
    pattern: S,
    text: S,
    params: &SearchParams,
) -> Result<Vec<Match<S>>, SearchError> {
    let max_l_dist = params.max_l_dist;
    let m = pattern.len();
    let n = text.len();
    let q = m / (max_l_dist + 1);
    if q == 0 {
        return Err(SearchError::SubseqTooShort);
    }

    let mut matches: Vec<Match<S>> = Vec::new();
    let mut gram_start = 0;
    while gram_start + q <= m {
        let gram_end = gram_start + q;
        let lo = gram_start.saturating_sub(max_l_dist);
        let hi = (n + gram_end + max_l_dist).saturating_sub(m).min(n);
        for index in
            search_exact_in_range(pattern.slice(gram_start, gram_end), text, lo, hi)?
        {
            let window_lo = index.saturating_sub(gram_start + max_l_dist);
            let window_hi = (index + m + max_l_dist - gram_start).min(n);
            let window = text.slice(window_lo, window_hi);
            for found in find_near_matches_generic_lp(pattern, window, params)? {
                matches.push(Match::in_text(
                    found.start + window_lo,
                    found.end + window_lo,
                    found.dist,
                    text,
                ));
            }
        }
        gram_start += q;
    }
    Ok(matches)
}

/// Consolidated n-gram search; see [`raw_generic_ngrams`]'s strategy
/// description.
pub fn find_near_matches_generic_ngrams<S: Sequence>(
    pattern: S,
    text: S,
    params: &SearchParams,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    Ok(consolidate_overlapping_matches(raw_generic_ngrams(
        pattern, text, params,
    )?))
}
