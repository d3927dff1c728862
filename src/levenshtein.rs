use crate::matches::consolidate_overlapping_matches;
use crate::sequence::search_exact_in_range;
use crate::{Match, SearchError, Sequence};
use std::collections::HashMap;
use std::mem;

/// Minimum `pattern_len / (max_l_dist + 1)` ratio at which the n-gram search
/// pays for itself over the candidate scan.
const NGRAM_MIN_RATIO: usize = 3;

/// Partial alignment: started at text index `start`, consumed `subseq_index`
/// pattern elements at cost `dist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    start: usize,
    subseq_index: usize,
    dist: usize,
}

/// Finds near-matches within a single total edit-distance budget.
///
/// Chooses between the candidate scan and the n-gram search based on the
/// pattern length and the budget, and consolidates overlapping matches.
pub fn find_near_matches_levenshtein<S: Sequence>(
    pattern: S,
    text: S,
    max_l_dist: usize,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    if max_l_dist == 0 {
        return crate::exact::find_exact_matches(pattern, text);
    }
    let raw = if pattern.len() / (max_l_dist + 1) >= NGRAM_MIN_RATIO {
        raw_levenshtein_ngrams(pattern, text, max_l_dist)?
    } else {
        find_near_matches_levenshtein_lp(pattern, text, max_l_dist)?
    };
    Ok(consolidate_overlapping_matches(raw))
}

/// Strategy choice without the consolidation stage; used by the dispatcher,
/// which consolidates once at the end.
pub(crate) fn raw_levenshtein<S: Sequence>(
    pattern: S,
    text: S,
    max_l_dist: usize,
) -> Result<Vec<Match<S>>, SearchError> {
    if max_l_dist == 0 {
        crate::exact::find_exact_matches(pattern, text)
    } else if pattern.len() / (max_l_dist + 1) >= NGRAM_MIN_RATIO {
        raw_levenshtein_ngrams(pattern, text, max_l_dist)
    } else {
        find_near_matches_levenshtein_lp(pattern, text, max_l_dist)
    }
}

/// Elements of the pattern prefix `[0, max_l_dist]` mapped to their earliest
/// position. Seeds alignments that absorb a skipped pattern prefix as
/// deletions.
fn first_positions_table<S: Sequence>(
    pattern: S,
    max_l_dist: usize,
) -> HashMap<S::Item, usize> {
    let mut table = HashMap::new();
    let prefix_len = (max_l_dist + 1).min(pattern.len());
    // walk backwards so the earliest position wins on repeated elements
    for index in (0..prefix_len).rev() {
        table.insert(pattern.item(index), index);
    }
    table
}

/// Candidate scan over the whole text.
///
/// Yields a superset of the minimal matches, including overlapping variants
/// of the same alignment, in ascending `start` order; alignments that reach
/// the end of the text complete by trailing deletions when the budget
/// allows. Consolidation is the expected final stage.
pub fn find_near_matches_levenshtein_lp<S: Sequence>(
    pattern: S,
    text: S,
    max_l_dist: usize,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let m = pattern.len();
    let n = text.len();
    let table = first_positions_table(pattern, max_l_dist);

    let mut matches: Vec<Match<S>> = Vec::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut new_candidates: Vec<Candidate> = Vec::new();

    for index in 0..n {
        let element = text.item(index);
        new_candidates.clear();

        if let Some(&first_index) = table.get(&element) {
            if first_index + 1 == m {
                matches.push(Match::in_text(index, index + 1, first_index, text));
            } else {
                new_candidates.push(Candidate {
                    start: index,
                    subseq_index: first_index + 1,
                    dist: first_index,
                });
            }
        }

        for &cand in &candidates {
            if pattern.item(cand.subseq_index) == element {
                if cand.subseq_index + 1 == m {
                    matches.push(Match::in_text(cand.start, index + 1, cand.dist, text));
                } else {
                    new_candidates.push(Candidate {
                        subseq_index: cand.subseq_index + 1,
                        ..cand
                    });
                }
            } else {
                if cand.dist == max_l_dist {
                    continue;
                }
                // skip this text element
                new_candidates.push(Candidate {
                    dist: cand.dist + 1,
                    ..cand
                });
                if index + 1 < n && cand.subseq_index + 1 < m {
                    // substitute it for the expected pattern element
                    new_candidates.push(Candidate {
                        subseq_index: cand.subseq_index + 1,
                        dist: cand.dist + 1,
                        ..cand
                    });
                }
                // skip pattern elements until one equals this text element
                for n_skipped in 1..=(max_l_dist - cand.dist) {
                    if cand.subseq_index + n_skipped == m {
                        matches.push(Match::in_text(
                            cand.start,
                            index + 1,
                            cand.dist + n_skipped,
                            text,
                        ));
                        break;
                    }
                    if pattern.item(cand.subseq_index + n_skipped) == element {
                        if cand.subseq_index + n_skipped + 1 == m {
                            matches.push(Match::in_text(
                                cand.start,
                                index + 1,
                                cand.dist + n_skipped,
                                text,
                            ));
                        } else {
                            new_candidates.push(Candidate {
                                subseq_index: cand.subseq_index + 1 + n_skipped,
                                dist: cand.dist + n_skipped,
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
        let dist = cand.dist + m - cand.subseq_index;
        if dist <= max_l_dist {
            matches.push(Match::in_text(cand.start, n, dist, text));
        }
    }

    Ok(matches)
}

/// One-sided expansion: the least total cost of consuming all of
/// `pattern_tail` against a prefix of `text_tail`, and the length of that
/// prefix.
///
/// Runs the dynamic-programming frontier along `text_tail` with the usual
/// unit-cost recurrence, restricted to the diagonal band that can still stay
/// within `max_dist`. Returns `None` when no prefix stays within budget.
fn expand<I: Eq>(
    pattern_tail: &[I],
    text_tail: impl Iterator<Item = I>,
    max_dist: usize,
) -> Option<(usize, usize)> {
    if pattern_tail.is_empty() {
        return Some((0, 0));
    }
    let tail_len = pattern_tail.len();

    let mut scores: Vec<usize> = (0..=tail_len).collect();
    let mut new_scores: Vec<usize> = vec![0; tail_len + 1];
    let mut best: Option<(usize, usize)> = None;

    for (seq_index, element) in text_tail.enumerate() {
        new_scores[0] = scores[0] + 1;
        let band_edge = (seq_index + max_dist).min(tail_len - 1);
        for k in 0..band_edge {
            let substitution = usize::from(element != pattern_tail[k]);
            new_scores[k + 1] = (scores[k] + substitution)
                .min(scores[k + 1] + 1)
                .min(new_scores[k] + 1);
        }
        let substitution = usize::from(element != pattern_tail[band_edge]);
        let last_score = (scores[band_edge] + substitution).min(new_scores[band_edge] + 1);
        new_scores[band_edge + 1] = last_score;

        if band_edge == tail_len - 1
            && best.is_none_or(|(best_score, _)| last_score <= best_score)
        {
            best = Some((last_score, seq_index));
        }

        mem::swap(&mut scores, &mut new_scores);
    }

    match best {
        Some((score, seq_index)) if score <= max_dist => Some((score, seq_index + 1)),
        _ => None,
    }
}

/// n-gram search: each tiling q-gram occurrence anchors an alignment that is
/// expanded right across the pattern suffix first, then left across the
/// reversed prefix with the remaining budget.
///
/// Candidates from different q-grams overlap freely; order is arbitrary.
pub(crate) fn raw_levenshtein_ngrams<S: Sequence>(
    pattern: S,
    text: S,
    max_l_dist: usize,
) -> Result<Vec<Match<S>>, SearchError> {
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
        let prefix_reversed: Vec<S::Item> =
            (0..gram_start).rev().map(|i| pattern.item(i)).collect();
        let suffix: Vec<S::Item> = (gram_end..m).map(|i| pattern.item(i)).collect();

        let lo = gram_start.saturating_sub(max_l_dist);
        let hi = (n + gram_end + max_l_dist).saturating_sub(m).min(n);
        for index in
            search_exact_in_range(pattern.slice(gram_start, gram_end), text, lo, hi)?
        {
            let right_hi = (index + m + max_l_dist - gram_start).min(n);
            let Some((dist_right, right_len)) = expand(
                &suffix,
                (index + q..right_hi).map(|i| text.item(i)),
                max_l_dist,
            ) else {
                continue;
            };

            let left_budget = max_l_dist - dist_right;
            let left_lo = index.saturating_sub(gram_start + left_budget);
            let Some((dist_left, left_len)) = expand(
                &prefix_reversed,
                (left_lo..index).rev().map(|i| text.item(i)),
                left_budget,
            ) else {
                continue;
            };
            debug_assert!(dist_left + dist_right <= max_l_dist);

            matches.push(Match::in_text(
                index - left_len,
                index + q + right_len,
                dist_left + dist_right,
                text,
            ));
        }
        gram_start += q;
    }
    Ok(matches)
}

/// Consolidated n-gram search; see [`raw_levenshtein_ngrams`]'s strategy
/// description.
pub fn find_near_matches_levenshtein_ngrams<S: Sequence>(
    pattern: S,
    text: S,
    max_l_dist: usize,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    Ok(consolidate_overlapping_matches(raw_levenshtein_ngrams(
        pattern, text, max_l_dist,
    )?))
}
