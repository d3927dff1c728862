use crate::sequence::search_exact_in_range;
use crate::{Match, SearchError, Sequence};
use itertools::Itertools;
use std::collections::{HashMap, VecDeque};

/// Minimum `pattern_len / (max_substitutions + 1)` ratio at which the
/// n-gram search pays for itself over the ring-counter scan.
const NGRAM_MIN_RATIO: usize = 3;

/// Finds near-matches allowing substitutions only.
///
/// Every match spans exactly `pattern.len()` text elements and `dist` is the
/// Hamming distance between the matched slice and the pattern. Overlapping
/// matches are all reported; pass the result through
/// [`consolidate_overlapping_matches`](crate::consolidate_overlapping_matches)
/// to keep one per overlap group.
///
/// Chooses between the ring-counter scan and the n-gram search based on the
/// pattern length and the budget.
pub fn find_near_matches_substitutions<S: Sequence>(
    pattern: S,
    text: S,
    max_substitutions: usize,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    if max_substitutions == 0 {
        return crate::exact::find_exact_matches(pattern, text);
    }
    if pattern.len() / (max_substitutions + 1) >= NGRAM_MIN_RATIO {
        find_near_matches_substitutions_ngrams(pattern, text, max_substitutions)
    } else {
        Ok(find_near_matches_substitutions_lp(pattern, text, max_substitutions)?.collect())
    }
}

/// Ring-counter scan: lazily yields substitutions-only matches in ascending
/// `start` order.
///
/// For every alignment of the pattern against the text a circular buffer
/// slot counts the elements already seen to agree; when the alignment's last
/// position is reached the mismatch count is `pattern_len - count`.
pub fn find_near_matches_substitutions_lp<S: Sequence>(
    pattern: S,
    text: S,
    max_substitutions: usize,
) -> Result<SubstitutionsLp<S>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let m = pattern.len();
    let mut positions: HashMap<S::Item, Vec<usize>> = HashMap::new();
    for index in 0..m {
        positions.entry(pattern.item(index)).or_default().push(index);
    }

    // Warm up the ring over the first m - 1 elements; no alignment can
    // complete there.
    let mut counts: VecDeque<usize> = VecDeque::with_capacity(m);
    counts.push_back(0);
    let warmup = (m - 1).min(text.len());
    for index in 0..warmup {
        if let Some(expected) = positions.get(&text.item(index)) {
            for &p in expected {
                if p <= index {
                    counts[p] += 1;
                }
            }
        }
        counts.push_front(0);
    }

    Ok(SubstitutionsLp {
        text,
        positions,
        counts,
        pattern_len: m,
        max_substitutions,
        index: warmup,
    })
}

/// Lazy iterator produced by [`find_near_matches_substitutions_lp`].
pub struct SubstitutionsLp<S: Sequence> {
    text: S,
    positions: HashMap<S::Item, Vec<usize>>,
    counts: VecDeque<usize>,
    pattern_len: usize,
    max_substitutions: usize,
    index: usize,
}

impl<S: Sequence> Iterator for SubstitutionsLp<S> {
    type Item = Match<S>;

    fn next(&mut self) -> Option<Match<S>> {
        let m = self.pattern_len;
        while self.index < self.text.len() {
            let index = self.index;
            self.index += 1;

            if let Some(expected) = self.positions.get(&self.text.item(index)) {
                for &p in expected {
                    self.counts[p] += 1;
                }
            }
            // re-align the ring: slot 0 now belongs to the alignment that
            // started m - 1 elements ago
            self.counts.rotate_right(1);
            let n_substitutions = m - self.counts[0];
            self.counts[0] = 0;

            if n_substitutions <= self.max_substitutions {
                return Some(Match::in_text(
                    index + 1 - m,
                    index + 1,
                    n_substitutions,
                    self.text,
                ));
            }
        }
        None
    }
}

/// Counts positions at which the two equally long views differ, giving up
/// once `max_differences` is reached.
fn count_differences_with_maximum<S: Sequence>(
    sequence1: S,
    sequence2: S,
    max_differences: usize,
) -> usize {
    let mut n_different = 0;
    for index in 0..sequence1.len().min(sequence2.len()) {
        if sequence1.item(index) != sequence2.item(index) {
            n_different += 1;
            if n_different == max_differences {
                break;
            }
        }
    }
    n_different
}

/// n-gram search: any substring within `k` substitutions of the pattern
/// contains one of the `k + 1` tiling q-grams exactly, so each exact q-gram
/// occurrence anchors a candidate alignment whose flanks are verified by
/// mismatch counting.
///
/// Matches are deduplicated by `start` and sorted; fails with
/// [`SearchError::SubseqTooShort`] when the pattern cannot be tiled
/// (`pattern_len / (max_substitutions + 1) < 1`).
pub fn find_near_matches_substitutions_ngrams<S: Sequence>(
    pattern: S,
    text: S,
    max_substitutions: usize,
) -> Result<Vec<Match<S>>, SearchError> {
    if pattern.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    let m = pattern.len();
    let n = text.len();
    let q = m / (max_substitutions + 1);
    if q == 0 {
        return Err(SearchError::SubseqTooShort);
    }

    let mut matches: Vec<Match<S>> = Vec::new();
    let mut gram_start = 0;
    while gram_start + q <= m {
        let gram_end = gram_start + q;
        let subseq_before = pattern.slice(0, gram_start);
        let subseq_after = pattern.slice(gram_end, m);
        // an anchored alignment must leave room for the full pattern
        let hi = n.saturating_sub(m - gram_end);
        for index in
            search_exact_in_range(pattern.slice(gram_start, gram_end), text, gram_start, hi)?
        {
            let start = index - gram_start;
            let mut n_substitutions = 0;

            let seq_before = text.slice(start, index);
            if seq_before != subseq_before {
                n_substitutions += count_differences_with_maximum(
                    seq_before,
                    subseq_before,
                    max_substitutions - n_substitutions + 1,
                );
                if n_substitutions > max_substitutions {
                    continue;
                }
            }

            let seq_after = text.slice(index + q, start + m);
            if seq_after != subseq_after {
                if n_substitutions == max_substitutions {
                    continue;
                }
                n_substitutions += count_differences_with_maximum(
                    seq_after,
                    subseq_after,
                    max_substitutions - n_substitutions + 1,
                );
                if n_substitutions > max_substitutions {
                    continue;
                }
            }

            matches.push(Match::in_text(start, start + m, n_substitutions, text));
        }
        gram_start += q;
    }

    Ok(matches
        .into_iter()
        .unique_by(|m| m.start)
        .sorted_unstable_by_key(|m| m.start)
        .collect())
}
