use crate::Match;
use std::cmp::Reverse;

/// Equivalence class of matches under transitive interval overlap.
#[derive(Debug, Clone)]
pub struct MatchGroup<M> {
    /// Covered interval start, the minimum `start` of the members.
    pub start: usize,
    /// Covered interval end, the maximum `end` of the members.
    pub end: usize,
    pub members: Vec<Match<M>>,
}

impl<M> MatchGroup<M> {
    fn new(first: Match<M>) -> Self {
        MatchGroup {
            start: first.start,
            end: first.end,
            members: vec![first],
        }
    }

    /// Half-open interval overlap with a match.
    fn overlaps(&self, m: &Match<M>) -> bool {
        !(m.end <= self.start || m.start >= self.end)
    }

    fn add(&mut self, m: Match<M>) {
        self.start = self.start.min(m.start);
        self.end = self.end.max(m.end);
        self.members.push(m);
    }
}

/// Partitions matches into groups of transitively overlapping matches.
///
/// Matches are taken in arbitrary order. Each match joins the group whose
/// interval it overlaps, widening it; a match overlapping several groups
/// merges them into one.
pub fn group_matches<M>(matches: impl IntoIterator<Item = Match<M>>) -> Vec<MatchGroup<M>> {
    let mut groups: Vec<MatchGroup<M>> = Vec::new();
    for m in matches {
        let mut overlapping: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.overlaps(&m))
            .map(|(i, _)| i)
            .collect();
        match overlapping.len() {
            0 => groups.push(MatchGroup::new(m)),
            1 => groups[overlapping[0]].add(m),
            _ => {
                // merge all overlapping groups plus the match into one
                let mut merged = MatchGroup::new(m);
                // remove back-to-front so the collected indices stay valid
                while let Some(index) = overlapping.pop() {
                    for member in groups.swap_remove(index).members {
                        merged.add(member);
                    }
                }
                groups.push(merged);
            }
        }
    }
    groups
}

/// The group member with the smallest distance; ties go to the longest
/// match, then the smallest start.
pub fn best_match_in_group<M>(group: MatchGroup<M>) -> Match<M> {
    group
        .members
        .into_iter()
        .min_by_key(|m| (m.dist, Reverse(m.len()), m.start))
        .expect("a match group is never empty")
}

/// Replaces every set of overlapping matches with its best member.
///
/// The result is strictly sorted by `start` and contains no two overlapping
/// matches. Consolidating a second time is a no-op.
///
/// ```rust
/// use fuzzy_substring::{consolidate_overlapping_matches, Match};
///
/// let raw = vec![
///     Match { start: 3, end: 7, dist: 1, matched: () },
///     Match { start: 4, end: 7, dist: 0, matched: () },
///     Match { start: 9, end: 12, dist: 1, matched: () },
/// ];
/// let best = consolidate_overlapping_matches(raw);
/// assert_eq!(best.len(), 2);
/// assert_eq!((best[0].start, best[0].dist), (4, 0));
/// ```
pub fn consolidate_overlapping_matches<M>(
    matches: impl IntoIterator<Item = Match<M>>,
) -> Vec<Match<M>> {
    let mut best: Vec<Match<M>> = group_matches(matches)
        .into_iter()
        .map(best_match_in_group)
        .collect();
    best.sort_unstable_by_key(|m| m.start);
    best
}
