//! Position sets stored as merged inclusive intervals.
//!
//! Space is one interval per disjoint run of members, independent of how far
//! apart the coordinates are.

use std::ops::RangeInclusive;

/// Set of 1-based positions as sorted, disjoint, non-adjacent runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionSet {
    runs: Vec<RangeInclusive<u32>>,
}

impl PositionSet {
    /// Union of inclusive ranges.
    ///
    /// Overlapping and touching ranges are merged, so equal sets compare equal
    /// regardless of input order or duplication.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = RangeInclusive<u32>>,
    {
        let mut ranges: Vec<RangeInclusive<u32>> = ranges
            .into_iter()
            .filter(|range| !range.is_empty())
            .collect();
        ranges.sort_unstable_by_key(|range| (*range.start(), *range.end()));

        let mut runs: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match runs.last_mut() {
                Some(last) if u64::from(*range.start()) <= u64::from(*last.end()) + 1 => {
                    if range.end() > last.end() {
                        *last = *last.start()..=*range.end();
                    }
                }
                _ => runs.push(range),
            }
        }
        Self { runs }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.runs
            .iter()
            .map(|run| (run.end() - run.start()) as usize + 1)
            .sum()
    }

    /// Returns `true` when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, position: u32) -> bool {
        let idx = self.runs.partition_point(|run| *run.end() < position);
        self.runs.get(idx).is_some_and(|run| run.contains(&position))
    }

    /// Smallest member.
    pub fn min(&self) -> Option<u32> {
        self.runs.first().map(|run| *run.start())
    }

    /// Largest member.
    pub fn max(&self) -> Option<u32> {
        self.runs.last().map(|run| *run.end())
    }

    /// Disjoint runs in ascending order.
    pub fn runs(&self) -> &[RangeInclusive<u32>] {
        &self.runs
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.iter().flat_map(|run| run.clone())
    }
}
