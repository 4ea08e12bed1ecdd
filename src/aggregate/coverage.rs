//! Read depth per reference position over a set of classifications.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::Classification;

/// Depth of coverage as runs of constant, non-zero depth.
///
/// Runs are ascending and disjoint; adjacent runs always differ in depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageProfile {
    runs: Vec<(RangeInclusive<u32>, usize)>,
}

impl CoverageProfile {
    /// Number of selected reads covering `position`.
    pub fn depth_at(&self, position: u32) -> usize {
        let idx = self.runs.partition_point(|(run, _)| *run.end() < position);
        match self.runs.get(idx) {
            Some((run, depth)) if run.contains(&position) => *depth,
            _ => 0,
        }
    }

    /// `(positions, depth)` runs in ascending order.
    pub fn runs(&self) -> &[(RangeInclusive<u32>, usize)] {
        &self.runs
    }

    /// Highest depth anywhere.
    pub fn max_depth(&self) -> usize {
        self.runs.iter().map(|(_, depth)| *depth).max().unwrap_or(0)
    }

    /// Returns `true` when no position is covered.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Per-position read depth over the reads selected by `keep`.
///
/// Each read counts once per position, however many of its segments overlap there.
pub fn coverage_by_position<'a, I, F>(classifications: I, keep: F) -> CoverageProfile
where
    I: IntoIterator<Item = &'a Classification>,
    F: Fn(&Classification) -> bool,
{
    let deltas = classifications
        .into_iter()
        .filter(|c| keep(c))
        .flat_map(|c| c.covered.runs().iter())
        .fold(BTreeMap::<u64, i64>::new(), |mut deltas, run| {
            *deltas.entry(u64::from(*run.start())).or_insert(0) += 1;
            *deltas.entry(u64::from(*run.end()) + 1).or_insert(0) -= 1;
            deltas
        });

    let mut runs: Vec<(RangeInclusive<u32>, usize)> = Vec::new();
    let mut depth = 0i64;
    let mut boundaries = deltas.into_iter().peekable();
    while let Some((start, delta)) = boundaries.next() {
        depth += delta;
        let Some(&(next, _)) = boundaries.peek() else {
            break;
        };
        if depth <= 0 {
            continue;
        }
        // Boundaries above u32::MAX only close runs, so `start` always fits.
        let run = start as u32..=(next - 1) as u32;
        let depth = depth as usize;
        match runs.last_mut() {
            Some((last, last_depth))
                if *last_depth == depth && u64::from(*last.end()) + 1 == start =>
            {
                *last = *last.start()..=*run.end();
            }
            _ => runs.push((run, depth)),
        }
    }

    CoverageProfile { runs }
}
