//! Per-hit strand orientation and foldback calls.
//!
//! Orientation is decided over all segments of a hit. Foldback detection
//! depends on orientation:
//!
//! - `AllReverse`: the normalized start offset places the read in the type-I
//!   band (near-terminal start) or the foldback band (start near the middle of
//!   the read). A foldback here refines *minus-strand*.
//! - `Mixed`: exactly one forward plus one reverse segment is a foldback, which
//!   refines *plus/minus hybrid*.
//! - `AllForward`: never a foldback.

use std::fmt;

use serde::Deserialize;

use crate::geometry::normalized_start_offset;
use crate::model::{Hit, Segment};

/// Strand state of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Every segment is forward.
    AllForward,
    /// Every segment is reverse.
    AllReverse,
    /// At least one forward and one reverse segment.
    Mixed,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Orientation::AllForward => "plus",
            Orientation::AllReverse => "minus",
            Orientation::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// Orientation of a segment list.
///
/// An empty list is vacuously `AllForward`; hits never carry one.
pub fn orientation_of(segments: &[Segment]) -> Orientation {
    let forward = segments.iter().any(|s| s.strand().is_forward());
    let reverse = segments.iter().any(|s| !s.strand().is_forward());
    match (forward, reverse) {
        (true, true) => Orientation::Mixed,
        (false, true) => Orientation::AllReverse,
        _ => Orientation::AllForward,
    }
}

/// Offset bands that subtype minus-strand reads.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FoldbackPolicy {
    /// Upper bound (inclusive) of the type-I band.
    pub type_one_max: f64,
    /// Lower bound (inclusive) of the foldback band.
    pub foldback_min: f64,
    /// Upper bound (inclusive) of the foldback band.
    pub foldback_max: f64,
}

impl Default for FoldbackPolicy {
    fn default() -> Self {
        Self {
            type_one_max: 0.05,
            foldback_min: 0.40,
            foldback_max: 0.53,
        }
    }
}

impl FoldbackPolicy {
    /// Near-terminal start.
    pub fn is_type_one(&self, offset: f64) -> bool {
        offset <= self.type_one_max
    }

    /// Start near the middle of the read.
    pub fn in_foldback_band(&self, offset: f64) -> bool {
        (self.foldback_min..=self.foldback_max).contains(&offset)
    }

    /// The two bands must be ordered and disjoint.
    pub fn is_consistent(&self) -> bool {
        self.type_one_max < self.foldback_min && self.foldback_min <= self.foldback_max
    }
}

/// Subtype of an all-reverse hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinusSubtype {
    /// Alignment starts at the read terminus.
    TypeOne,
    /// Alignment starts near the read midpoint (reverse-branch foldback).
    TypeTwo,
    /// Neither band.
    Untyped,
}

/// Strand-level verdict for one hit of one read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrandCall {
    /// Orientation over all segments.
    pub orientation: Orientation,
    /// First aligned read position over read length.
    pub normalized_start_offset: f64,
    /// Foldback by either the reverse or the mixed rule.
    pub foldback: bool,
    /// Mixed orientation.
    pub hybrid: bool,
    /// Set only for `AllReverse` hits.
    pub minus_subtype: Option<MinusSubtype>,
}

/// Decide orientation and foldback status for `hit` on a read of `read_length`.
pub fn call_strand(hit: &Hit, read_length: u32, policy: &FoldbackPolicy) -> StrandCall {
    let orientation = hit.orientation();
    let offset = normalized_start_offset(read_length, hit.segments());

    let (foldback, minus_subtype) = match orientation {
        Orientation::AllForward => (false, None),
        Orientation::AllReverse => {
            let subtype = if policy.in_foldback_band(offset) {
                MinusSubtype::TypeTwo
            } else if policy.is_type_one(offset) {
                MinusSubtype::TypeOne
            } else {
                MinusSubtype::Untyped
            };
            (subtype == MinusSubtype::TypeTwo, Some(subtype))
        }
        Orientation::Mixed => {
            let two_segment =
                hit.segment_count() == 2 && hit.forward_count() == 1 && hit.reverse_count() == 1;
            (two_segment, None)
        }
    };

    StrandCall {
        orientation,
        normalized_start_offset: offset,
        foldback,
        hybrid: orientation == Orientation::Mixed,
        minus_subtype,
    }
}
