//! Geometric quantities derived from a hit's segments.
//!
//! Every pattern decision downstream is made on these values, never on raw
//! report order: segments are re-ordered by read position before any
//! "first"/"last" question is asked, and endpoints are compared with a
//! tolerance rather than for equality.

mod positions;

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::model::{Segment, Strand};

pub use positions::PositionSet;

/// Coordinates that contradict the declared strand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A forward segment runs backwards on the reference or vice versa.
    #[error("{strand} segment has contradictory reference coordinates hit_from={hit_from}, hit_to={hit_to}")]
    StrandContradiction {
        /// Declared strand.
        strand: Strand,
        /// Reference start as reported.
        hit_from: u32,
        /// Reference end as reported.
        hit_to: u32,
    },
}

/// Segments sorted ascending by `query_from`; ties keep input order.
pub fn ordered_by_segment_start(segments: &[Segment]) -> Vec<Segment> {
    let mut ordered = segments.to_vec();
    ordered.sort_by_key(|segment| segment.query_from());
    ordered
}

/// Inclusive reference interval covered by `segment`.
pub fn covered_reference_positions(
    segment: &Segment,
) -> Result<RangeInclusive<u32>, GeometryError> {
    let contradiction = match segment.strand() {
        Strand::Forward => segment.hit_from() > segment.hit_to(),
        Strand::Reverse => segment.hit_from() < segment.hit_to(),
    };
    if contradiction {
        return Err(GeometryError::StrandContradiction {
            strand: segment.strand(),
            hit_from: segment.hit_from(),
            hit_to: segment.hit_to(),
        });
    }
    Ok(match segment.strand() {
        Strand::Forward => segment.hit_from()..=segment.hit_to(),
        Strand::Reverse => segment.hit_to()..=segment.hit_from(),
    })
}

/// Union of the reference intervals of all segments.
pub fn unique_covered_positions(segments: &[Segment]) -> Result<PositionSet, GeometryError> {
    let ranges = segments
        .iter()
        .map(covered_reference_positions)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PositionSet::from_ranges(ranges))
}

/// Union of the read intervals of all segments.
pub fn unique_aligned_read_positions(segments: &[Segment]) -> PositionSet {
    PositionSet::from_ranges(
        segments
            .iter()
            .map(|segment| segment.query_from()..=segment.query_to()),
    )
}

/// `|a - b| <= max_diff`.
pub fn within_tolerance(a: u32, b: u32, max_diff: u32) -> bool {
    a.abs_diff(b) <= max_diff
}

/// Smallest `query_from` over the segments.
pub fn first_aligned_read_position(segments: &[Segment]) -> Option<u32> {
    ordered_by_segment_start(segments)
        .first()
        .map(|segment| segment.query_from())
}

/// Largest aligned read position over the segments.
pub fn max_query_position(segments: &[Segment]) -> Option<u32> {
    segments
        .iter()
        .map(|segment| segment.query_from().max(segment.query_to()))
        .max()
}

/// First aligned read position divided by the read length.
///
/// Returns `0.0` for an empty segment list.
pub fn normalized_start_offset(read_length: u32, segments: &[Segment]) -> f64 {
    match first_aligned_read_position(segments) {
        Some(first) if read_length > 0 => first as f64 / read_length as f64,
        _ => 0.0,
    }
}

/// Read positions not covered by any segment.
pub fn unaligned_read_positions(read_length: u32, segments: &[Segment]) -> u32 {
    let aligned = unique_aligned_read_positions(segments).len() as u32;
    read_length.saturating_sub(aligned)
}

/// Read sequence past the last aligned position.
pub fn extra_three_prime_length(read_length: u32, segments: &[Segment]) -> u32 {
    max_query_position(segments)
        .map(|last| read_length.saturating_sub(last))
        .unwrap_or(read_length)
}
