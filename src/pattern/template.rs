use serde::Deserialize;

use crate::geometry::within_tolerance;
use crate::model::{Segment, Strand};

/// Named reference-relative signature of a transcript or fragment.
///
/// Endpoints are reference coordinates in the direction of the template's
/// orientation: for a reverse template the 5′ endpoint is the larger
/// coordinate, matching how BLAST reports `hit_from` on minus-strand HSPs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    /// Label reported for matching reads.
    pub name: String,
    /// Strand the template applies to.
    pub orientation: Strand,
    /// Expected `hit_from` of the first segment.
    pub five_prime: u32,
    /// Expected `hit_to` of the last segment.
    pub three_prime: u32,
    /// Exact number of segments (1 or 2).
    #[serde(default = "one")]
    pub segment_count: usize,
    /// Slack allowed at the 5′ end.
    pub five_prime_tolerance: u32,
    /// Slack allowed at the 3′ end.
    pub three_prime_tolerance: u32,
    /// Unique covered positions must stay strictly below this (duplex only).
    #[serde(default)]
    pub max_footprint: Option<usize>,
}

fn one() -> usize {
    1
}

impl Template {
    /// One-segment template.
    pub fn single(
        name: &str,
        orientation: Strand,
        five_prime: u32,
        three_prime: u32,
        five_prime_tolerance: u32,
        three_prime_tolerance: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            orientation,
            five_prime,
            three_prime,
            segment_count: 1,
            five_prime_tolerance,
            three_prime_tolerance,
            max_footprint: None,
        }
    }

    /// Two-segment template with a footprint ceiling.
    pub fn duplex(
        name: &str,
        orientation: Strand,
        five_prime: u32,
        three_prime: u32,
        five_prime_tolerance: u32,
        three_prime_tolerance: u32,
        max_footprint: usize,
    ) -> Self {
        Self {
            segment_count: 2,
            max_footprint: Some(max_footprint),
            ..Self::single(
                name,
                orientation,
                five_prime,
                three_prime,
                five_prime_tolerance,
                three_prime_tolerance,
            )
        }
    }

    /// Test `ordered` (sorted by read start) against this template.
    ///
    /// `footprint` is the number of unique reference positions the hit covers.
    pub fn matches(&self, ordered: &[Segment], footprint: usize) -> bool {
        if ordered.len() != self.segment_count
            || ordered.iter().any(|segment| segment.strand() != self.orientation)
        {
            return false;
        }
        let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
            return false;
        };

        let ends_match = within_tolerance(first.hit_from(), self.five_prime, self.five_prime_tolerance)
            && within_tolerance(last.hit_to(), self.three_prime, self.three_prime_tolerance);

        match self.max_footprint {
            Some(ceiling) => ends_match && footprint < ceiling,
            None => ends_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(qf: u32, qt: u32, hf: u32, ht: u32) -> Segment {
        Segment::new(qf, qt, hf, ht, Strand::Forward).unwrap()
    }

    #[test]
    fn asymmetric_tolerances_are_independent() {
        let f281 = Template::single("F281", Strand::Forward, 1, 281, 30, 10);
        assert!(f281.matches(&[forward(1, 260, 31, 291)], 261));
        assert!(!f281.matches(&[forward(1, 260, 32, 291)], 260));
        assert!(!f281.matches(&[forward(1, 260, 31, 292)], 262));
    }

    #[test]
    fn duplex_rejects_whole_reference_traversal() {
        let drna = Template::duplex("DRNA", Strand::Forward, 1, 2692, 30, 10, 2000);
        let short = [forward(1, 900, 1, 900), forward(901, 1600, 1993, 2692)];
        let long = [forward(1, 1500, 1, 1500), forward(1501, 2500, 1693, 2692)];
        assert!(drna.matches(&short, 1600));
        assert!(!drna.matches(&long, 2500));
    }

    #[test]
    fn segment_count_and_strand_must_agree() {
        let full = Template::single("full-length", Strand::Forward, 1, 2692, 30, 10);
        let reverse = Segment::new(1, 2692, 2692, 1, Strand::Reverse).unwrap();
        assert!(!full.matches(&[reverse], 2692));
        assert!(!full.matches(&[forward(1, 10, 1, 10), forward(11, 20, 11, 2692)], 2692));
    }
}
