use std::collections::HashSet;

use proptest::prelude::*;
use readclass::geometry::{
    covered_reference_positions, ordered_by_segment_start, unique_covered_positions,
};
use readclass::strand::orientation_of;
use readclass::{FoldbackPolicy, Orientation, Segment, Strand};

fn segment() -> impl Strategy<Value = Segment> {
    (1u32..2000, 0u32..600, 1u32..3000, 0u32..600, any::<bool>()).prop_map(
        |(query_from, query_len, ref_start, ref_len, forward)| {
            let (hit_from, hit_to, strand) = if forward {
                (ref_start, ref_start + ref_len, Strand::Forward)
            } else {
                (ref_start + ref_len, ref_start, Strand::Reverse)
            };
            Segment::new(query_from, query_from + query_len, hit_from, hit_to, strand)
                .expect("generated segment is valid")
        },
    )
}

proptest! {
    #[test]
    fn orientation_is_exclusive(segments in proptest::collection::vec(segment(), 1..8)) {
        let forward = segments.iter().filter(|s| s.strand() == Strand::Forward).count();
        let expected = match (forward, segments.len() - forward) {
            (_, 0) => Orientation::AllForward,
            (0, _) => Orientation::AllReverse,
            _ => Orientation::Mixed,
        };
        prop_assert_eq!(orientation_of(&segments), expected);
    }

    #[test]
    fn covered_range_length_matches_span(segment in segment()) {
        let range = covered_reference_positions(&segment).expect("consistent strand");
        let span = segment.hit_from().abs_diff(segment.hit_to()) + 1;
        prop_assert_eq!(range.clone().count() as u32, span);
        prop_assert!(range.start() <= range.end());
    }

    #[test]
    fn union_ignores_order_and_duplicates(
        (segments, shuffled) in proptest::collection::vec(segment(), 1..8)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let union = unique_covered_positions(&segments).expect("consistent strand");

        let naive: HashSet<u32> = segments
            .iter()
            .flat_map(|s| covered_reference_positions(s).expect("consistent strand"))
            .collect();
        prop_assert_eq!(union.len(), naive.len());
        prop_assert!(naive.iter().all(|&p| union.contains(p)));
        prop_assert_eq!(union.min(), naive.iter().copied().min());
        prop_assert_eq!(union.max(), naive.iter().copied().max());

        prop_assert_eq!(&unique_covered_positions(&shuffled).expect("consistent strand"), &union);

        let mut doubled = segments.clone();
        doubled.extend(shuffled.iter().copied());
        prop_assert_eq!(&unique_covered_positions(&doubled).expect("consistent strand"), &union);
    }

    #[test]
    fn ordering_is_stable_and_sorted(segments in proptest::collection::vec(segment(), 0..10)) {
        let ordered = ordered_by_segment_start(&segments);
        prop_assert_eq!(ordered.len(), segments.len());
        prop_assert!(ordered.windows(2).all(|w| w[0].query_from() <= w[1].query_from()));

        // Equal starts keep their original relative order.
        for pair in ordered.windows(2).filter(|w| w[0].query_from() == w[1].query_from()) {
            let first = segments.iter().position(|s| *s == pair[0]);
            let second = segments.iter().rposition(|s| *s == pair[1]);
            prop_assert!(first <= second);
        }
        prop_assert_eq!(ordered_by_segment_start(&ordered), ordered);
    }

    #[test]
    fn default_bands_never_overlap(offset in 0.0f64..1.0) {
        let policy = FoldbackPolicy::default();
        prop_assert!(!(policy.is_type_one(offset) && policy.in_foldback_band(offset)));
    }
}
