use std::collections::HashSet;

use blake3::hash;
use readclass::io::{parse_blast_json, render_classifications_tsv};
use readclass::model::{RawHit, RawItem, RawSearch, RawSegment};
use readclass::{Classifier, ClassifierConfig};

fn synthetic_report(reads: usize) -> Vec<RawItem> {
    (0..reads)
        .map(|i| {
            let i = i as i64;
            let start = 1 + (i * 37) % 480;
            let segments = match i % 4 {
                0 => vec![RawSegment::new(start, start + 900, 1 + i % 40, 901 + i % 40, "Plus")],
                1 => vec![RawSegment::new(start, start + 400, 2900 - i % 50, 2500 - i % 50, "Minus")],
                2 => vec![
                    RawSegment::new(start, start + 300, 100, 400, "Plus"),
                    RawSegment::new(start + 320, start + 600, 390, 110, "Minus"),
                ],
                _ => vec![RawSegment::new(start, start + 280, 281, 2, "Minus")],
            };
            let reference = if i % 2 == 0 { "CY1" } else { "CY2" };
            RawSearch::new(&format!("read-{i:05}"), 1000 + (i * 13) % 900, vec![RawHit::new(reference, segments)]).into()
        })
        .collect()
}

#[test]
fn batch_output_is_identical_across_thread_counts() {
    let items = synthetic_report(500);

    let mut fingerprints = HashSet::new();
    for threads in [1, 2, 4, 0] {
        let classifier = Classifier::new(ClassifierConfig::default().with_threads(threads))
            .expect("classifier initialises");
        let batch = classifier.classify_batch(&items);
        assert_eq!(batch.rejected_count(), 0);
        let table = render_classifications_tsv(&batch.classifications).expect("rendering succeeds");
        fingerprints.insert(hash(table.as_bytes()));
    }

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}

#[test]
fn batch_preserves_input_order() {
    let items = synthetic_report(64);
    let classifier = Classifier::new(ClassifierConfig::any_reference().with_threads(3))
        .expect("classifier initialises");
    let batch = classifier.classify_batch(&items);

    let ids: Vec<_> = batch.classifications.iter().map(|c| c.read_id.clone()).collect();
    let expected: Vec<_> = (0..64).map(|i| format!("read-{i:05}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn reparsing_the_same_report_gives_the_same_items() {
    let json = include_str!("fixtures/cy1_report.json");
    let first = parse_blast_json(json).expect("fixture parses");
    let second = parse_blast_json(json).expect("fixture parses");
    assert_eq!(first, second);
}
