//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use readclass::model::{RawHit, RawItem, RawSearch, RawSegment};
use readclass::{Classifier, ClassifierConfig};

fn report(reads: usize) -> Vec<RawItem> {
    (0..reads as i64)
        .map(|i| {
            let start = 1 + (i * 31) % 400;
            let segments = if i % 3 == 0 {
                vec![
                    RawSegment::new(start, start + 500, 1, 501, "Plus"),
                    RawSegment::new(start + 520, start + 900, 500, 120, "Minus"),
                ]
            } else {
                vec![RawSegment::new(start, start + 1200, 1 + i % 30, 1201 + i % 30, "Plus")]
            };
            RawSearch::new(&format!("read-{i}"), 1600, vec![RawHit::new("CY1", segments)]).into()
        })
        .collect()
}

fn benchmark_classify_batch(c: &mut Criterion) {
    let items = report(10_000);
    let mut group = c.benchmark_group("classify_batch");
    for threads in [1, 4] {
        let classifier = match Classifier::new(ClassifierConfig::cy1().with_threads(threads)) {
            Ok(classifier) => classifier,
            Err(err) => panic!("classifier setup failed: {err}"),
        };
        group.bench_with_input(BenchmarkId::from_parameter(threads), &items, |b, items| {
            b.iter(|| black_box(classifier.classify_batch(items).processed()));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_classify_batch);
criterion_main!(benches);
