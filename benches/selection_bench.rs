//! Performance benchmarks for weighted selection
//!
//! Targets:
//! - Uniform-weight draw over 1k candidates: <50µs
//! - Combined-score draw over 1k places: <100µs
//! - Feedback on a 1k option list: <10µs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use decider_core::{
    Coordinate, DecisionOption, Feedback, FeedbackEngine, Place, SelectionEngine, SelectionMode,
};

fn options(count: usize) -> Vec<DecisionOption> {
    (0..count)
        .map(|i| {
            let weight = (i % 10) as u32 + 1;
            DecisionOption::new(format!("option {}", i), vec![]).with_weight(weight)
        })
        .collect()
}

fn places(count: usize) -> Vec<Place> {
    (0..count)
        .map(|i| {
            Place::new(
                format!("place {}", i),
                (i * 37 % 60_000) as f64,
                (i % 5) as f64,
                Coordinate::new(43.65, -79.38),
                format!("place-{}", i),
            )
            .with_weight((i % 25) as u32 + 1)
        })
        .collect()
}

fn bench_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");

    for count in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(count as u64));

        let opts = options(count);
        let eligible: Vec<&DecisionOption> = opts.iter().collect();
        let id = BenchmarkId::new("by_weight", count);
        group.bench_with_input(id, &eligible, |b, eligible| {
            let mut engine = SelectionEngine::seeded(42);
            b.iter(|| black_box(engine.decide(black_box(eligible))));
        });

        let pls = places(count);
        let eligible: Vec<&Place> = pls.iter().collect();
        let id = BenchmarkId::new("combined_score", count);
        group.bench_with_input(id, &eligible, |b, eligible| {
            let mut engine = SelectionEngine::seeded(42);
            let mode = SelectionMode::CombinedScore;
            b.iter(|| black_box(engine.decide_place(black_box(eligible), mode)));
        });
    }

    group.finish();
}

fn bench_feedback(c: &mut Criterion) {
    let mut group = c.benchmark_group("feedback");
    group.throughput(Throughput::Elements(1));

    let mut opts = options(1_000);
    let target = opts[999].id;
    group.bench_function("apply_last_of_1000", |b| {
        b.iter(|| {
            let weight = FeedbackEngine::apply(&mut opts, black_box(&target), Feedback::Liked);
            black_box(weight);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decide, bench_feedback);

criterion_main!(benches);
