//! Criterion benchmarks for grid classification.

use bore_bench::{reference_profile, stress_profile};
use bore_grid::Classifier;
use bore_test_utils::{horn_config, toned_box_config};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark: classify the 10 × 5 test horn.
fn bench_classify_small_horn(c: &mut Criterion) {
    let config = horn_config();

    c.bench_function("classify_small_horn", |b| {
        b.iter(|| {
            let layout = Classifier::from_config(black_box(&config)).classify().unwrap();
            black_box(layout.whole_grid_count());
        });
    });
}

/// Benchmark: classify the reference horn, including junction pairing.
fn bench_classify_reference(c: &mut Criterion) {
    let config = reference_profile();

    c.bench_function("classify_reference", |b| {
        b.iter(|| {
            let layout = Classifier::from_config(black_box(&config)).classify().unwrap();
            black_box(layout.junctions().tube_count());
        });
    });
}

/// Benchmark: classify the stress horn.
fn bench_classify_stress(c: &mut Criterion) {
    let config = stress_profile();

    c.bench_function("classify_stress", |b| {
        b.iter(|| {
            let layout = Classifier::from_config(black_box(&config)).classify().unwrap();
            black_box(layout.whole_grid_count());
        });
    });
}

/// Benchmark: classify a box with a tone-hole override.
fn bench_classify_tone_hole(c: &mut Criterion) {
    let config = toned_box_config();

    c.bench_function("classify_tone_hole", |b| {
        b.iter(|| {
            let layout = Classifier::from_config(black_box(&config)).classify().unwrap();
            black_box(layout.whole_grid_count());
        });
    });
}

criterion_group!(
    benches,
    bench_classify_small_horn,
    bench_classify_reference,
    bench_classify_stress,
    bench_classify_tone_hole
);
criterion_main!(benches);
