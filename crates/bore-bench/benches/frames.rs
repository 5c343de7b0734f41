//! Criterion benchmarks for frame publication and reads.

use std::sync::Arc;

use bore_bench::reference_profile;
use bore_frame::FrameWriter;
use bore_grid::Classifier;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn reference_len() -> usize {
    Classifier::from_config(&reference_profile())
        .classify()
        .unwrap()
        .whole_grid_count()
}

/// Benchmark: publish one reference-sized pressure frame and rotate.
fn bench_publish(c: &mut Criterion) {
    let len = reference_len();
    let data = vec![0.25f32; len];
    let mut writer = FrameWriter::new(3, len).unwrap();

    c.bench_function("publish_reference_frame", |b| {
        b.iter(|| {
            black_box(writer.publish(black_box(&data)));
        });
    });
}

/// Benchmark: renderer-side read of the latest published frame.
fn bench_latest(c: &mut Criterion) {
    let len = reference_len();
    let mut writer = FrameWriter::new(3, len).unwrap();
    for i in 0..3 {
        writer.publish(&vec![i as f32; len]);
    }
    let frames = Arc::clone(writer.frames());

    c.bench_function("latest_reference_frame", |b| {
        b.iter(|| {
            let snapshot = frames.latest().unwrap();
            black_box(snapshot.data()[0]);
        });
    });
}

criterion_group!(benches, bench_publish, bench_latest);
criterion_main!(benches);
