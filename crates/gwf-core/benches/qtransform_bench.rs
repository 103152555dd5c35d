//! Benchmarks for the audit kernels
//!
//! Run with: cargo bench -p gwf-core --bench qtransform_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gwf_core::asymmetry::AsymmetryScorer;
use gwf_core::filter::bandpass;
use gwf_core::qtransform::{PeakExtractor, QTransformConfig};
use gwf_core::types::TimeSeries;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use std::time::Duration;

/// 8 s of unit noise with a 150 Hz sine-Gaussian at the centre.
fn strain(fs: f64) -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let samples = (0..(8.0 * fs) as usize)
        .map(|i| {
            let t = i as f64 / fs - 4.0;
            normal.sample(&mut rng) + 3.0 * (-(t / 0.05).powi(2)).exp() * (2.0 * PI * 150.0 * t).sin()
        })
        .collect();
    TimeSeries::new(samples, fs, 0.0)
}

// ============================================================================
// Q-transform
// ============================================================================

fn bench_peak_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("peak_extraction");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for fs in [1024.0, 4096.0] {
        let series = strain(fs);
        let extractor = PeakExtractor::new(QTransformConfig::default());
        group.throughput(Throughput::Elements(series.len() as u64));
        group.bench_with_input(BenchmarkId::new("extract", fs as u64), &series, |b, s| {
            b.iter(|| extractor.extract(black_box(s), (3.5, 5.5), (20.0, 500.0)))
        });
    }

    group.finish();
}

fn bench_time_bins(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_bins");
    group.sample_size(10);

    let series = strain(1024.0);
    for bins in [250usize, 1000] {
        let extractor = PeakExtractor::new(QTransformConfig {
            time_bins: bins,
            ..Default::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(bins), &series, |b, s| {
            b.iter(|| extractor.q_transform(black_box(s), (3.5, 5.5), (20.0, 500.0)))
        });
    }

    group.finish();
}

// ============================================================================
// Symmetry scoring
// ============================================================================

fn bench_symmetry_chain(c: &mut Criterion) {
    let series = strain(4096.0);
    let scorer = AsymmetryScorer::default();

    c.bench_function("bandpass_4096x8", |b| {
        b.iter(|| bandpass(black_box(&series), 35.0, 350.0))
    });

    c.bench_function("asymmetry_score_4096", |b| {
        let samples = &series.samples[..4096];
        b.iter(|| scorer.score(black_box(samples)))
    });
}

criterion_group!(
    name = qtransform_benches;
    config = Criterion::default();
    targets = bench_peak_extraction, bench_time_bins
);

criterion_group!(
    name = symmetry_benches;
    config = Criterion::default();
    targets = bench_symmetry_chain
);

criterion_main!(qtransform_benches, symmetry_benches);
