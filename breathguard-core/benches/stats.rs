//! Benchmarks for window statistics and breath detection
//!
//! Run with: cargo bench --package breathguard-core --bench stats

use breathguard_core::{
    config::{BreathConfig, WindowConfig},
    pipeline::BreathProcessor,
    sim::{BreathProfile, SimulatedSensor},
    stats::{RunningStats, WindowAnalyzer},
    traits::{BatchProcessor, SampleSource},
    Sample,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// One minute of simulated signal at `hz`, with a breath at 20 s
fn trace(hz: u32) -> Vec<Sample> {
    let period_us = 1_000_000 / u64::from(hz);
    let mut sensor = SimulatedSensor::new(1.0)
        .with_sample_rate_hz(hz)
        .with_noise(0.0005, 99)
        .with_breath(BreathProfile::new(20_000_000, 0.3));

    (0..u64::from(hz) * 60)
        .filter_map(|i| sensor.acquire().ok().map(|r| Sample::from_reading(i * period_us, r)))
        .collect()
}

fn bench_welford(c: &mut Criterion) {
    let mut group = c.benchmark_group("Welford");
    let values: Vec<f64> = trace(128).iter().map(Sample::volts).collect();

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("push", |b| {
        b.iter(|| {
            let mut stats = RunningStats::new();
            for &v in &values {
                stats.push(black_box(v));
            }
            black_box(stats.stddev())
        });
    });

    group.finish();
}

fn bench_window_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Window Analyzer");

    for &hz in &[128u32, 860] {
        let samples = trace(hz);
        let config = WindowConfig::default();

        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(BenchmarkId::new("push", hz), &samples, |b, samples| {
            b.iter(|| {
                let mut analyzer = WindowAnalyzer::new(config);
                let mut stable = 0usize;
                for s in samples {
                    analyzer.push(s.timestamp_us, s.volts(), |w| stable += w.stable as usize);
                }
                black_box(stable)
            });
        });
    }

    group.finish();
}

fn bench_breath_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("Breath Processor");
    let samples = trace(128);
    let breath = BreathConfig::default()
        .with_warmup_stable_windows(5)
        .with_cooldown_stable_windows(5);

    group.throughput(Throughput::Elements(samples.len() as u64));
    for &batch in &[8usize, 256] {
        group.bench_with_input(BenchmarkId::new("on_batch", batch), &batch, |b, &batch| {
            b.iter(|| {
                let mut processor = BreathProcessor::new(WindowConfig::default(), breath);
                for chunk in samples.chunks(batch) {
                    black_box(processor.on_batch(chunk));
                }
                processor.breaths()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_welford, bench_window_analyzer, bench_breath_processor);
criterion_main!(benches);
