//! Benchmarks for the sample ring
//!
//! Run with: cargo bench --package breathguard-core --bench ring

use std::thread;

use breathguard_core::{queue::SampleRing, Sample};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Push then pop one sample on an otherwise empty ring
fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ring Push/Pop");
    group.throughput(Throughput::Elements(1));

    let mut ring = SampleRing::<Sample, 4096>::new();
    let (mut producer, mut consumer) = ring.split();
    let sample = Sample::new(0, 1234, 1.0);

    group.bench_function("push_pop", |b| {
        b.iter(|| {
            producer.push(black_box(sample));
            black_box(consumer.pop())
        });
    });

    group.bench_function("push_overwrite_full", |b| {
        while producer.push(sample) {}
        b.iter(|| producer.push_overwrite(black_box(sample)));
    });

    group.finish();
}

/// Drain a filled ring in batches of different sizes
fn bench_pop_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ring Drain");

    for &batch in &[16usize, 64, 256] {
        let mut ring = SampleRing::<Sample, 4096>::new();
        let (mut producer, mut consumer) = ring.split();
        let mut out = vec![Sample::default(); batch];

        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("pop_batch", batch), &batch, |b, &batch| {
            b.iter(|| {
                for i in 0..batch as u64 {
                    producer.push(Sample::new(i, 0, 1.0));
                }
                black_box(consumer.pop_batch(&mut out, batch))
            });
        });
    }

    group.finish();
}

/// Producer and consumer on separate threads
fn bench_cross_thread(c: &mut Criterion) {
    const COUNT: u64 = 100_000;

    let mut group = c.benchmark_group("Ring Cross-Thread");
    group.throughput(Throughput::Elements(COUNT));
    group.sample_size(20);

    group.bench_function("spsc_transfer", |b| {
        b.iter(|| {
            let mut ring = SampleRing::<Sample, 1024>::new();
            let (mut producer, mut consumer) = ring.split();

            thread::scope(|s| {
                s.spawn(|| {
                    for i in 0..COUNT {
                        while !producer.push(Sample::new(i, 0, 1.0)) {
                            std::hint::spin_loop();
                        }
                    }
                });

                let mut received = 0u64;
                let mut out = [Sample::default(); 64];
                while received < COUNT {
                    received += consumer.pop_batch(&mut out, out.len()) as u64;
                }
                black_box(received)
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_pop_batch, bench_cross_thread);
criterion_main!(benches);
