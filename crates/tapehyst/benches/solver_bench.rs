//! Benchmarks for the hysteresis solvers and the full processor
//!
//! Run with: cargo bench --bench solver_bench

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tapehyst::mode::MODE_NAMES;
use tapehyst::{AudioSetup, Buffer, ChannelState, HysteresisParams, HysteresisPlugin, ProcessorOptions, SolverKind};

const RATE: f64 = 48_000.0;
const BLOCK: usize = 512;

fn tone(len: usize, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|n| 0.7 * (2.0 * std::f64::consts::PI * 220.0 * n as f64 / sample_rate).sin())
        .collect()
}

/// Single-channel solver throughput at 2x oversampling
fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");
    let input = tone(2 * BLOCK, 2.0 * RATE);
    group.throughput(Throughput::Elements(input.len() as u64));

    for kind in SolverKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind.name()), &kind, |b, &kind| {
            let mut channel = ChannelState::new(2.0 * RATE);
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    acc += channel.process(kind, black_box(x));
                }
                black_box(acc)
            });
        });
    }

    group.finish();
}

/// Stereo block through the whole processor, lanes on and off
fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("processor");
    group.throughput(Throughput::Elements((2 * BLOCK) as u64));

    let input: Vec<f32> = tone(BLOCK, RATE).into_iter().map(|x| x as f32).collect();

    for mode in [0, 1, 3, 5] {
        for vectorize in [false, true] {
            let params = Arc::new(HysteresisParams::default());
            params.mode.set_index(mode);
            let mut processor = HysteresisPlugin::new(params)
                .with_options(ProcessorOptions { vectorize, ..Default::default() })
                .prepare(AudioSetup::new(RATE, BLOCK, 2))
                .unwrap();

            let label = format!("{}/{}", MODE_NAMES[mode], if vectorize { "lanes" } else { "planar" });
            group.bench_function(label, |b| {
                let mut left = vec![0.0f32; BLOCK];
                let mut right = vec![0.0f32; BLOCK];
                b.iter(|| {
                    let mut buffer = Buffer::new(
                        [&input[..], &input[..]],
                        [&mut left[..], &mut right[..]],
                        BLOCK,
                    );
                    processor.process(&mut buffer);
                    black_box(left[0])
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_solvers, bench_processor);
criterion_main!(benches);
