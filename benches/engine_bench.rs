//! Benchmarks for the engine's render path.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use nucleotone::{Engine, EngineConfig, EngineParams, MutationState, Sequence};

/// Common output callback sizes.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

const SAMPLE_RATE: f32 = 48_000.0;

fn playing_engine(params: EngineParams) -> Engine {
    let (mut engine, mut handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());
    handle
        .play(Sequence::sanitize("ACGTACGTACGTACGT"), params)
        .expect("non-empty sequence");
    // Drain the play command so iterations measure steady-state rendering
    let mut warmup = vec![0.0f32; 512];
    engine.process_block(&mut warmup);
    engine
}

fn bench_process_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/process_block");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Idle: scheduler stopped, block is cleared and passed through
        let (mut idle, _handle) = Engine::new(SAMPLE_RATE, EngineConfig::default());
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.process_block(black_box(&mut buffer));
            })
        });

        // Single-note ticks
        let mut mono = playing_engine(EngineParams::default());
        group.bench_with_input(BenchmarkId::new("playing", size), &size, |b, _| {
            b.iter(|| {
                mono.process_block(black_box(&mut buffer));
            })
        });

        // Chorded ticks: two voices per trigger
        let chord_params = EngineParams {
            mutation: MutationState::new(0.0, 1.0, 0.8),
            ..Default::default()
        };
        let mut chords = playing_engine(chord_params);
        group.bench_with_input(BenchmarkId::new("chords", size), &size, |b, _| {
            b.iter(|| {
                chords.process_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process_block);
criterion_main!(benches);
