//! Benchmarks for the delay-based primitives and effect chains.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Delay lines, filters, reverberators and single effects
//!   - scenarios/*  Effect chains built from descriptors

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

/// Sample rate every benchmark runs at.
pub const SAMPLE_RATE: f64 = 48_000.0;

/// A block of test signal: a short ramp-down impulse over a quiet sine.
pub fn test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            if i < 10 {
                1.0 - i as f32 / 10.0
            } else {
                (i as f32 * 0.05).sin() * 0.1
            }
        })
        .collect()
}

criterion_group!(
    benches,
    dsp::bench_delay,
    dsp::bench_filter,
    dsp::bench_reverb,
    dsp::bench_effects,
    scenarios::bench_chain,
);
criterion_main!(benches);
