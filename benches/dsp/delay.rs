//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use delayfx::dsp::delay::{AllpassDelay, DelayLine, LinearDelay};

use crate::{test_signal, BLOCK_SIZES};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_times: &[usize] = &[
        480,   // 10ms at 48kHz
        4800,  // 100ms at 48kHz
        48000, // 1 second at 48kHz
    ];

    for &size in BLOCK_SIZES {
        let input = test_signal(size);

        for &delay_samples in delay_times {
            let delay_ms = delay_samples / 48;

            let mut line = DelayLine::new(delay_samples, delay_samples);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("render_{delay_ms}ms"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        line.render(black_box(&mut buffer));
                    })
                },
            );
        }

        // Delay moved every sample, as in a chorus
        let mut linear = LinearDelay::new(480.0, 1024);
        group.bench_with_input(BenchmarkId::new("linear_modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for (i, &sample) in input.iter().enumerate() {
                    linear.set_delay(480.0 + (i as f64 * 0.1).sin() * 48.0);
                    sum += linear.tick(black_box(sample as f64));
                }
                sum
            })
        });

        let mut allpass = AllpassDelay::new(480.5, 1024);
        group.bench_with_input(BenchmarkId::new("allpass_fixed", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &sample in &input {
                    sum += allpass.tick(black_box(sample as f64));
                }
                sum
            })
        });
    }

    group.finish();
}
