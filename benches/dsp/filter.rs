//! Benchmarks for the two-pole filters and the biquad.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use delayfx::dsp::filter::{BiQuad, Filter, FilterKind};
use delayfx::DesignCtx;

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let Ok(ctx) = DesignCtx::new(SAMPLE_RATE) else {
        return;
    };

    for &size in BLOCK_SIZES {
        let input = test_signal(size);

        for kind in FilterKind::ALL {
            let mut filter = kind.build(ctx, 1_000.0, 2.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }

        // Cutoff swept every sample (worst case: redesign per sample)
        let mut sweep = FilterKind::ResonantLowPass.build(ctx, 1_000.0, 4.0);
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for (i, &sample) in input.iter().enumerate() {
                    sweep.set_freq(500.0 + i as f64 * 10.0);
                    sum += sweep.sample(black_box(sample as f64));
                }
                sum
            })
        });

        let mut biquad = BiQuad::new(ctx);
        biquad.set_resonance(1_000.0, 0.99, true);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("BiQuad", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                Filter::render(&mut biquad, black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
