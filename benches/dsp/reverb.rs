//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use delayfx::dsp::reverb::{Reverb, ReverbTopology};
use delayfx::DesignCtx;

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let Ok(ctx) = DesignCtx::new(SAMPLE_RATE) else {
        return;
    };

    for &size in BLOCK_SIZES {
        let input = test_signal(size);

        for topology in ReverbTopology::ALL {
            let Ok(mut reverb) = topology.build(ctx, 2.0) else {
                continue;
            };
            group.bench_with_input(BenchmarkId::new(topology.name(), size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for &sample in &input {
                        sum += reverb.tick_stereo(black_box(sample as f64)).left;
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}
