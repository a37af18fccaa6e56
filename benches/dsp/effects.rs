//! Benchmarks for echo, chorus and pitch shifting.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use delayfx::dsp::chorus::Chorus;
use delayfx::dsp::echo::Echo;
use delayfx::dsp::pitch_shift::PitShift;
use delayfx::{DesignCtx, Effect};

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/effects");
    let Ok(ctx) = DesignCtx::new(SAMPLE_RATE) else {
        return;
    };

    for &size in BLOCK_SIZES {
        let input = test_signal(size);

        let mut effects: Vec<(&str, Box<dyn Effect>)> = Vec::new();
        if let Ok(echo) = Echo::new(SAMPLE_RATE) {
            effects.push(("echo", Box::new(echo)));
        }
        if let Ok(chorus) = Chorus::new(ctx, 1_440.0) {
            effects.push(("chorus", Box::new(chorus)));
        }
        let mut shifter = PitShift::new();
        shifter.set_shift(1.5);
        effects.push(("pitch_shift", Box::new(shifter)));

        for (name, mut effect) in effects {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    effect.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
