//! A typical send chain: chorus into echo into a reverb, built from
//! descriptors the way a host would load a preset.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use delayfx::dsp::reverb::ReverbTopology;
use delayfx::patch::{EffectChain, EffectDescriptor};
use delayfx::{DesignCtx, Effect};

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");
    let Ok(ctx) = DesignCtx::new(SAMPLE_RATE) else {
        return;
    };

    let preset = [
        EffectDescriptor::Chorus {
            base_delay: 1_440.0,
            mod_depth: 0.3,
            mod_frequency: 0.4,
            mix: 0.5,
        },
        EffectDescriptor::Echo {
            max_delay: SAMPLE_RATE,
            delay: Some(12_000.0),
            mix: 0.35,
        },
        EffectDescriptor::Reverb {
            topology: ReverbTopology::NRev,
            t60: 2.5,
            mix: 0.25,
        },
    ];

    for &size in BLOCK_SIZES {
        let input = test_signal(size);
        let Ok(mut chain) = EffectChain::from_descriptors(&preset, &ctx) else {
            return;
        };
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("chorus_echo_nrev", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                chain.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
