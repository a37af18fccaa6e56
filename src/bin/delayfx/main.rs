//! delayfx - terminal auditioner for the effect library
//!
//! Run with: cargo run --release

mod app;
mod source;
mod ui;

use app::Auditioner;
use delayfx::dsp::filter::FilterKind;
use delayfx::dsp::reverb::ReverbTopology;
use delayfx::patch::EffectDescriptor;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    Auditioner::new()
        .effect(EffectDescriptor::Echo {
            max_delay: 44_100.0,
            delay: Some(13_230.0),
            mix: 0.4,
        })
        .effect(EffectDescriptor::Chorus {
            base_delay: 1_323.0,
            mod_depth: 0.5,
            mod_frequency: 0.25,
            mix: 0.5,
        })
        .effect(EffectDescriptor::PitchShift {
            shift: 1.5,
            mix: 0.5,
        })
        .effect(EffectDescriptor::Reverb {
            topology: ReverbTopology::JcRev,
            t60: 2.0,
            mix: 0.3,
        })
        .effect(EffectDescriptor::Reverb {
            topology: ReverbTopology::NRev,
            t60: 3.0,
            mix: 0.3,
        })
        .effect(EffectDescriptor::Reverb {
            topology: ReverbTopology::PrcRev,
            t60: 1.0,
            mix: 0.5,
        })
        .effect(EffectDescriptor::Filter {
            kind: FilterKind::ResonantLowPass,
            freq: 800.0,
            q: 4.0,
            gain: 1.0,
        })
        .run()
}
