use super::{
    apply_reverb_message, comb_gain, scale_lengths, AllpassFilter, CombFilter, Reverb, ReverbCore,
};
use crate::control::EffectMessage;
use crate::dsp::context::{DesignCtx, REFERENCE_SAMPLE_RATE};
use crate::dsp::effect::{Effect, Frame};
use crate::dsp::denormal::flush_denormal;
use crate::error::Result;

/// Nominal lengths at 44.1 kHz: two allpasses, then two combs.
pub const PRCREV_LENGTHS: [usize; 4] = [353, 1097, 1777, 2137];

const DEFAULT_MIX: f64 = 0.5;

/// Perry Cook's small reverberator. Each comb drives one channel directly.
///
/// ```text
/// in -> [AP] -> [AP] ─┬─→ [Comb] → L
///                     └─→ [Comb] → R
/// ```
#[derive(Debug, Clone)]
pub struct PrcRev {
    core: ReverbCore,
    lengths: [usize; 4],
    allpasses: [AllpassFilter; 2],
    combs: [CombFilter; 2],
}

impl PrcRev {
    pub fn new(ctx: DesignCtx, t60: f64) -> Result<Self> {
        let core = ReverbCore::new("PRCRev", ctx, t60, DEFAULT_MIX)?;
        let t60 = core.t60;

        let lengths = scale_lengths(PRCREV_LENGTHS, &ctx, REFERENCE_SAMPLE_RATE, true);
        log::debug!("PRCRev: delay lengths {lengths:?} at {} Hz", ctx.sample_rate);

        Ok(Self {
            core,
            lengths,
            allpasses: std::array::from_fn(|i| AllpassFilter::new(lengths[i])),
            combs: std::array::from_fn(|i| {
                CombFilter::new(lengths[i + 2], comb_gain(lengths[i + 2], t60, &ctx))
            }),
        })
    }
}

impl Reverb for PrcRev {
    fn tick_stereo(&mut self, input: f64) -> Frame {
        let input = flush_denormal(input);
        let first = self.allpasses[0].process(input);
        let diffused = self.allpasses[1].process(first);

        let wet_left = self.combs[0].process(diffused);
        let wet_right = self.combs[1].process(diffused);
        self.core.output(input, wet_left, wet_right)
    }

    fn last_frame(&self) -> Frame {
        self.core.last
    }

    fn set_effect_mix(&mut self, mix: f64) {
        self.core.set_mix(mix);
    }

    fn effect_mix(&self) -> f64 {
        self.core.mix
    }

    fn set_t60(&mut self, t60: f64) {
        if !self.core.set_t60(t60) {
            return;
        }
        for comb in &mut self.combs {
            comb.set_coefficient(comb_gain(comb.length(), t60, &self.core.ctx));
        }
    }

    fn t60(&self) -> f64 {
        self.core.t60
    }

    fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    fn comb_gains(&self) -> Vec<f64> {
        self.combs.iter().map(CombFilter::coefficient).collect()
    }
}

impl Effect for PrcRev {
    fn tick(&mut self, input: f64) -> f64 {
        self.tick_stereo(input).mono()
    }

    fn last_out(&self) -> f64 {
        self.core.last.mono()
    }

    fn clear(&mut self) {
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
        for comb in &mut self.combs {
            comb.reset();
        }
        self.core.clear();
    }

    fn apply(&mut self, msg: EffectMessage) {
        apply_reverb_message(self, msg)
    }
}
