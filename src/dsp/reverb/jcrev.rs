use super::{
    apply_reverb_message, comb_gain, scale_lengths, AllpassFilter, CombFilter, Reverb, ReverbCore,
};
use crate::control::EffectMessage;
use crate::dsp::context::{DesignCtx, REFERENCE_SAMPLE_RATE};
use crate::dsp::delay::DelayLine;
use crate::dsp::denormal::flush_denormal;
use crate::dsp::effect::{Effect, Frame};
use crate::error::Result;

/// Nominal lengths at 44.1 kHz: four combs, three allpasses, then the left
/// and right output delays.
pub const JCREV_LENGTHS: [usize; 9] = [1777, 1847, 1993, 2137, 389, 127, 43, 211, 179];

const DEFAULT_MIX: f64 = 0.3;

/// Chowning's reverberator.
///
/// ```text
/// in -> [AP] -> [AP] -> [AP] ──┬─→ [Comb] ──┐
///                              ├─→ [Comb] ──┤
///                              ├─→ [Comb] ──┼─→ (+) ─┬─→ [Delay L] → L
///                              └─→ [Comb] ──┘        └─→ [Delay R] → R
/// ```
///
/// The two output delays have different prime lengths, which is all the
/// stereo decorrelation there is.
#[derive(Debug, Clone)]
pub struct JcRev {
    core: ReverbCore,
    lengths: [usize; 9],
    allpasses: [AllpassFilter; 3],
    combs: [CombFilter; 4],
    out_left: DelayLine,
    out_right: DelayLine,
}

impl JcRev {
    pub fn new(ctx: DesignCtx, t60: f64) -> Result<Self> {
        let core = ReverbCore::new("JCRev", ctx, t60, DEFAULT_MIX)?;
        let t60 = core.t60;

        let lengths = scale_lengths(JCREV_LENGTHS, &ctx, REFERENCE_SAMPLE_RATE, true);
        log::debug!("JCRev: delay lengths {lengths:?} at {} Hz", ctx.sample_rate);

        Ok(Self {
            core,
            lengths,
            allpasses: std::array::from_fn(|i| AllpassFilter::new(lengths[i + 4])),
            combs: std::array::from_fn(|i| {
                CombFilter::new(lengths[i], comb_gain(lengths[i], t60, &ctx))
            }),
            out_left: DelayLine::new(lengths[7], lengths[7]),
            out_right: DelayLine::new(lengths[8], lengths[8]),
        })
    }
}

impl Reverb for JcRev {
    fn tick_stereo(&mut self, input: f64) -> Frame {
        let input = flush_denormal(input);

        let diffused = self
            .allpasses
            .iter_mut()
            .fold(input, |signal, allpass| allpass.process(signal));

        // Sum what goes into the combs, not what comes out.
        let summed: f64 = self.combs.iter_mut().map(|comb| comb.feed(diffused)).sum();
        let summed = flush_denormal(summed);

        let wet_left = self.out_left.tick(summed);
        let wet_right = self.out_right.tick(summed);
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

impl Effect for JcRev {
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
        self.out_left.clear();
        self.out_right.clear();
        self.core.clear();
    }

    fn apply(&mut self, msg: EffectMessage) {
        apply_reverb_message(self, msg)
    }
}
