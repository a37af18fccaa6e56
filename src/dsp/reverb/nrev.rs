use super::{
    apply_reverb_message, comb_gain, scale_lengths, AllpassFilter, CombFilter, Reverb, ReverbCore,
};
use crate::control::EffectMessage;
use crate::dsp::context::DesignCtx;
use crate::dsp::denormal::flush_denormal;
use crate::dsp::effect::{Effect, Frame};
use crate::error::Result;

/// Rate the nominal lengths were tuned at.
pub const NREV_REFERENCE_RATE: f64 = 25_641.0;

/// Nominal lengths: six combs, then six allpasses.
pub const NREV_LENGTHS: [usize; 12] = [
    1433, 1601, 1867, 2053, 2251, 2399, 347, 113, 37, 59, 53, 43,
];

const DEFAULT_MIX: f64 = 0.3;

/// One-pole smoothing stage: `lp = 0.7 * lp + 0.3 * x`.
const LOWPASS_POLE: f64 = 0.7;
const LOWPASS_GAIN: f64 = 0.3;

/// CCRMA's NRev.
///
/// ```text
///      ┌─→ [Comb] x6 ─┐
/// in ──┤              ├─→ (+) → [AP] → [AP] → [AP] → [LP] → [AP] ─┬─→ [AP] → L
///      └─→   ...    ──┘                                           └─→ [AP] → R
/// ```
///
/// Lengths are always rescaled since no common rate matches the reference.
#[derive(Debug, Clone)]
pub struct NRev {
    core: ReverbCore,
    lengths: [usize; 12],
    combs: [CombFilter; 6],
    allpasses: [AllpassFilter; 6],
    lowpass_state: f64,
}

impl NRev {
    pub fn new(ctx: DesignCtx, t60: f64) -> Result<Self> {
        let core = ReverbCore::new("NRev", ctx, t60, DEFAULT_MIX)?;
        let t60 = core.t60;

        let lengths = scale_lengths(NREV_LENGTHS, &ctx, NREV_REFERENCE_RATE, false);
        log::debug!("NRev: delay lengths {lengths:?} at {} Hz", ctx.sample_rate);

        Ok(Self {
            core,
            lengths,
            combs: std::array::from_fn(|i| {
                CombFilter::new(lengths[i], comb_gain(lengths[i], t60, &ctx))
            }),
            allpasses: std::array::from_fn(|i| AllpassFilter::new(lengths[i + 6])),
            lowpass_state: 0.0,
        })
    }
}

impl Reverb for NRev {
    fn tick_stereo(&mut self, input: f64) -> Frame {
        let input = flush_denormal(input);

        let mut signal: f64 = self.combs.iter_mut().map(|comb| comb.process(input)).sum();

        for allpass in &mut self.allpasses[..3] {
            signal = allpass.process(signal);
        }

        self.lowpass_state =
            flush_denormal(LOWPASS_POLE * self.lowpass_state + LOWPASS_GAIN * signal);
        let diffused = self.allpasses[3].process(self.lowpass_state);

        let wet_left = self.allpasses[4].process(diffused);
        let wet_right = self.allpasses[5].process(diffused);
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

impl Effect for NRev {
    fn tick(&mut self, input: f64) -> f64 {
        self.tick_stereo(input).mono()
    }

    fn last_out(&self) -> f64 {
        self.core.last.mono()
    }

    fn clear(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
        self.lowpass_state = 0.0;
        self.core.clear();
    }

    fn apply(&mut self, msg: EffectMessage) {
        apply_reverb_message(self, msg)
    }
}
