//! Reverb - Room Simulation via Delay Networks
//!
//! Three feedback networks built from [`DelayLine`]s: parallel comb filters
//! for the decaying tail, series allpass filters for diffusion.
//!
//! ## Comb Filters
//!
//! ```text
//! y[n] = x[n] + g * y[n - N - 1],    g = 10^(-3N / (T60 * sr))
//! ```
//!
//! Feedback reads the line's previous output, hence the extra sample. Each
//! comb gets its own gain so that every line loses 60 dB in `T60`
//! seconds regardless of its length.
//!
//! ## Allpass Filters
//!
//! ```text
//! v[n] = x[n] + 0.7 * v[n - N - 1]
//! y[n] = -0.7 * v[n] + v[n - N - 1]
//! ```
//!
//! ## Delay lengths
//!
//! Nominal lengths are tuned at a reference rate. At any other rate they are
//! scaled, forced odd, then bumped by 2 until prime, so no two lines share a
//! period and the comb resonances stay spread out.
//!
//! | topology  | network                                       | mix |
//! | --------- | --------------------------------------------- | --- |
//! | [`JcRev`] | 3 allpass -> 4 comb -> 2 output delays        | 0.3 |
//! | [`NRev`]  | 6 comb -> 3 allpass -> lowpass -> 1 + 2 allpass | 0.3 |
//! | [`PrcRev`]| 2 allpass -> 2 comb                           | 0.5 |

mod jcrev;
mod nrev;
mod prcrev;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use jcrev::{JcRev, JCREV_LENGTHS};
pub use nrev::{NRev, NREV_LENGTHS, NREV_REFERENCE_RATE};
pub use prcrev::{PrcRev, PRCREV_LENGTHS};

use crate::control::EffectMessage;
use crate::dsp::context::DesignCtx;
use crate::dsp::delay::DelayLine;
use crate::dsp::denormal::flush_denormal;
use crate::dsp::effect::{blend, clamp_unit, Effect, Frame};
use crate::error::{ConfigError, Result};

/// Feedback coefficient of every diffusion allpass.
pub const ALLPASS_COEFFICIENT: f64 = 0.7;

/// Primality by trial division over odd divisors up to `floor(sqrt(n)) + 1`.
pub fn is_prime(n: usize) -> bool {
    if n == 2 {
        return true;
    }
    if n & 1 == 0 {
        return false;
    }
    let limit = (n as f64).sqrt() as usize + 1;
    (3..limit).step_by(2).all(|i| n % i != 0)
}

/// Scale `nominal` by `scaler`, force it odd, then advance to the next prime.
pub fn prime_length(nominal: usize, scaler: f64) -> usize {
    let mut length = (scaler * nominal as f64).floor() as usize;
    if length & 1 == 0 {
        length += 1;
    }
    while !is_prime(length) {
        length += 2;
    }
    length
}

/// Rescale a table of nominal lengths tuned at `reference_rate`.
///
/// When `only_if_rescaled` is set and the context already runs at the
/// reference rate, the table is returned untouched.
pub(crate) fn scale_lengths<const N: usize>(
    nominal: [usize; N],
    ctx: &DesignCtx,
    reference_rate: f64,
    only_if_rescaled: bool,
) -> [usize; N] {
    let scaler = ctx.scaler(reference_rate);
    if only_if_rescaled && scaler == 1.0 {
        return nominal;
    }
    nominal.map(|n| prime_length(n, scaler))
}

/// Feedback gain giving a 60 dB decay over `t60` seconds for a line of `length`.
pub fn comb_gain(length: usize, t60: f64, ctx: &DesignCtx) -> f64 {
    10f64.powf(-3.0 * length as f64 / (t60 * ctx.sample_rate))
}

fn validate_t60(t60: f64) -> Result<f64> {
    if t60.is_finite() && t60 > 0.0 {
        Ok(t60)
    } else {
        Err(ConfigError::InvalidDecayTime(t60))
    }
}

/// Feedback comb over a fixed [`DelayLine`].
#[derive(Debug, Clone)]
pub struct CombFilter {
    line: DelayLine,
    coefficient: f64,
}

impl CombFilter {
    pub fn new(length: usize, coefficient: f64) -> Self {
        Self {
            line: DelayLine::new(length, length),
            coefficient,
        }
    }

    pub fn set_coefficient(&mut self, coefficient: f64) {
        self.coefficient = coefficient;
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn length(&self) -> usize {
        self.line.delay()
    }

    #[inline]
    fn summed(&self, input: f64) -> f64 {
        flush_denormal(input + self.coefficient * self.line.last_out())
    }

    /// Push `input` plus feedback and return the delayed output.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let sum = self.summed(input);
        self.line.tick(sum)
    }

    /// Push `input` plus feedback and return the value written to the line.
    #[inline]
    pub fn feed(&mut self, input: f64) -> f64 {
        let sum = self.summed(input);
        self.line.tick(sum);
        sum
    }

    pub fn reset(&mut self) {
        self.line.clear();
    }
}

/// Schroeder allpass over a fixed [`DelayLine`], coefficient
/// [`ALLPASS_COEFFICIENT`].
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    line: DelayLine,
}

impl AllpassFilter {
    pub fn new(length: usize) -> Self {
        Self {
            line: DelayLine::new(length, length),
        }
    }

    pub fn length(&self) -> usize {
        self.line.delay()
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let delayed = self.line.last_out();
        let sum = flush_denormal(ALLPASS_COEFFICIENT * delayed + input);
        self.line.tick(sum);
        -ALLPASS_COEFFICIENT * sum + delayed
    }

    pub fn reset(&mut self) {
        self.line.clear();
    }
}

/// Decay time, mix and last output shared by every topology.
#[derive(Debug, Clone)]
pub(crate) struct ReverbCore {
    name: &'static str,
    ctx: DesignCtx,
    t60: f64,
    mix: f64,
    last: Frame,
}

impl ReverbCore {
    fn new(name: &'static str, ctx: DesignCtx, t60: f64, mix: f64) -> Result<Self> {
        Ok(Self {
            name,
            ctx,
            t60: validate_t60(t60)?,
            mix,
            last: Frame::default(),
        })
    }

    fn set_mix(&mut self, mix: f64) {
        self.mix = clamp_unit(self.name, "effect mix", mix);
    }

    /// Returns whether `t60` was accepted.
    fn set_t60(&mut self, t60: f64) -> bool {
        match validate_t60(t60) {
            Ok(t60) => {
                self.t60 = t60;
                true
            }
            Err(err) => {
                log::warn!("{}: {err}, keeping {} s", self.name, self.t60);
                false
            }
        }
    }

    /// Blend both wet channels with the dry input and remember the frame.
    #[inline]
    fn output(&mut self, input: f64, wet_left: f64, wet_right: f64) -> Frame {
        self.last = Frame::new(
            blend(input, wet_left, self.mix),
            blend(input, wet_right, self.mix),
        );
        self.last
    }

    fn clear(&mut self) {
        self.last = Frame::default();
    }
}

/// Stereo reverberator.
///
/// [`Effect::tick`] returns the average of both channels; use
/// [`Reverb::tick_stereo`] to keep them apart.
pub trait Reverb: Effect {
    fn tick_stereo(&mut self, input: f64) -> Frame;

    fn last_frame(&self) -> Frame;

    fn last_out_left(&self) -> f64 {
        self.last_frame().left
    }

    fn last_out_right(&self) -> f64 {
        self.last_frame().right
    }

    /// Dry/wet balance, clamped to `[0, 1]`.
    fn set_effect_mix(&mut self, mix: f64);
    fn effect_mix(&self) -> f64;

    /// Re-derive every comb gain for a new decay time. Invalid values are
    /// logged and ignored.
    fn set_t60(&mut self, t60: f64);
    fn t60(&self) -> f64;

    /// Delay lengths in use, in the order of the nominal table.
    fn lengths(&self) -> &[usize];

    fn comb_gains(&self) -> Vec<f64>;
}

fn apply_reverb_message<R: Reverb + ?Sized>(reverb: &mut R, msg: EffectMessage) {
    match msg {
        EffectMessage::SetEffectMix(mix) => reverb.set_effect_mix(mix),
        EffectMessage::SetDecayTime(t60) => reverb.set_t60(t60),
        EffectMessage::Clear => reverb.clear(),
        other => log::debug!("reverb ignoring {other:?}"),
    }
}

impl Effect for Box<dyn Reverb> {
    fn tick(&mut self, input: f64) -> f64 {
        (**self).tick(input)
    }

    fn last_out(&self) -> f64 {
        (**self).last_out()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn apply(&mut self, msg: EffectMessage) {
        (**self).apply(msg)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverbTopology {
    JcRev,
    NRev,
    PrcRev,
}

impl ReverbTopology {
    pub const ALL: [ReverbTopology; 3] = [
        ReverbTopology::JcRev,
        ReverbTopology::NRev,
        ReverbTopology::PrcRev,
    ];

    pub fn build(self, ctx: DesignCtx, t60: f64) -> Result<Box<dyn Reverb>> {
        Ok(match self {
            ReverbTopology::JcRev => Box::new(JcRev::new(ctx, t60)?),
            ReverbTopology::NRev => Box::new(NRev::new(ctx, t60)?),
            ReverbTopology::PrcRev => Box::new(PrcRev::new(ctx, t60)?),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ReverbTopology::JcRev => "JCRev",
            ReverbTopology::NRev => "NRev",
            ReverbTopology::PrcRev => "PRCRev",
        }
    }
}
