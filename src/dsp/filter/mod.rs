//! Second-order recursive filters.
//!
//! ```text
//! | type              | alias                | passes            | unity gain at |
//! | ----------------- | -------------------- | ----------------- | ------------- |
//! | low-pass          | LowPass              | below cutoff      | DC            |
//! | high-pass         | HighPass             | above cutoff      | Nyquist       |
//! | band-pass         | BandPass             | around centre     | centre        |
//! | band-reject       | BandReject           | outside the band  | DC            |
//! | resonant low-pass | ResonantLowPass      | below cutoff + Q  | DC            |
//! | resonant high-pass| ResonantHighPass     | above cutoff + Q  | Nyquist       |
//! | resonator         | ResonZ               | around centre     | centre        |
//! | two-pole two-zero | BiQuad               | user defined      |               |
//! ```
//!
//! The seven fixed designs are one generic [`TwoPole`] section parametrised by
//! a [`SectionDesign`]. [`BiQuad`] exposes poles and zeros directly.

mod biquad;
pub mod design;

use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use biquad::BiQuad;
pub use design::{
    BandPassDesign, BandRejectDesign, HighPassDesign, LowPassDesign, ResonZDesign,
    ResonantHighPassDesign, ResonantLowPassDesign, SectionCoeffs, SectionDesign,
};

use crate::control::EffectMessage;
use crate::dsp::context::DesignCtx;
use crate::dsp::denormal::flush_denormal;
use crate::dsp::effect::Effect;

/// Lowest frequency any design accepts.
pub const MIN_FREQ_HZ: f64 = 0.01;
/// Highest frequency any design accepts, as a fraction of the sample rate.
pub const MAX_FREQ_RATIO: f64 = 0.499;
pub const MIN_Q: f64 = 0.001;
pub const DEFAULT_Q: f64 = 1.0;

/// The two most recent recursive states of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct History {
    pub y1: f64,
    pub y2: f64,
}

impl History {
    /// Shift in a new state. Both registers are flushed so a decaying section
    /// settles on exact zero.
    ///
    /// Poles very close to the unit circle (Q in the tens and up, or a BiQuad
    /// radius near 1) may not get there: a flush near a zero crossing puts back
    /// about as much as one period of decay removes, and the state hovers
    /// around 1e-13 instead.
    #[inline]
    pub fn push(&mut self, y0: f64) {
        self.y2 = flush_denormal(self.y1);
        self.y1 = flush_denormal(y0);
    }

    pub fn clear(&mut self) {
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Common controls of every filter variant.
pub trait Filter: Send {
    fn sample(&mut self, input: f64) -> f64;

    fn set_freq(&mut self, hz: f64);
    fn freq(&self) -> f64;

    /// Variants without a Q ignore this.
    fn set_q(&mut self, q: f64);
    fn q(&self) -> f64;

    /// Output scale applied after the section.
    fn set_gain(&mut self, gain: f64);
    fn gain(&self) -> f64;

    fn last_out(&self) -> f64;
    fn clear(&mut self);

    fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.sample(*sample as f64) as f32;
        }
    }
}

pub(crate) fn clamp_freq(owner: &str, ctx: &DesignCtx, hz: f64) -> f64 {
    let max = ctx.sample_rate * MAX_FREQ_RATIO;
    if hz < MIN_FREQ_HZ || hz.is_nan() {
        log::warn!("{owner}: frequency {hz} Hz too low, using {MIN_FREQ_HZ}");
        MIN_FREQ_HZ
    } else if hz > max {
        log::warn!("{owner}: frequency {hz} Hz too close to Nyquist, using {max}");
        max
    } else {
        hz
    }
}

pub(crate) fn clamp_q(owner: &str, q: f64) -> f64 {
    if q < MIN_Q || q.is_nan() {
        log::warn!("{owner}: Q {q} too small, using {MIN_Q}");
        MIN_Q
    } else {
        q
    }
}

/// A two-pole section whose coefficients come from `D`.
#[derive(Debug, Clone)]
pub struct TwoPole<D: SectionDesign> {
    ctx: DesignCtx,
    freq: f64,
    q: f64,
    gain: f64,
    coeffs: SectionCoeffs,
    history: History,
    last_out: f64,
    _design: PhantomData<D>,
}

pub type LowPass = TwoPole<LowPassDesign>;
pub type HighPass = TwoPole<HighPassDesign>;
pub type BandPass = TwoPole<BandPassDesign>;
pub type BandReject = TwoPole<BandRejectDesign>;
pub type ResonantLowPass = TwoPole<ResonantLowPassDesign>;
pub type ResonantHighPass = TwoPole<ResonantHighPassDesign>;
pub type ResonZ = TwoPole<ResonZDesign>;

impl<D: SectionDesign> TwoPole<D> {
    pub fn new(ctx: DesignCtx, freq: f64, q: f64) -> Self {
        let freq = clamp_freq(D::NAME, &ctx, freq);
        let q = clamp_q(D::NAME, q);
        Self {
            ctx,
            freq,
            q,
            gain: 1.0,
            coeffs: D::design(&ctx, freq, q),
            history: History::default(),
            last_out: 0.0,
            _design: PhantomData,
        }
    }

    /// A section at `freq` with [`DEFAULT_Q`].
    pub fn with_freq(ctx: DesignCtx, freq: f64) -> Self {
        Self::new(ctx, freq, DEFAULT_Q)
    }

    pub fn coefficients(&self) -> SectionCoeffs {
        self.coeffs
    }

    /// `[y1, y2]`.
    pub fn state(&self) -> [f64; 2] {
        [self.history.y1, self.history.y2]
    }

    /// Q the design actually uses after its own bounding.
    pub fn effective_q(&self) -> f64 {
        D::effective_q(self.q)
    }

    fn redesign(&mut self) {
        self.coeffs = D::design(&self.ctx, self.freq, self.q);
    }
}

impl<D: SectionDesign> Filter for TwoPole<D> {
    #[inline]
    fn sample(&mut self, input: f64) -> f64 {
        let (y0, out) = D::step(&self.coeffs, &self.history, input);
        self.history.push(y0);
        self.last_out = out * self.gain;
        self.last_out
    }

    fn set_freq(&mut self, hz: f64) {
        self.freq = clamp_freq(D::NAME, &self.ctx, hz);
        self.redesign();
    }

    fn freq(&self) -> f64 {
        self.freq
    }

    fn set_q(&mut self, q: f64) {
        if !D::USES_Q {
            log::debug!("{}: ignoring Q {q}", D::NAME);
            return;
        }
        self.q = clamp_q(D::NAME, q);
        self.redesign();
    }

    fn q(&self) -> f64 {
        self.q
    }

    fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    fn gain(&self) -> f64 {
        self.gain
    }

    fn last_out(&self) -> f64 {
        self.last_out
    }

    fn clear(&mut self) {
        self.history.clear();
        self.last_out = 0.0;
    }
}

fn apply_filter_message<F: Filter + ?Sized>(filter: &mut F, msg: EffectMessage) {
    match msg {
        EffectMessage::SetFreq(hz) => filter.set_freq(hz),
        EffectMessage::SetQ(q) => filter.set_q(q),
        EffectMessage::Clear => filter.clear(),
        other => log::debug!("filter ignoring {other:?}"),
    }
}

impl<D: SectionDesign> Effect for TwoPole<D> {
    fn tick(&mut self, input: f64) -> f64 {
        self.sample(input)
    }

    fn last_out(&self) -> f64 {
        Filter::last_out(self)
    }

    fn clear(&mut self) {
        Filter::clear(self)
    }

    fn apply(&mut self, msg: EffectMessage) {
        apply_filter_message(self, msg)
    }
}

impl Effect for Box<dyn Filter> {
    fn tick(&mut self, input: f64) -> f64 {
        (**self).sample(input)
    }

    fn last_out(&self) -> f64 {
        (**self).last_out()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn apply(&mut self, msg: EffectMessage) {
        apply_filter_message(&mut **self, msg)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
    BandReject,
    ResonantLowPass,
    ResonantHighPass,
    ResonZ,
}

impl FilterKind {
    pub const ALL: [FilterKind; 7] = [
        FilterKind::LowPass,
        FilterKind::HighPass,
        FilterKind::BandPass,
        FilterKind::BandReject,
        FilterKind::ResonantLowPass,
        FilterKind::ResonantHighPass,
        FilterKind::ResonZ,
    ];

    pub fn build(self, ctx: DesignCtx, freq: f64, q: f64) -> Box<dyn Filter> {
        match self {
            FilterKind::LowPass => Box::new(LowPass::new(ctx, freq, q)),
            FilterKind::HighPass => Box::new(HighPass::new(ctx, freq, q)),
            FilterKind::BandPass => Box::new(BandPass::new(ctx, freq, q)),
            FilterKind::BandReject => Box::new(BandReject::new(ctx, freq, q)),
            FilterKind::ResonantLowPass => Box::new(ResonantLowPass::new(ctx, freq, q)),
            FilterKind::ResonantHighPass => Box::new(ResonantHighPass::new(ctx, freq, q)),
            FilterKind::ResonZ => Box::new(ResonZ::new(ctx, freq, q)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::LowPass => LowPassDesign::NAME,
            FilterKind::HighPass => HighPassDesign::NAME,
            FilterKind::BandPass => BandPassDesign::NAME,
            FilterKind::BandReject => BandRejectDesign::NAME,
            FilterKind::ResonantLowPass => ResonantLowPassDesign::NAME,
            FilterKind::ResonantHighPass => ResonantHighPassDesign::NAME,
            FilterKind::ResonZ => ResonZDesign::NAME,
        }
    }
}
