use std::f64::consts::TAU;

use super::{clamp_freq, Filter, History};
use crate::control::EffectMessage;
use crate::dsp::context::DesignCtx;
use crate::dsp::effect::Effect;

/// Two-pole, two-zero section with direct access to its poles and zeros.
///
/// ```text
/// y[n] = b0*g*x[n] + b1*g*x[n-1] + b2*g*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// `g` is the input gain. Resonance (poles) and notch (zeros) are set
/// independently, so one instance can carry both. A fresh section is the
/// identity.
#[derive(Debug, Clone)]
pub struct BiQuad {
    ctx: DesignCtx,
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    input_gain: f64,
    gain: f64,

    pole_freq: f64,
    pole_radius: f64,
    zero_freq: f64,
    zero_radius: f64,
    normalize: bool,

    x1: f64,
    x2: f64,
    history: History,
    last_out: f64,
}

impl BiQuad {
    pub fn new(ctx: DesignCtx) -> Self {
        Self {
            ctx,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            input_gain: 1.0,
            gain: 1.0,
            pole_freq: 0.0,
            pole_radius: 0.0,
            zero_freq: 0.0,
            zero_radius: 0.0,
            normalize: false,
            x1: 0.0,
            x2: 0.0,
            history: History::default(),
            last_out: 0.0,
        }
    }

    /// Place the poles at `freq` with `radius`.
    ///
    /// With `normalize`, the zeros go to +1 and -1 and the peak gain is
    /// scaled to roughly one.
    pub fn set_resonance(&mut self, freq: f64, radius: f64, normalize: bool) {
        self.pole_freq = clamp_freq("BiQuad", &self.ctx, freq);
        self.pole_radius = Self::clamp_pole_radius(radius);
        self.normalize = normalize;
        self.update_poles();
    }

    /// Place the zeros at `freq` with `radius`.
    pub fn set_notch(&mut self, freq: f64, radius: f64) {
        self.zero_freq = clamp_freq("BiQuad", &self.ctx, freq);
        self.zero_radius = Self::clamp_zero_radius(radius);
        self.update_zeros();
    }

    /// Zeros at +1 and -1, which gives equal gain at DC and Nyquist.
    pub fn set_equal_gain_zeroes(&mut self) {
        self.b0 = 1.0;
        self.b1 = 0.0;
        self.b2 = -1.0;
    }

    pub fn set_pole_freq(&mut self, freq: f64) {
        self.pole_freq = clamp_freq("BiQuad", &self.ctx, freq);
        self.update_poles();
    }

    pub fn set_pole_radius(&mut self, radius: f64) {
        self.pole_radius = Self::clamp_pole_radius(radius);
        self.update_poles();
    }

    pub fn set_zero_freq(&mut self, freq: f64) {
        self.zero_freq = clamp_freq("BiQuad", &self.ctx, freq);
        self.update_zeros();
    }

    pub fn set_zero_radius(&mut self, radius: f64) {
        self.zero_radius = Self::clamp_zero_radius(radius);
        self.update_zeros();
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
        self.update_poles();
    }

    pub fn pole_freq(&self) -> f64 {
        self.pole_freq
    }

    pub fn pole_radius(&self) -> f64 {
        self.pole_radius
    }

    pub fn zero_freq(&self) -> f64 {
        self.zero_freq
    }

    pub fn zero_radius(&self) -> f64 {
        self.zero_radius
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// Overwrite every coefficient. Nothing is checked.
    pub fn set_coefficients(&mut self, b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) {
        self.b0 = b0;
        self.b1 = b1;
        self.b2 = b2;
        self.a1 = a1;
        self.a2 = a2;
    }

    /// `[b0, b1, b2, a1, a2]`.
    pub fn coefficients(&self) -> [f64; 5] {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
    }

    pub fn set_b0(&mut self, b0: f64) {
        self.b0 = b0;
    }

    pub fn set_b1(&mut self, b1: f64) {
        self.b1 = b1;
    }

    pub fn set_b2(&mut self, b2: f64) {
        self.b2 = b2;
    }

    pub fn set_a1(&mut self, a1: f64) {
        self.a1 = a1;
    }

    pub fn set_a2(&mut self, a2: f64) {
        self.a2 = a2;
    }

    /// Scale applied to the input before the section.
    pub fn set_input_gain(&mut self, gain: f64) {
        self.input_gain = gain;
    }

    pub fn input_gain(&self) -> f64 {
        self.input_gain
    }

    /// `[y1, y2]`.
    pub fn state(&self) -> [f64; 2] {
        [self.history.y1, self.history.y2]
    }

    fn clamp_pole_radius(radius: f64) -> f64 {
        if radius > 1.0 {
            log::warn!("BiQuad: pole radius {radius} would be unstable, using 1.0");
            1.0
        } else if radius < 0.0 || radius.is_nan() {
            log::warn!("BiQuad: pole radius {radius} is negative, using 0.0");
            0.0
        } else {
            radius
        }
    }

    fn clamp_zero_radius(radius: f64) -> f64 {
        if radius < 0.0 || radius.is_nan() {
            log::warn!("BiQuad: zero radius {radius} is negative, using 0.0");
            0.0
        } else {
            radius
        }
    }

    fn update_poles(&mut self) {
        let r = self.pole_radius;
        self.a2 = r * r;
        self.a1 = -2.0 * r * (TAU * self.pole_freq / self.ctx.sample_rate).cos();

        if self.normalize {
            self.b0 = 0.5 - 0.5 * self.a2;
            self.b1 = 0.0;
            self.b2 = -self.b0;
        }
    }

    fn update_zeros(&mut self) {
        let r = self.zero_radius;
        self.b2 = r * r;
        self.b1 = -2.0 * r * (TAU * self.zero_freq / self.ctx.sample_rate).cos();
    }
}

impl Filter for BiQuad {
    #[inline]
    fn sample(&mut self, input: f64) -> f64 {
        let x0 = self.input_gain * input;
        let y0 = self.b0 * x0 + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.history.y1
            - self.a2 * self.history.y2;

        self.x2 = self.x1;
        self.x1 = x0;
        self.history.push(y0);

        self.last_out = y0 * self.gain;
        self.last_out
    }

    /// Moves the poles.
    fn set_freq(&mut self, hz: f64) {
        self.set_pole_freq(hz);
    }

    fn freq(&self) -> f64 {
        self.pole_freq
    }

    fn set_q(&mut self, q: f64) {
        log::debug!("BiQuad: ignoring Q {q}, set the pole radius instead");
    }

    fn q(&self) -> f64 {
        super::DEFAULT_Q
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
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.history.clear();
        self.last_out = 0.0;
    }
}

impl Effect for BiQuad {
    fn tick(&mut self, input: f64) -> f64 {
        self.sample(input)
    }

    fn last_out(&self) -> f64 {
        self.last_out
    }

    fn clear(&mut self) {
        Filter::clear(self)
    }

    fn apply(&mut self, msg: EffectMessage) {
        super::apply_filter_message(self, msg)
    }
}
