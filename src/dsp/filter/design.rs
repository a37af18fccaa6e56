//! Closed-form coefficient design for the two-pole sections.
//!
//! Every function here is pure: the same context, frequency and Q always give
//! the same coefficients, so they can be checked in isolation.
//!
//! All sections share one recursion, `y0 = g*x + b1*y1 + b2*y2`, and differ in
//! where the input gain `g` is applied and which zeros feed the output. The
//! per-variant [`SectionDesign::step`] spells that out.

use std::f64::consts::SQRT_2;

use super::History;
use crate::dsp::context::DesignCtx;

/// Input/output scale `a0` and feedback terms `b1`, `b2`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectionCoeffs {
    pub a0: f64,
    pub b1: f64,
    pub b2: f64,
}

/// Coefficient design plus state update for one filter variant.
pub trait SectionDesign: Send + 'static {
    const NAME: &'static str;

    /// Whether Q takes part in the design.
    const USES_Q: bool = true;

    fn design(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs;

    /// Returns the new recursive state `y0` and the section output.
    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64);

    /// The Q the design actually realises for a requested `q`.
    fn effective_q(q: f64) -> f64 {
        q
    }
}

/// Smallest `1/Q` the resonant designs accept, bounding resonance at extreme Q.
pub const RESONANCE_FLOOR: f64 = 0.001;

/// 2nd-order Butterworth low-pass, unity gain at DC.
pub fn lowpass(ctx: &DesignCtx, freq: f64) -> SectionCoeffs {
    let pfreq = ctx.radians_per_sample(freq) * 0.5;
    let c = 1.0 / pfreq.tan();
    let c2 = c * c;
    let sqrt2c = c * SQRT_2;
    let a0 = 1.0 / (1.0 + sqrt2c + c2);
    SectionCoeffs {
        a0,
        b1: -2.0 * (1.0 - c2) * a0,
        b2: -(1.0 - sqrt2c + c2) * a0,
    }
}

/// 2nd-order Butterworth high-pass, unity gain at Nyquist.
pub fn highpass(ctx: &DesignCtx, freq: f64) -> SectionCoeffs {
    let pfreq = ctx.radians_per_sample(freq) * 0.5;
    let c = pfreq.tan();
    let c2 = c * c;
    let sqrt2c = c * SQRT_2;
    let a0 = 1.0 / (1.0 + sqrt2c + c2);
    SectionCoeffs {
        a0,
        b1: 2.0 * (1.0 - c2) * a0,
        b2: -(1.0 - sqrt2c + c2) * a0,
    }
}

/// Band-pass centred on `freq` with bandwidth `freq / q`, unity gain at the centre.
pub fn bandpass(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
    let pfreq = ctx.radians_per_sample(freq);
    let pbw = 1.0 / q * pfreq * 0.5;
    let c = 1.0 / pbw.tan();
    let d = 2.0 * pfreq.cos();
    let a0 = 1.0 / (1.0 + c);
    SectionCoeffs {
        a0,
        b1: c * d * a0,
        b2: (1.0 - c) * a0,
    }
}

/// Band-reject centred on `freq` with bandwidth `freq / q`.
///
/// Note the sign convention: `b1`/`b2` are subtracted in the recursion.
pub fn band_reject(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
    let pfreq = ctx.radians_per_sample(freq);
    let pbw = 1.0 / q * pfreq * 0.5;
    let c = pbw.tan();
    let d = 2.0 * pfreq.cos();
    let a0 = 1.0 / (1.0 + c);
    SectionCoeffs {
        a0,
        b1: -d * a0,
        b2: (1.0 - c) * a0,
    }
}

fn resonant_poles(ctx: &DesignCtx, freq: f64, q: f64) -> (f64, f64, f64) {
    let qres = (1.0 / q).max(RESONANCE_FLOOR);
    let pfreq = ctx.radians_per_sample(freq);
    let d = (pfreq * qres * 0.5).tan();
    let c = (1.0 - d) / (1.0 + d);
    let b1 = (1.0 + c) * pfreq.cos();
    (c, b1, -c)
}

/// Resonant low-pass. Cheaper pole placement than [`lowpass`], still unity at DC.
pub fn resonant_lowpass(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
    let (c, b1, b2) = resonant_poles(ctx, freq, q);
    SectionCoeffs {
        a0: (1.0 + c - b1) * 0.25,
        b1,
        b2,
    }
}

/// Resonant high-pass, unity at Nyquist.
pub fn resonant_highpass(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
    let (c, b1, b2) = resonant_poles(ctx, freq, q);
    SectionCoeffs {
        a0: (1.0 + c + b1) * 0.25,
        b1,
        b2,
    }
}

/// Two-pole resonator with zeros at +1 and -1, peak gain normalised to one
/// by `(1 - R^2) / 2`.
pub fn resonz(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
    let pfreq = ctx.radians_per_sample(freq);
    let bandwidth = pfreq / q;
    let r = 1.0 - bandwidth * 0.5;
    let r2 = 2.0 * r;
    let rr = r * r;
    // Pole angle corrected so the peak (not the pole) lands on `freq`.
    let cost = (r2 * pfreq.cos()) / (1.0 + rr);
    SectionCoeffs {
        a0: (1.0 - rr) * 0.5,
        b1: r2 * cost,
        b2: -rr,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LowPassDesign;
#[derive(Debug, Clone, Copy, Default)]
pub struct HighPassDesign;
#[derive(Debug, Clone, Copy, Default)]
pub struct BandPassDesign;
#[derive(Debug, Clone, Copy, Default)]
pub struct BandRejectDesign;
#[derive(Debug, Clone, Copy, Default)]
pub struct ResonantLowPassDesign;
#[derive(Debug, Clone, Copy, Default)]
pub struct ResonantHighPassDesign;
#[derive(Debug, Clone, Copy, Default)]
pub struct ResonZDesign;

impl SectionDesign for LowPassDesign {
    const NAME: &'static str = "LowPass";
    const USES_Q: bool = false;

    fn design(ctx: &DesignCtx, freq: f64, _q: f64) -> SectionCoeffs {
        lowpass(ctx, freq)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = input + c.b1 * h.y1 + c.b2 * h.y2;
        (y0, c.a0 * (y0 + 2.0 * h.y1 + h.y2))
    }
}

impl SectionDesign for HighPassDesign {
    const NAME: &'static str = "HighPass";
    const USES_Q: bool = false;

    fn design(ctx: &DesignCtx, freq: f64, _q: f64) -> SectionCoeffs {
        highpass(ctx, freq)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = input + c.b1 * h.y1 + c.b2 * h.y2;
        (y0, c.a0 * (y0 - 2.0 * h.y1 + h.y2))
    }
}

impl SectionDesign for BandPassDesign {
    const NAME: &'static str = "BandPass";

    fn design(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
        bandpass(ctx, freq, q)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = input + c.b1 * h.y1 + c.b2 * h.y2;
        (y0, c.a0 * (y0 - h.y2))
    }
}

impl SectionDesign for BandRejectDesign {
    const NAME: &'static str = "BandReject";

    fn design(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
        band_reject(ctx, freq, q)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = input - c.b1 * h.y1 - c.b2 * h.y2;
        (y0, c.a0 * (y0 + h.y2) + c.b1 * h.y1)
    }
}

impl SectionDesign for ResonantLowPassDesign {
    const NAME: &'static str = "ResonantLowPass";

    fn design(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
        resonant_lowpass(ctx, freq, q)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = c.a0 * input + c.b1 * h.y1 + c.b2 * h.y2;
        (y0, y0 + 2.0 * h.y1 + h.y2)
    }

    fn effective_q(q: f64) -> f64 {
        1.0 / (1.0 / q).max(RESONANCE_FLOOR)
    }
}

impl SectionDesign for ResonantHighPassDesign {
    const NAME: &'static str = "ResonantHighPass";

    fn design(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
        resonant_highpass(ctx, freq, q)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = c.a0 * input + c.b1 * h.y1 + c.b2 * h.y2;
        (y0, y0 - 2.0 * h.y1 + h.y2)
    }

    fn effective_q(q: f64) -> f64 {
        1.0 / (1.0 / q).max(RESONANCE_FLOOR)
    }
}

impl SectionDesign for ResonZDesign {
    const NAME: &'static str = "ResonZ";

    fn design(ctx: &DesignCtx, freq: f64, q: f64) -> SectionCoeffs {
        resonz(ctx, freq, q)
    }

    fn step(c: &SectionCoeffs, h: &History, input: f64) -> (f64, f64) {
        let y0 = input + c.b1 * h.y1 + c.b2 * h.y2;
        (y0, c.a0 * (y0 - h.y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-9;

    fn ctx() -> DesignCtx {
        DesignCtx::new(44_100.0).unwrap()
    }

    #[test]
    fn test_lowpass_matches_bilinear_butterworth() {
        let k = (PI * 1_000.0 / 44_100.0).tan();
        // Same section written in terms of K = tan(wc/2) instead of C = 1/K.
        let norm = k * k + SQRT_2 * k + 1.0;
        let expected_a0 = k * k / norm;
        let expected_b1 = -2.0 * (k * k - 1.0) / norm;
        let expected_b2 = -(k * k - SQRT_2 * k + 1.0) / norm;

        let c = lowpass(&ctx(), 1_000.0);
        assert_abs_diff_eq!(c.a0, expected_a0, epsilon = TOL);
        assert_abs_diff_eq!(c.b1, expected_b1, epsilon = TOL);
        assert_abs_diff_eq!(c.b2, expected_b2, epsilon = TOL);
    }

    #[test]
    fn test_highpass_matches_closed_form() {
        let c_term = (PI * 2_500.0 / 44_100.0).tan();
        let a0 = 1.0 / (1.0 + SQRT_2 * c_term + c_term * c_term);

        let c = highpass(&ctx(), 2_500.0);
        assert_abs_diff_eq!(c.a0, a0, epsilon = TOL);
        assert_abs_diff_eq!(c.b1, 2.0 * (1.0 - c_term * c_term) * a0, epsilon = TOL);
        assert_abs_diff_eq!(
            c.b2,
            -(1.0 - SQRT_2 * c_term + c_term * c_term) * a0,
            epsilon = TOL
        );
    }

    #[test]
    fn test_bandpass_matches_closed_form() {
        let w = 2.0 * PI * 440.0 / 44_100.0;
        let c_term = 1.0 / (w / 4.0 * 0.5).tan(); // Q = 4
        let a0 = 1.0 / (1.0 + c_term);

        let c = bandpass(&ctx(), 440.0, 4.0);
        assert_abs_diff_eq!(c.a0, a0, epsilon = TOL);
        assert_abs_diff_eq!(c.b1, c_term * 2.0 * w.cos() * a0, epsilon = TOL);
        assert_abs_diff_eq!(c.b2, (1.0 - c_term) * a0, epsilon = TOL);
    }

    #[test]
    fn test_band_reject_matches_closed_form() {
        let w = 2.0 * PI * 3_000.0 / 44_100.0;
        let c_term = (w / 2.0 * 0.5).tan(); // Q = 2
        let a0 = 1.0 / (1.0 + c_term);

        let c = band_reject(&ctx(), 3_000.0, 2.0);
        assert_abs_diff_eq!(c.a0, a0, epsilon = TOL);
        assert_abs_diff_eq!(c.b1, -2.0 * w.cos() * a0, epsilon = TOL);
        assert_abs_diff_eq!(c.b2, (1.0 - c_term) * a0, epsilon = TOL);
    }

    #[test]
    fn test_resonant_designs_match_closed_form() {
        let w = 2.0 * PI * 800.0 / 44_100.0;
        let d = (w * 0.5 * 0.5).tan(); // Q = 2 -> qres = 0.5
        let c_term = (1.0 - d) / (1.0 + d);
        let b1 = (1.0 + c_term) * w.cos();

        let lp = resonant_lowpass(&ctx(), 800.0, 2.0);
        assert_abs_diff_eq!(lp.b1, b1, epsilon = TOL);
        assert_abs_diff_eq!(lp.b2, -c_term, epsilon = TOL);
        assert_abs_diff_eq!(lp.a0, (1.0 + c_term - b1) * 0.25, epsilon = TOL);

        let hp = resonant_highpass(&ctx(), 800.0, 2.0);
        assert_abs_diff_eq!(hp.b1, b1, epsilon = TOL);
        assert_abs_diff_eq!(hp.a0, (1.0 + c_term + b1) * 0.25, epsilon = TOL);
    }

    #[test]
    fn test_resonance_is_bounded_at_extreme_q() {
        let huge = resonant_lowpass(&ctx(), 800.0, 1e9);
        let bounded = resonant_lowpass(&ctx(), 800.0, 5e6);
        assert_eq!(huge, bounded);
        assert_abs_diff_eq!(ResonantLowPassDesign::effective_q(1e9), 1000.0, epsilon = TOL);
        assert_abs_diff_eq!(ResonantHighPassDesign::effective_q(3.0), 3.0, epsilon = TOL);
    }

    #[test]
    fn test_resonz_matches_closed_form() {
        let w = 2.0 * PI * 220.0 / 44_100.0;
        let r = 1.0 - (w / 10.0) * 0.5;
        let c = resonz(&ctx(), 220.0, 10.0);
        assert_abs_diff_eq!(c.a0, (1.0 - r * r) * 0.5, epsilon = TOL);
        assert_abs_diff_eq!(c.b2, -r * r, epsilon = TOL);
        assert_abs_diff_eq!(c.b1, 2.0 * r * (2.0 * r * w.cos()) / (1.0 + r * r), epsilon = TOL);
    }

    #[test]
    fn test_design_follows_sample_rate() {
        let a = lowpass(&DesignCtx::new(44_100.0).unwrap(), 1_000.0);
        let b = lowpass(&DesignCtx::new(88_200.0).unwrap(), 2_000.0);
        assert_abs_diff_eq!(a.a0, b.a0, epsilon = TOL);
        assert_abs_diff_eq!(a.b1, b.b1, epsilon = TOL);
        assert_abs_diff_eq!(a.b2, b.b2, epsilon = TOL);
    }
}
