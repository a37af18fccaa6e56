//! Delay-line pitch shifter.
//!
//! Two read taps slide through a short window at a constant rate. A tap that
//! moves closer to the write head plays faster (pitch up); one that falls
//! behind plays slower (pitch down). When a tap reaches the edge of the window
//! it jumps back by one window length, and the jump is hidden by cross-fading
//! to the second tap, which always sits half a window away.
//!
//! ```text
//!   delay
//!   1012 ┤    ╱    ╱    tap 0 wraps every 1000 samples
//!    512 ┤  ╱    ╱      tap 1 = tap 0 + 500, wrapped the same way
//!     12 ┤╱    ╱
//!        └──────────→ t
//!
//!   env1 = |d0 - 512| * 0.002      env0 = 1 - env1
//! ```
//!
//! The envelope is 0 for tap 1 (and 1 for tap 0) when tap 0 sits at the centre
//! of the window, and swaps completely as tap 0 reaches either edge.

use crate::control::EffectMessage;
use crate::dsp::delay::LinearDelay;
use crate::dsp::effect::{blend, clamp_unit, Effect};

/// Capacity of each delay line.
pub const PITSHIFT_CAPACITY: usize = 1024;
/// Shortest delay either tap reaches.
pub const WINDOW_MIN: f64 = 12.0;
/// Longest delay either tap reaches.
pub const WINDOW_MAX: f64 = 1012.0;
/// Distance a tap jumps when it leaves the window.
pub const WINDOW_WRAP: f64 = 1000.0;
/// Tap 0 position where it carries the whole output.
pub const WINDOW_CENTRE: f64 = 512.0;
/// Offset between the two taps.
pub const HALF_CYCLE: f64 = 500.0;
/// Slope of the cross-fade, `1 / HALF_CYCLE`.
pub const ENVELOPE_SCALE: f64 = 0.002;

const DEFAULT_MIX: f64 = 0.5;

/// Fold a tap position back into `[WINDOW_MIN, WINDOW_MAX]`.
#[inline]
fn wrap_into_window(delay: f64) -> f64 {
    if delay > WINDOW_MAX {
        delay - WINDOW_WRAP * ((delay - WINDOW_MAX) / WINDOW_WRAP).ceil()
    } else if delay < WINDOW_MIN {
        delay + WINDOW_WRAP * ((WINDOW_MIN - delay) / WINDOW_WRAP).ceil()
    } else {
        delay
    }
}

/// Two-tap pitch shifter over a pair of [`LinearDelay`]s.
///
/// Tap positions are fractional and read with linear interpolation rather than
/// truncated to whole samples, so slow shifts glide instead of stepping. A new
/// shifter starts at unity (rate 0, tap 0 at the window centre) and passes the
/// input through a 512-sample delay until [`PitShift::set_shift`] is called.
#[derive(Debug, Clone)]
pub struct PitShift {
    lines: [LinearDelay; 2],
    delays: [f64; 2],
    shift: f64,
    rate: f64,
    mix: f64,
    last_out: f64,
}

impl PitShift {
    /// A shifter at unity (no pitch change).
    pub fn new() -> Self {
        let mut shifter = Self {
            lines: [
                LinearDelay::new(WINDOW_MIN, PITSHIFT_CAPACITY),
                LinearDelay::new(WINDOW_CENTRE, PITSHIFT_CAPACITY),
            ],
            delays: [WINDOW_MIN, WINDOW_CENTRE],
            shift: 1.0,
            rate: 0.0,
            mix: DEFAULT_MIX,
            last_out: 0.0,
        };
        shifter.set_shift(1.0);
        shifter
    }

    /// Pitch ratio: 2.0 is an octave up, 0.5 an octave down.
    ///
    /// Exactly 1.0 stops both taps and parks tap 0 at the window centre.
    pub fn set_shift(&mut self, shift: f64) {
        if !shift.is_finite() {
            log::warn!("PitShift: shift {shift} is not finite, keeping {}", self.shift);
            return;
        }
        self.shift = shift;
        self.rate = 1.0 - shift;
        if shift == 1.0 {
            self.delays[0] = WINDOW_CENTRE;
        }
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Samples each tap moves per tick.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Current positions of both taps.
    pub fn delays(&self) -> [f64; 2] {
        self.delays
    }

    pub fn set_effect_mix(&mut self, mix: f64) {
        self.mix = clamp_unit("PitShift", "effect mix", mix);
    }

    pub fn effect_mix(&self) -> f64 {
        self.mix
    }

    /// Cross-fade weights `[env0, env1]` for the current tap position.
    pub fn envelopes(&self) -> [f64; 2] {
        let env1 = (self.delays[0] - WINDOW_CENTRE).abs() * ENVELOPE_SCALE;
        [1.0 - env1, env1]
    }
}

impl Default for PitShift {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for PitShift {
    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        self.delays[0] = wrap_into_window(self.delays[0] + self.rate);
        self.delays[1] = wrap_into_window(self.delays[0] + HALF_CYCLE);

        self.lines[0].set_delay(self.delays[0]);
        self.lines[1].set_delay(self.delays[1]);

        let [env0, env1] = self.envelopes();
        let wet = env0 * self.lines[0].tick(input) + env1 * self.lines[1].tick(input);

        self.last_out = blend(input, wet, self.mix);
        self.last_out
    }

    fn last_out(&self) -> f64 {
        self.last_out
    }

    fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.last_out = 0.0;
    }

    fn apply(&mut self, msg: EffectMessage) {
        match msg {
            EffectMessage::SetEffectMix(mix) => self.set_effect_mix(mix),
            EffectMessage::SetShift(shift) => self.set_shift(shift),
            EffectMessage::Clear => self.clear(),
            other => log::debug!("PitShift ignoring {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_into_window() {
        assert_eq!(wrap_into_window(500.0), 500.0);
        assert_eq!(wrap_into_window(1012.0), 1012.0);
        assert_eq!(wrap_into_window(1013.0), 13.0);
        assert_eq!(wrap_into_window(2012.0), 1012.0);
        assert_eq!(wrap_into_window(11.0), 1011.0);
        assert_eq!(wrap_into_window(-988.0), 12.0);
        assert_eq!(wrap_into_window(5_000.5), 1000.5);
    }

    #[test]
    fn test_unity_shift_parks_at_centre() {
        let mut shifter = PitShift::new();
        assert_eq!(shifter.rate(), 0.0);
        for _ in 0..10 {
            shifter.tick(0.0);
        }
        assert_eq!(shifter.delays(), [WINDOW_CENTRE, WINDOW_MAX]);
        assert_eq!(shifter.envelopes(), [1.0, 0.0]);
    }

    #[test]
    fn test_unity_shift_is_a_pure_delay() {
        let mut shifter = PitShift::new();
        shifter.set_effect_mix(1.0);
        let out: Vec<f64> = (0..600)
            .map(|i| shifter.tick(if i == 0 { 1.0 } else { 0.0 }))
            .collect();
        assert_eq!(out[512], 1.0);
        assert_eq!(out.iter().filter(|s| **s != 0.0).count(), 1);
    }

    #[test]
    fn test_taps_stay_in_window_and_half_cycle_apart() {
        let mut shifter = PitShift::new();
        for shift in [0.5, 0.75, 1.5, 2.0] {
            shifter.set_shift(shift);
            assert_abs_diff_eq!(shifter.rate(), 1.0 - shift);
            for _ in 0..5_000 {
                shifter.tick(0.1);
                let [d0, d1] = shifter.delays();
                assert!((WINDOW_MIN..=WINDOW_MAX).contains(&d0), "{d0}");
                assert!((WINDOW_MIN..=WINDOW_MAX).contains(&d1), "{d1}");
                let gap = (d1 - d0).rem_euclid(WINDOW_WRAP);
                assert_abs_diff_eq!(gap, HALF_CYCLE, epsilon = 1e-6);
                let [env0, env1] = shifter.envelopes();
                assert_abs_diff_eq!(env0 + env1, 1.0, epsilon = 1e-12);
                assert!((0.0..=1.0).contains(&env1));
            }
        }
    }

    #[test]
    fn test_octave_up_doubles_frequency() {
        // Count zero crossings of a shifted sine against the input.
        let mut shifter = PitShift::new();
        shifter.set_shift(2.0);
        shifter.set_effect_mix(1.0);
        let freq = 100.0 / 44_100.0;
        let n = 44_100;
        let mut crossings = 0;
        let mut prev = 0.0;
        for i in 0..n {
            let x = (std::f64::consts::TAU * freq * i as f64).sin();
            let y = shifter.tick(x);
            if i > 2_000 && prev < 0.0 && y >= 0.0 {
                crossings += 1;
            }
            prev = y;
        }
        // About 200 upward crossings per second; the splice adds a few.
        assert!((180..=230).contains(&crossings), "{crossings}");
    }

    #[test]
    fn test_mix_endpoints() {
        let input: Vec<f64> = (0..3_000).map(|i| (i as f64 * 0.02).sin()).collect();

        let mut dry = PitShift::new();
        dry.set_shift(1.3);
        dry.set_effect_mix(0.0);
        for &x in &input {
            assert_eq!(dry.tick(x), x);
        }

        let mut wet = PitShift::new();
        wet.set_shift(0.7);
        wet.set_effect_mix(1.0);
        let mut lines = [
            LinearDelay::new(0.0, PITSHIFT_CAPACITY),
            LinearDelay::new(0.0, PITSHIFT_CAPACITY),
        ];
        let mut d0 = WINDOW_CENTRE;
        for &x in &input {
            d0 = wrap_into_window(d0 + (1.0 - 0.7));
            let d1 = wrap_into_window(d0 + HALF_CYCLE);
            lines[0].set_delay(d0);
            lines[1].set_delay(d1);
            let env1 = (d0 - WINDOW_CENTRE).abs() * ENVELOPE_SCALE;
            let expected = (1.0 - env1) * lines[0].tick(x) + env1 * lines[1].tick(x);
            assert_abs_diff_eq!(wet.tick(x), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_non_finite_shift_is_ignored() {
        let mut shifter = PitShift::new();
        shifter.set_shift(1.5);
        shifter.set_shift(f64::NAN);
        assert_eq!(shifter.shift(), 1.5);
        assert_abs_diff_eq!(shifter.rate(), -0.5);
    }

    #[test]
    fn test_messages() {
        let mut shifter = PitShift::new();
        shifter.apply(EffectMessage::SetShift(0.5));
        shifter.apply(EffectMessage::SetEffectMix(0.9));
        assert_eq!(shifter.shift(), 0.5);
        assert_eq!(shifter.effect_mix(), 0.9);
        shifter.tick(1.0);
        shifter.apply(EffectMessage::Clear);
        assert_eq!(shifter.last_out(), 0.0);
    }
}
