//! Low Frequency Oscillator (LFO) concepts.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. Here it drives
the delay length of a chorus, so the read tap sweeps back and forth and the
wet copy is detuned slightly sharp, then slightly flat.

Vocabulary
----------

  control-rate    Frequencies below human hearing: ~0.01 Hz to ~20 Hz.
                  These oscillators modulate parameters over time.

  bipolar         Output swings positive AND negative: -1.0 to +1.0

  unipolar        Output is only positive: 0.0 to 1.0
                  Convert: unipolar = (bipolar + 1.0) / 2.0

A delay length can't go negative, so the chorus maps the bipolar sine to a
unipolar sweep before scaling it:

    delay = base * depth * unipolar(lfo)

    lfo     unipolar   delay
    -1.0    0.0        0
     0.0    0.5        base * depth / 2
    +1.0    1.0        base * depth

Anything that produces a bounded periodic value can stand in for the sine;
implement [`ModulationSource`] for it.
*/

use std::f64::consts::TAU;

use crate::dsp::context::DesignCtx;

/// A periodic control signal in `[-1, 1]`, advanced once per audio sample.
pub trait ModulationSource: Send {
    fn tick(&mut self) -> f64;

    fn set_frequency(&mut self, hz: f64);

    fn frequency(&self) -> f64;
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f64) -> f64 {
    (bipolar + 1.0) * 0.5
}

/// Phase-accumulator sine starting at zero phase.
#[derive(Debug, Clone)]
pub struct SineLfo {
    ctx: DesignCtx,
    frequency: f64,
    phase: f64,
    increment: f64,
}

impl SineLfo {
    pub fn new(ctx: DesignCtx, frequency: f64) -> Self {
        let mut lfo = Self {
            ctx,
            frequency: 0.0,
            phase: 0.0,
            increment: 0.0,
        };
        lfo.set_frequency(frequency);
        lfo
    }

    /// Current phase in cycles, `[0, 1)`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl ModulationSource for SineLfo {
    #[inline]
    fn tick(&mut self) -> f64 {
        let value = (TAU * self.phase).sin();
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }

    fn set_frequency(&mut self, hz: f64) {
        let hz = if hz < 0.0 || !hz.is_finite() {
            log::warn!("SineLfo: frequency {hz} Hz is invalid, using 0");
            0.0
        } else {
            hz
        };
        self.frequency = hz;
        self.increment = hz / self.ctx.sample_rate;
    }

    fn frequency(&self) -> f64 {
        self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bipolar_to_unipolar() {
        assert_eq!(bipolar_to_unipolar(-1.0), 0.0);
        assert_eq!(bipolar_to_unipolar(0.0), 0.5);
        assert_eq!(bipolar_to_unipolar(1.0), 1.0);
    }

    #[test]
    fn test_sine_starts_at_zero_and_peaks_at_quarter_period() {
        let mut lfo = SineLfo::new(DesignCtx::new(1_000.0).unwrap(), 10.0);
        let out: Vec<f64> = (0..100).map(|_| lfo.tick()).collect();
        assert_eq!(out[0], 0.0);
        assert_abs_diff_eq!(out[25], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[75], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_output_is_bounded_and_phase_wraps() {
        let mut lfo = SineLfo::new(DesignCtx::default(), 7.3);
        for _ in 0..100_000 {
            let v = lfo.tick();
            assert!((-1.0..=1.0).contains(&v));
            assert!((0.0..1.0).contains(&lfo.phase()));
        }
    }

    #[test]
    fn test_invalid_frequency_stops_the_sweep() {
        let mut lfo = SineLfo::new(DesignCtx::default(), 1.0);
        lfo.set_frequency(-4.0);
        assert_eq!(lfo.frequency(), 0.0);
        lfo.set_frequency(f64::NAN);
        assert_eq!(lfo.frequency(), 0.0);
        assert_eq!(lfo.tick(), lfo.tick());
    }
}
