use crate::control::EffectMessage;
use crate::dsp::context::DesignCtx;
use crate::dsp::delay::{LinearDelay, MAX_DELAY_LENGTH};
use crate::dsp::effect::{blend, clamp_unit, Effect};
use crate::dsp::lfo::{bipolar_to_unipolar, ModulationSource, SineLfo};
use crate::error::{ConfigError, Result};

/*
Chorus Effect
=============

Chorus thickens a sound by mixing the dry signal with a delayed copy whose
delay length is swept by a slow oscillator. As the read tap moves, the wet
copy is pitched slightly up or down, which reads as several players on the
same part.

Every sample:

    delay  = base * depth * (1 + lfo) / 2
    output = (1 - mix) * input + mix * line(input)

Parameters
----------

Base delay (samples):
  Centre of the sweep scale. The line is allocated for
  base + base * headroom samples, so base * depth must stay inside that.

Mod depth (0.5 default):
  Fraction of the base delay the tap sweeps over.

Mod frequency (0.25 Hz default):
  Speed of the sweep. Slower = subtle shimmer, faster = vibrato-like wobble.

Mix (0.5 default):
  Dry/wet blend.
*/

pub const DEFAULT_MOD_DEPTH: f64 = 0.5;
pub const DEFAULT_MOD_FREQUENCY: f64 = 0.25;

/// Extra sweep room allocated at construction, as a multiple of the base delay.
pub const DEFAULT_HEADROOM: f64 = 4.0;

const DEFAULT_MIX: f64 = 0.5;

/// Modulated delay chorus. Generic over the modulation source, [`SineLfo`]
/// by default.
#[derive(Debug, Clone)]
pub struct Chorus<M: ModulationSource = SineLfo> {
    line: LinearDelay,
    modulator: M,
    base_delay: f64,
    mod_depth: f64,
    mix: f64,
    last_out: f64,
}

impl Chorus {
    /// `base_delay` in samples, swept by a sine at [`DEFAULT_MOD_FREQUENCY`].
    pub fn new(ctx: DesignCtx, base_delay: f64) -> Result<Self> {
        Chorus::with_modulator(base_delay, SineLfo::new(ctx, DEFAULT_MOD_FREQUENCY))
    }
}

impl<M: ModulationSource> Chorus<M> {
    pub fn with_modulator(base_delay: f64, modulator: M) -> Result<Self> {
        let base_delay = validate_base_delay(base_delay)?;
        let mut chorus = Self {
            line: allocate(base_delay, DEFAULT_HEADROOM)?,
            modulator,
            base_delay,
            mod_depth: 0.0,
            mix: DEFAULT_MIX,
            last_out: 0.0,
        };
        chorus.set_mod_depth(DEFAULT_MOD_DEPTH);
        Ok(chorus)
    }

    /// Reallocate the line for `base_delay` with `headroom` times the base of
    /// extra sweep room, and silence it. Allocates.
    pub fn reset(&mut self, base_delay: f64, headroom: f64) -> Result<()> {
        let base_delay = validate_base_delay(base_delay)?;
        let headroom = if headroom < 0.0 || !headroom.is_finite() {
            log::warn!("Chorus: headroom {headroom} is invalid, using 0");
            0.0
        } else {
            headroom
        };
        self.line = allocate(base_delay, headroom)?;
        self.base_delay = base_delay;
        self.last_out = 0.0;
        self.set_mod_depth(self.mod_depth);
        Ok(())
    }

    /// Longest delay the sweep may reach.
    fn sweep_limit(&self) -> f64 {
        self.line.max_delay() as f64
    }

    /// Sets the scale of the sweep. Keeps `base * depth` within the line.
    pub fn set_base_delay(&mut self, base_delay: f64) {
        let limit = self.sweep_limit();
        self.base_delay = if base_delay < 0.0 || base_delay.is_nan() {
            log::warn!("Chorus: base delay {base_delay} is less than zero, using 0");
            0.0
        } else if self.mod_depth > 0.0 && base_delay * self.mod_depth > limit {
            let clamped = limit / self.mod_depth;
            log::warn!("Chorus: base delay {base_delay} sweeps past the line, using {clamped}");
            clamped
        } else {
            base_delay
        };
    }

    pub fn base_delay(&self) -> f64 {
        self.base_delay
    }

    pub fn set_mod_depth(&mut self, depth: f64) {
        let limit = self.sweep_limit();
        self.mod_depth = if depth < 0.0 || depth.is_nan() {
            log::warn!("Chorus: mod depth {depth} is less than zero, using 0");
            0.0
        } else if self.base_delay > 0.0 && depth * self.base_delay > limit {
            let clamped = limit / self.base_delay;
            log::warn!("Chorus: mod depth {depth} sweeps past the line, using {clamped}");
            clamped
        } else {
            depth
        };
    }

    pub fn mod_depth(&self) -> f64 {
        self.mod_depth
    }

    pub fn set_mod_frequency(&mut self, hz: f64) {
        self.modulator.set_frequency(hz);
    }

    pub fn mod_frequency(&self) -> f64 {
        self.modulator.frequency()
    }

    pub fn set_effect_mix(&mut self, mix: f64) {
        self.mix = clamp_unit("Chorus", "effect mix", mix);
    }

    pub fn effect_mix(&self) -> f64 {
        self.mix
    }

    /// Current (modulated) delay of the line.
    pub fn current_delay(&self) -> f64 {
        self.line.delay()
    }

    pub fn modulator(&self) -> &M {
        &self.modulator
    }
}

fn validate_base_delay(base_delay: f64) -> Result<f64> {
    if base_delay.is_finite() && base_delay >= 0.0 {
        Ok(base_delay)
    } else {
        Err(ConfigError::InvalidLength {
            what: "chorus base delay",
            value: base_delay,
        })
    }
}

fn allocate(base_delay: f64, headroom: f64) -> Result<LinearDelay> {
    let span = base_delay + base_delay * headroom;
    if span > (MAX_DELAY_LENGTH - 2) as f64 {
        return Err(ConfigError::InvalidLength {
            what: "chorus sweep span",
            value: span,
        });
    }
    Ok(LinearDelay::new(base_delay.floor(), span as usize + 2))
}

impl<M: ModulationSource> Effect for Chorus<M> {
    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        let sweep = bipolar_to_unipolar(self.modulator.tick());
        self.line.set_delay(self.base_delay * self.mod_depth * sweep);
        let wet = self.line.tick(input);
        self.last_out = blend(input, wet, self.mix);
        self.last_out
    }

    fn last_out(&self) -> f64 {
        self.last_out
    }

    fn clear(&mut self) {
        self.line.clear();
        self.last_out = 0.0;
    }

    fn apply(&mut self, msg: EffectMessage) {
        match msg {
            EffectMessage::SetEffectMix(mix) => self.set_effect_mix(mix),
            EffectMessage::SetDelay(delay) => self.set_base_delay(delay),
            EffectMessage::SetModDepth(depth) => self.set_mod_depth(depth),
            EffectMessage::SetModFrequency(hz) => self.set_mod_frequency(hz),
            EffectMessage::Clear => self.clear(),
            other => log::debug!("Chorus ignoring {other:?}"),
        }
    }
}
