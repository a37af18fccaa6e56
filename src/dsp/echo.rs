use crate::control::EffectMessage;
use crate::dsp::delay::{DelayLine, MAX_DELAY_LENGTH};
use crate::dsp::effect::{blend, clamp_unit, Effect};
use crate::error::{ConfigError, Result};

const DEFAULT_MIX: f64 = 0.5;

/// Extra slots allocated past the requested longest delay.
const HEADROOM: usize = 2;

/// Single-tap echo over a fixed [`DelayLine`].
///
/// `output = mix * delayed + (1 - mix) * input`
///
/// The line holds `max_delay + 2` samples of history. The delay starts at half
/// of that (or `max_delay` if smaller) and is always a whole number of samples.
#[derive(Debug, Clone)]
pub struct Echo {
    line: DelayLine,
    length: usize,
    max_delay: f64,
    mix: f64,
    last_out: f64,
}

impl Echo {
    /// `max_delay` is the longest delay in samples.
    pub fn new(max_delay: f64) -> Result<Self> {
        let max_delay = validate_max_delay(max_delay)?;
        let length = max_delay as usize + HEADROOM;
        let mut echo = Self {
            line: DelayLine::new(length / 2, length),
            length,
            max_delay,
            mix: DEFAULT_MIX,
            last_out: 0.0,
        };
        echo.set_delay(((length / 2) as f64).min(max_delay));
        Ok(echo)
    }

    /// Reallocate for a new longest delay, keeping the current delay if it
    /// still fits. Allocates.
    pub fn set_max_delay(&mut self, max_delay: f64) -> Result<()> {
        let max_delay = validate_max_delay(max_delay)?;
        let delay = (self.line.delay() as f64).min(max_delay);

        self.length = max_delay as usize + HEADROOM;
        self.max_delay = max_delay;
        self.line = DelayLine::new(self.length / 2, self.length);
        self.last_out = 0.0;
        self.set_delay(delay);
        Ok(())
    }

    /// Delay in samples, rounded to the nearest whole sample and clamped to
    /// `[0, max_delay + 2]`.
    pub fn set_delay(&mut self, delay: f64) {
        let size = if delay < 0.0 || delay.is_nan() {
            log::warn!("Echo: set_delay({delay}) is less than zero, using 0");
            0.0
        } else if delay > self.length as f64 {
            log::warn!(
                "Echo: set_delay({delay}) is greater than the delay length, using {}",
                self.length
            );
            self.length as f64
        } else {
            delay
        };
        self.line.set_delay(size.round() as usize);
    }

    pub fn delay(&self) -> usize {
        self.line.delay()
    }

    pub fn max_delay(&self) -> f64 {
        self.max_delay
    }

    pub fn set_effect_mix(&mut self, mix: f64) {
        self.mix = clamp_unit("Echo", "effect mix", mix);
    }

    pub fn effect_mix(&self) -> f64 {
        self.mix
    }
}

fn validate_max_delay(max_delay: f64) -> Result<f64> {
    if max_delay.is_finite() && (0.0..=MAX_DELAY_LENGTH as f64).contains(&max_delay) {
        Ok(max_delay)
    } else {
        Err(ConfigError::InvalidLength {
            what: "echo max delay",
            value: max_delay,
        })
    }
}

impl Effect for Echo {
    #[inline]
    fn tick(&mut self, input: f64) -> f64 {
        let delayed = self.line.tick(input);
        self.last_out = blend(input, delayed, self.mix);
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
            EffectMessage::SetDelay(delay) => self.set_delay(delay),
            EffectMessage::Clear => self.clear(),
            other => log::debug!("Echo ignoring {other:?}"),
        }
    }
}
