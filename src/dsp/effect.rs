use crate::control::EffectMessage;

/// A stereo sample pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub right: f64,
}

impl Frame {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Average of both channels.
    #[inline]
    pub fn mono(&self) -> f64 {
        (self.left + self.right) * 0.5
    }
}

/// Core trait for per-sample processors.
///
/// `tick` must be called once per sample, in time order, from a single audio
/// thread. Nothing here allocates or blocks.
pub trait Effect: Send {
    fn tick(&mut self, input: f64) -> f64;

    /// The value most recently returned by `tick`.
    fn last_out(&self) -> f64;

    /// Return to silence without touching parameters.
    fn clear(&mut self);

    /// Process a block of host samples in place.
    fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample as f64) as f32;
        }
    }

    /// Apply a control-path parameter change.
    ///
    /// Default implementation ignores the message.
    fn apply(&mut self, msg: EffectMessage) {
        log::debug!("ignoring {msg:?}: not supported by this effect");
    }
}

/// Allow boxed effects to be used as effects (for dynamic dispatch)
impl Effect for Box<dyn Effect> {
    fn tick(&mut self, input: f64) -> f64 {
        (**self).tick(input)
    }

    fn last_out(&self) -> f64 {
        (**self).last_out()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn render(&mut self, buffer: &mut [f32]) {
        (**self).render(buffer)
    }

    fn apply(&mut self, msg: EffectMessage) {
        (**self).apply(msg)
    }
}

/// Clamp a dry/wet style parameter into `[0, 1]`, warning when it had to.
pub(crate) fn clamp_unit(owner: &str, name: &str, value: f64) -> f64 {
    if value < 0.0 {
        log::warn!("{owner}: {name} ({value}) is less than zero, clamping to 0.0");
        0.0
    } else if value > 1.0 {
        log::warn!("{owner}: {name} ({value}) is greater than 1.0, clamping to 1.0");
        1.0
    } else if value.is_nan() {
        log::warn!("{owner}: {name} is NaN, using 0.0");
        0.0
    } else {
        value
    }
}

/// Blend dry input with a wet signal. `mix` of 0 returns `dry` exactly and
/// `mix` of 1 returns `wet` exactly.
#[inline]
pub(crate) fn blend(dry: f64, wet: f64, mix: f64) -> f64 {
    mix * wet + (1.0 - mix) * dry
}
