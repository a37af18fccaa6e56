//! Control-to-audio parameter messages.
//!
//! A UI or sequencing thread pushes [`EffectMessage`]s into a lock-free queue;
//! the audio thread calls [`drain`] at the top of each block so parameter
//! changes land on block boundaries and never race a `tick`.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::effect::Effect;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EffectMessage {
    SetEffectMix(f64),
    /// Delay in samples (Echo) or base delay (Chorus).
    SetDelay(f64),
    SetModDepth(f64),
    SetModFrequency(f64),
    SetShift(f64),
    /// Reverb T60 in seconds.
    SetDecayTime(f64),
    SetFreq(f64),
    SetQ(f64),
    Clear,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EffectMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EffectMessage> {
    fn pop(&mut self) -> Option<EffectMessage> {
        Consumer::pop(self).ok()
    }
}

/// Apply every pending message to `target`. Returns how many were applied.
pub fn drain<R, E>(rx: &mut R, target: &mut E) -> usize
where
    R: MessageReceiver + ?Sized,
    E: Effect + ?Sized,
{
    let mut applied = 0;
    while let Some(msg) = rx.pop() {
        target.apply(msg);
        applied += 1;
    }
    applied
}
