//! Serializable effect descriptors and a series chain to run them in.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::control::EffectMessage;
use crate::dsp::chorus::Chorus;
use crate::dsp::context::DesignCtx;
use crate::dsp::echo::Echo;
use crate::dsp::effect::Effect;
use crate::dsp::filter::{BiQuad, Filter, FilterKind};
use crate::dsp::pitch_shift::PitShift;
use crate::dsp::reverb::ReverbTopology;
use crate::error::Result;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
#[derive(Debug, Clone, PartialEq)]
pub enum EffectDescriptor {
    Echo {
        max_delay: f64,
        /// Starts at half the line when absent.
        delay: Option<f64>,
        mix: f64,
    },
    Chorus {
        base_delay: f64,
        mod_depth: f64,
        mod_frequency: f64,
        mix: f64,
    },
    PitchShift {
        shift: f64,
        mix: f64,
    },
    Reverb {
        topology: ReverbTopology,
        t60: f64,
        mix: f64,
    },
    Filter {
        kind: FilterKind,
        freq: f64,
        q: f64,
        gain: f64,
    },
    BiQuad {
        pole_freq: f64,
        pole_radius: f64,
        normalize: bool,
        /// Notch zeros; equal-gain zeros when absent.
        notch: Option<(f64, f64)>,
        gain: f64,
    },
}

impl EffectDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            EffectDescriptor::Echo { .. } => "Echo",
            EffectDescriptor::Chorus { .. } => "Chorus",
            EffectDescriptor::PitchShift { .. } => "PitShift",
            EffectDescriptor::Reverb { topology, .. } => topology.name(),
            EffectDescriptor::Filter { kind, .. } => kind.name(),
            EffectDescriptor::BiQuad { .. } => "BiQuad",
        }
    }

    /// Initial dry/wet mix, for effects that have one.
    pub fn mix(&self) -> Option<f64> {
        match *self {
            EffectDescriptor::Echo { mix, .. }
            | EffectDescriptor::Chorus { mix, .. }
            | EffectDescriptor::PitchShift { mix, .. }
            | EffectDescriptor::Reverb { mix, .. } => Some(mix),
            EffectDescriptor::Filter { .. } | EffectDescriptor::BiQuad { .. } => None,
        }
    }

    /// Construct the processor. Out-of-range parameters are clamped as usual;
    /// only arguments that make the object unusable fail.
    pub fn build(&self, ctx: &DesignCtx) -> Result<Box<dyn Effect>> {
        let effect: Box<dyn Effect> = match *self {
            EffectDescriptor::Echo {
                max_delay,
                delay,
                mix,
            } => {
                let mut echo = Echo::new(max_delay)?;
                if let Some(delay) = delay {
                    echo.set_delay(delay);
                }
                echo.set_effect_mix(mix);
                Box::new(echo)
            }
            EffectDescriptor::Chorus {
                base_delay,
                mod_depth,
                mod_frequency,
                mix,
            } => {
                let mut chorus = Chorus::new(*ctx, base_delay)?;
                chorus.set_mod_depth(mod_depth);
                chorus.set_mod_frequency(mod_frequency);
                chorus.set_effect_mix(mix);
                Box::new(chorus)
            }
            EffectDescriptor::PitchShift { shift, mix } => {
                let mut shifter = PitShift::new();
                shifter.set_shift(shift);
                shifter.set_effect_mix(mix);
                Box::new(shifter)
            }
            EffectDescriptor::Reverb { topology, t60, mix } => {
                let mut reverb = topology.build(*ctx, t60)?;
                reverb.set_effect_mix(mix);
                Box::new(reverb)
            }
            EffectDescriptor::Filter {
                kind,
                freq,
                q,
                gain,
            } => {
                let mut filter = kind.build(*ctx, freq, q);
                filter.set_gain(gain);
                Box::new(filter)
            }
            EffectDescriptor::BiQuad {
                pole_freq,
                pole_radius,
                normalize,
                notch,
                gain,
            } => {
                let mut biquad = BiQuad::new(*ctx);
                biquad.set_resonance(pole_freq, pole_radius, normalize);
                match notch {
                    Some((freq, radius)) => biquad.set_notch(freq, radius),
                    None if !normalize => biquad.set_equal_gain_zeroes(),
                    None => {}
                }
                biquad.set_gain(gain);
                Box::new(biquad)
            }
        };
        log::debug!("built {}", self.name());
        Ok(effect)
    }
}

/// Effects run in series, first to last.
#[derive(Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn Effect>>,
    last_out: f64,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: &[EffectDescriptor], ctx: &DesignCtx) -> Result<Self> {
        let effects = descriptors
            .iter()
            .map(|descriptor| descriptor.build(ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            effects,
            last_out: 0.0,
        })
    }

    pub fn push(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Effect + 'static)> {
        self.effects.get_mut(index).map(|effect| effect.as_mut())
    }
}

impl Effect for EffectChain {
    fn tick(&mut self, input: f64) -> f64 {
        self.last_out = self
            .effects
            .iter_mut()
            .fold(input, |signal, effect| effect.tick(signal));
        self.last_out
    }

    fn last_out(&self) -> f64 {
        self.last_out
    }

    fn clear(&mut self) {
        for effect in &mut self.effects {
            effect.clear();
        }
        self.last_out = 0.0;
    }

    /// Broadcast to every effect; each ignores what it does not understand.
    fn apply(&mut self, msg: EffectMessage) {
        for effect in &mut self.effects {
            effect.apply(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use approx::assert_abs_diff_eq;

    fn ctx() -> DesignCtx {
        DesignCtx::default()
    }

    #[test]
    fn test_build_every_descriptor() {
        let descriptors = [
            EffectDescriptor::Echo {
                max_delay: 4_410.0,
                delay: Some(441.0),
                mix: 0.4,
            },
            EffectDescriptor::Chorus {
                base_delay: 441.0,
                mod_depth: 0.3,
                mod_frequency: 0.5,
                mix: 0.5,
            },
            EffectDescriptor::PitchShift {
                shift: 1.5,
                mix: 0.5,
            },
            EffectDescriptor::Reverb {
                topology: ReverbTopology::NRev,
                t60: 2.0,
                mix: 0.3,
            },
            EffectDescriptor::Filter {
                kind: FilterKind::ResonantLowPass,
                freq: 2_000.0,
                q: 2.0,
                gain: 0.5,
            },
            EffectDescriptor::BiQuad {
                pole_freq: 1_000.0,
                pole_radius: 0.98,
                normalize: true,
                notch: None,
                gain: 1.0,
            },
        ];
        let mut chain = EffectChain::from_descriptors(&descriptors, &ctx()).unwrap();
        assert_eq!(chain.len(), 6);
        for n in 0..4_096 {
            let y = chain.tick(if n % 100 == 0 { 1.0 } else { 0.0 });
            assert!(y.is_finite());
        }
    }

    #[test]
    fn test_fatal_arguments_fail_the_build() {
        let bad = EffectDescriptor::Reverb {
            topology: ReverbTopology::JcRev,
            t60: 0.0,
            mix: 0.3,
        };
        assert_eq!(
            bad.build(&ctx()).err(),
            Some(ConfigError::InvalidDecayTime(0.0))
        );

        let descriptors = [
            EffectDescriptor::PitchShift {
                shift: 1.0,
                mix: 0.5,
            },
            EffectDescriptor::Echo {
                max_delay: -1.0,
                delay: None,
                mix: 0.5,
            },
        ];
        assert!(EffectChain::from_descriptors(&descriptors, &ctx()).is_err());
    }

    #[test]
    fn test_chain_runs_in_series() {
        let mut chain = EffectChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.tick(0.7), 0.7);

        let gain = EffectDescriptor::Filter {
            kind: FilterKind::LowPass,
            freq: 1_000.0,
            q: 1.0,
            gain: 0.5,
        };
        chain.push(gain.build(&ctx()).unwrap());
        chain.push(gain.build(&ctx()).unwrap());

        // Settle on DC: each low-pass passes it at its output gain.
        let mut y = 0.0;
        for _ in 0..20_000 {
            y = chain.tick(1.0);
        }
        assert_abs_diff_eq!(y, 0.25, epsilon = 1e-6);
        assert_eq!(chain.last_out(), y);

        chain.clear();
        assert_eq!(chain.last_out(), 0.0);
    }

    #[test]
    fn test_broadcast_messages() {
        let descriptors = [
            EffectDescriptor::Echo {
                max_delay: 100.0,
                delay: None,
                mix: 0.5,
            },
            EffectDescriptor::PitchShift {
                shift: 1.0,
                mix: 0.5,
            },
        ];
        let mut chain = EffectChain::from_descriptors(&descriptors, &ctx()).unwrap();
        chain.apply(EffectMessage::SetEffectMix(0.0));
        for x in [0.5, -0.25, 1.0] {
            assert_eq!(chain.tick(x), x);
        }
    }

    #[test]
    fn test_get_mut_targets_one_effect() {
        let descriptors = [EffectDescriptor::Echo {
            max_delay: 100.0,
            delay: Some(2.0),
            mix: 1.0,
        }];
        let mut chain = EffectChain::from_descriptors(&descriptors, &ctx()).unwrap();
        if let Some(echo) = chain.get_mut(0) {
            echo.apply(EffectMessage::SetDelay(1.0));
        }
        assert!(chain.get_mut(1).is_none());
        assert_eq!(chain.tick(1.0), 0.0);
        assert_eq!(chain.tick(0.0), 1.0);
    }

    #[test]
    fn test_descriptor_names() {
        let reverb = EffectDescriptor::Reverb {
            topology: ReverbTopology::PrcRev,
            t60: 1.0,
            mix: 0.5,
        };
        assert_eq!(reverb.name(), "PRCRev");
        assert_eq!(reverb.mix(), Some(0.5));

        let filter = EffectDescriptor::Filter {
            kind: FilterKind::BandPass,
            freq: 500.0,
            q: 3.0,
            gain: 1.0,
        };
        assert_eq!(filter.name(), "BandPass");
        assert_eq!(filter.mix(), None);
    }
}
