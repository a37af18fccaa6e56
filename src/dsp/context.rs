use std::f64::consts::TAU;

use crate::error::{ConfigError, Result};

/// Sample rate every reference delay length is tuned against, and the
/// default rate when nothing else is configured.
pub const REFERENCE_SAMPLE_RATE: f64 = 44_100.0;

/// Context handed to every coefficient-design computation.
///
/// Filters and reverberators keep a copy, so recomputing coefficients after a
/// parameter change never depends on global state. Changing the sample rate
/// means building new objects with a new context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignCtx {
    pub sample_rate: f64,
}

impl DesignCtx {
    pub fn new(sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        Ok(Self { sample_rate })
    }

    #[inline]
    pub fn nyquist(&self) -> f64 {
        self.sample_rate * 0.5
    }

    /// Angular frequency in radians per sample.
    #[inline]
    pub fn radians_per_sample(&self, freq_hz: f64) -> f64 {
        freq_hz * TAU / self.sample_rate
    }

    /// Ratio between this rate and `reference_rate`, used to rescale delay
    /// lengths that were tuned at a fixed rate.
    #[inline]
    pub fn scaler(&self, reference_rate: f64) -> f64 {
        self.sample_rate / reference_rate
    }
}

impl Default for DesignCtx {
    fn default() -> Self {
        Self {
            sample_rate: REFERENCE_SAMPLE_RATE,
        }
    }
}
