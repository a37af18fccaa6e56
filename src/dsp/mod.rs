//! Allocation-free signal processing primitives.
//!
//! Everything below `dsp` runs one sample at a time on the audio thread.
//! Only constructors and the explicit `set`/`reset` methods allocate; per
//! sample, out-of-range parameters are clamped and logged rather than
//! returned as errors.

/// Chorus: a delay line swept by a [`lfo::ModulationSource`].
pub mod chorus;
/// Sample-rate context shared by every design computation.
pub mod context;
/// Integer, allpass-interpolated and linearly interpolated delay lines.
pub mod delay;
pub mod denormal;
/// Single-tap echo.
pub mod echo;
pub mod effect;
/// Two-pole filters and the general biquad.
pub mod filter;
pub mod lfo;
/// Two-tap delay-line pitch shifter.
pub mod pitch_shift;
/// Comb/allpass reverberators.
pub mod reverb;
pub mod ring;

pub use context::DesignCtx;
pub use effect::{Effect, Frame};
