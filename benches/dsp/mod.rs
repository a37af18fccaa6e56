//! Benchmarks for low-level DSP primitives.

mod delay;
mod effects;
mod filter;
mod reverb;

pub use delay::bench_delay;
pub use effects::bench_effects;
pub use filter::bench_filter;
pub use reverb::bench_reverb;
