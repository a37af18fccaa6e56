//! Denormal suppression.
//!
//! Slowly decaying recursive state drifts into the subnormal range, where many
//! CPUs fall back to microcode and a single filter can eat the whole audio
//! budget. Every feedback register in this crate goes through
//! [`flush_denormal`] after it is updated.

/// Magnitudes strictly below this are forced to exactly zero.
pub const DENORMAL_THRESHOLD: f64 = 1e-15;

/// Magnitudes at or above this are treated as a runaway and zeroed as well.
pub const RUNAWAY_THRESHOLD: f64 = 1e15;

/// Returns `value` unless it is tiny, huge or not finite, in which case `0.0`.
#[inline]
pub fn flush_denormal(value: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude >= DENORMAL_THRESHOLD && magnitude < RUNAWAY_THRESHOLD {
        value
    } else {
        0.0
    }
}
