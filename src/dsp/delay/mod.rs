//! Delay lines over a circular buffer.
//!
//! Three variants share the same bookkeeping: a buffer of `max_delay + 1`
//! samples, a write index and a read index chasing it. Writing happens before
//! reading, which is what makes a delay of zero possible.
//!
//! | type            | delay      | interpolation          |
//! | --------------- | ---------- | ---------------------- |
//! | [`DelayLine`]   | integer    | none                   |
//! | [`AllpassDelay`]| fractional | first-order allpass    |
//! | [`LinearDelay`] | fractional | two-tap linear         |

mod allpass;
mod linear;

pub use allpass::{AllpassDelay, ALLPASS_MIN_DELAY, ALLPASS_MIN_POINTER_OFFSET};
pub use linear::LinearDelay;

use crate::dsp::ring::CircularBuffer;

/// Capacity used by [`DelayLine::default`].
pub const DEFAULT_MAX_DELAY: usize = 4095;

/// Longest line the effects will allocate, in samples (about six minutes at
/// 44.1 kHz).
pub const MAX_DELAY_LENGTH: usize = 1 << 24;

/// Non-interpolating delay line.
///
/// Typically used where the length never changes, such as the combs and
/// allpasses inside a reverberator.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: CircularBuffer,
    write_pos: usize,
    read_pos: usize,
    delay: usize,
    last_out: f64,
}

impl DelayLine {
    pub fn new(delay: usize, max_delay: usize) -> Self {
        let mut line = Self {
            buffer: CircularBuffer::new(max_delay + 1),
            write_pos: 0,
            read_pos: 0,
            delay: 0,
            last_out: 0.0,
        };
        line.set_delay(delay);
        line
    }

    /// Reallocate for a new maximum length, silence the line and set `delay`.
    ///
    /// Allocates, so keep it off the audio thread.
    pub fn set(&mut self, delay: usize, max_delay: usize) {
        self.buffer = CircularBuffer::new(max_delay + 1);
        self.write_pos = 0;
        self.last_out = 0.0;
        self.set_delay(delay);
    }

    /// Move the read index `delay` samples behind the write index.
    ///
    /// Values above [`DelayLine::max_delay`] saturate with a warning.
    pub fn set_delay(&mut self, delay: usize) {
        let max = self.max_delay();
        let delay = if delay > max {
            log::warn!("DelayLine: set_delay({delay}) too big, saturating to {max}");
            max
        } else {
            delay
        };
        self.delay = delay;
        self.read_pos = self.buffer.offset(self.write_pos, -(delay as isize));
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    pub fn max_delay(&self) -> usize {
        self.buffer.capacity() - 1
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.last_out = 0.0;
    }

    /// Sum of squares of everything still waiting to come out.
    pub fn energy(&self) -> f64 {
        self.buffer.energy_between(self.read_pos, self.write_pos)
    }

    /// Non-destructive read `tap` samples into the past, where a tap of 1 is
    /// the most recent input. Clamped to `[1, delay]` with a warning.
    pub fn contents_at(&self, tap: usize) -> f64 {
        let tap = if tap < 1 {
            log::warn!("DelayLine: contents_at({tap}) too small, using 1");
            1
        } else if tap > self.delay {
            log::warn!("DelayLine: contents_at({tap}) too big, using {}", self.delay);
            self.delay
        } else {
            tap
        };
        self.buffer
            .get(self.buffer.offset(self.write_pos, -(tap as isize)))
    }

    /// The sample the next `tick` would return if the delay is non-zero.
    pub fn next_out(&self) -> f64 {
        self.buffer.get(self.read_pos)
    }

    pub fn last_out(&self) -> f64 {
        self.last_out
    }

    pub fn tick(&mut self, sample: f64) -> f64 {
        self.buffer.set(self.write_pos, sample);
        self.write_pos = self.buffer.advance(self.write_pos);

        self.last_out = self.buffer.get(self.read_pos);
        self.read_pos = self.buffer.advance(self.read_pos);

        self.last_out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample as f64) as f32;
        }
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new(0, DEFAULT_MAX_DELAY)
    }
}
