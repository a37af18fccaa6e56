use crate::dsp::ring::CircularBuffer;

/// Shortest delay the allpass interpolator can represent.
pub const ALLPASS_MIN_DELAY: f64 = 0.5;

/// Read-pointer offset used when a request falls below [`ALLPASS_MIN_DELAY`].
/// Empirically tuned; kept as is.
pub const ALLPASS_MIN_POINTER_OFFSET: f64 = 0.499_999_999_9;

/// Fractional delay line using first-order allpass interpolation.
///
/// The allpass section has unity magnitude response, so fractional delays do
/// not colour the signal the way linear interpolation does. Its phase delay is
/// flattest for a fractional part in `[0.5, 1.5)`, which is why the read
/// pointer is pulled one sample closer whenever the remainder drops below 0.5
/// and why delays under half a sample are not possible.
#[derive(Debug, Clone)]
pub struct AllpassDelay {
    buffer: CircularBuffer,
    write_pos: usize,
    read_pos: usize,
    delay: f64,
    alpha: f64,
    coeff: f64,
    ap_input: f64,
    next_output: f64,
    next_dirty: bool,
    last_out: f64,
}

impl AllpassDelay {
    /// `max_delay` below one is raised to one; the interpolator needs two slots.
    pub fn new(delay: f64, max_delay: usize) -> Self {
        let mut line = Self {
            buffer: CircularBuffer::new(capacity_for(max_delay)),
            write_pos: 0,
            read_pos: 0,
            delay: ALLPASS_MIN_DELAY,
            alpha: 0.0,
            coeff: 0.0,
            ap_input: 0.0,
            next_output: 0.0,
            next_dirty: true,
            last_out: 0.0,
        };
        line.set_delay(delay);
        line
    }

    /// Reallocate for a new maximum length, silence the line and set `delay`.
    pub fn set(&mut self, delay: f64, max_delay: usize) {
        self.buffer = CircularBuffer::new(capacity_for(max_delay));
        self.write_pos = 0;
        self.clear();
        self.set_delay(delay);
    }

    pub fn set_delay(&mut self, delay: f64) {
        let length = self.buffer.capacity() as f64;
        let max = length - 1.0;

        let mut out_pointer = if delay > max {
            log::warn!("AllpassDelay: set_delay({delay}) too big, saturating to {max}");
            self.delay = max;
            self.write_pos as f64 - max + 1.0
        } else if delay < ALLPASS_MIN_DELAY || delay.is_nan() {
            log::warn!(
                "AllpassDelay: set_delay({delay}) below {ALLPASS_MIN_DELAY} not possible, using {ALLPASS_MIN_DELAY}"
            );
            self.delay = ALLPASS_MIN_DELAY;
            self.write_pos as f64 + ALLPASS_MIN_POINTER_OFFSET
        } else {
            self.delay = delay;
            // read chases write
            self.write_pos as f64 - delay + 1.0
        };

        if out_pointer < 0.0 {
            out_pointer += length;
        }

        let integer = out_pointer.floor();
        // a tiny negative pointer plus `length` can round up to `length`
        self.read_pos = integer as usize % self.buffer.capacity();
        self.alpha = 1.0 + integer - out_pointer;

        if self.alpha < 0.5 {
            self.read_pos = self.buffer.advance(self.read_pos);
            self.alpha += 1.0;
        }

        self.coeff = (1.0 - self.alpha) / (1.0 + self.alpha);
        self.next_dirty = true;
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn max_delay(&self) -> usize {
        self.buffer.capacity() - 1
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Current allpass coefficient, `(1 - alpha) / (1 + alpha)`.
    pub fn coefficient(&self) -> f64 {
        self.coeff
    }

    /// Fractional part driving the interpolator, in `[0.5, 1.5)`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.last_out = 0.0;
        self.ap_input = 0.0;
        self.next_output = 0.0;
        self.next_dirty = true;
    }

    pub fn energy(&self) -> f64 {
        self.buffer.energy_between(self.read_pos, self.write_pos)
    }

    /// Non-destructive read of the raw history, clamped to `[1, delay]`.
    pub fn contents_at(&self, tap: usize) -> f64 {
        let max_tap = (self.delay.floor() as usize).max(1);
        let tap = tap.clamp(1, max_tap);
        self.buffer
            .get(self.buffer.offset(self.write_pos, -(tap as isize)))
    }

    /// Output the next `tick` will produce. Cached until that tick happens.
    pub fn next_out(&mut self) -> f64 {
        if self.next_dirty {
            self.next_output = -self.coeff * self.last_out;
            self.next_output += self.ap_input + self.coeff * self.buffer.get(self.read_pos);
            self.next_dirty = false;
        }
        self.next_output
    }

    pub fn last_out(&self) -> f64 {
        self.last_out
    }

    pub fn tick(&mut self, sample: f64) -> f64 {
        self.buffer.set(self.write_pos, sample);
        self.write_pos = self.buffer.advance(self.write_pos);

        self.last_out = self.next_out();
        self.next_dirty = true;

        // Save the allpass input before moving on.
        self.ap_input = self.buffer.get(self.read_pos);
        self.read_pos = self.buffer.advance(self.read_pos);

        self.last_out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample as f64) as f32;
        }
    }
}

fn capacity_for(max_delay: usize) -> usize {
    if max_delay < 1 {
        log::warn!("AllpassDelay: max delay {max_delay} too small, using 1");
        return 2;
    }
    max_delay + 1
}

impl Default for AllpassDelay {
    fn default() -> Self {
        Self::new(ALLPASS_MIN_DELAY, super::DEFAULT_MAX_DELAY)
    }
}
