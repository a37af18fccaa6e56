use crate::dsp::ring::CircularBuffer;

/// Fractional delay line using two-tap linear interpolation.
///
/// Cheaper than [`super::AllpassDelay`] and fine for delays that move every
/// sample (chorus, pitch shifting), at the price of some high-frequency
/// attenuation that depends on the fractional part.
#[derive(Debug, Clone)]
pub struct LinearDelay {
    buffer: CircularBuffer,
    write_pos: usize,
    read_pos: usize,
    delay: f64,
    alpha: f64,
    om_alpha: f64,
    next_output: f64,
    next_dirty: bool,
    last_out: f64,
}

impl LinearDelay {
    pub fn new(delay: f64, max_delay: usize) -> Self {
        let mut line = Self {
            buffer: CircularBuffer::new(max_delay + 1),
            write_pos: 0,
            read_pos: 0,
            delay: 0.0,
            alpha: 0.0,
            om_alpha: 1.0,
            next_output: 0.0,
            next_dirty: true,
            last_out: 0.0,
        };
        line.set_delay(delay);
        line
    }

    /// Reallocate for a new maximum length, silence the line and set `delay`.
    pub fn set(&mut self, delay: f64, max_delay: usize) {
        self.buffer = CircularBuffer::new(max_delay + 1);
        self.write_pos = 0;
        self.clear();
        self.set_delay(delay);
    }

    pub fn set_delay(&mut self, delay: f64) {
        let length = self.buffer.capacity() as f64;
        let max = length - 1.0;

        let delay = if delay > max {
            log::warn!("LinearDelay: set_delay({delay}) too big, saturating to {max}");
            max
        } else if delay < 0.0 || delay.is_nan() {
            log::warn!("LinearDelay: set_delay({delay}) less than zero, using 0");
            0.0
        } else {
            delay
        };
        self.delay = delay;

        // read chases write
        let mut out_pointer = self.write_pos as f64 - delay;
        if out_pointer < 0.0 {
            out_pointer += length;
        }

        let integer = out_pointer.floor();
        // a tiny negative pointer plus `length` can round up to `length`
        self.read_pos = integer as usize % self.buffer.capacity();
        self.alpha = out_pointer - integer;
        self.om_alpha = 1.0 - self.alpha;
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

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.last_out = 0.0;
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
            let next_pos = self.buffer.advance(self.read_pos);
            self.next_output = self.buffer.get(self.read_pos) * self.om_alpha
                + self.buffer.get(next_pos) * self.alpha;
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

        self.read_pos = self.buffer.advance(self.read_pos);

        self.last_out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample as f64) as f32;
        }
    }
}

impl Default for LinearDelay {
    fn default() -> Self {
        Self::new(0.0, super::DEFAULT_MAX_DELAY)
    }
}
