//! Built-in test signal: a plucked string re-struck on a fixed beat.

use delayfx::dsp::delay::DelayLine;

/// Loss per round trip of the string loop.
const DAMPING: f64 = 0.996;

/// Pitches the source cycles through, in Hz.
const NOTES: [f64; 4] = [196.0, 246.94, 293.66, 392.0];

/// Karplus-Strong string: a noise burst circulating through a delay line
/// with a two-point average in the loop.
pub struct PluckSource {
    line: DelayLine,
    sample_rate: f64,
    previous: f64,
    interval: usize,
    counter: usize,
    note: usize,
    rng: u32,
}

impl PluckSource {
    pub fn new(sample_rate: f64, strikes_per_second: f64) -> Self {
        let longest = (sample_rate / NOTES[0]).ceil() as usize + 1;
        let mut source = Self {
            line: DelayLine::new(longest, longest),
            sample_rate,
            previous: 0.0,
            interval: (sample_rate / strikes_per_second).max(1.0) as usize,
            counter: 0,
            note: 0,
            rng: 0x1234_5678,
        };
        source.pluck();
        source
    }

    fn noise(&mut self) -> f64 {
        // xorshift32
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 17;
        self.rng ^= self.rng << 5;
        self.rng as f64 / u32::MAX as f64 * 2.0 - 1.0
    }

    fn pluck(&mut self) {
        let period = (self.sample_rate / NOTES[self.note]).round() as usize;
        self.line.set_delay(period);
        for _ in 0..period {
            let burst = self.noise() * 0.5;
            self.line.tick(burst);
        }
        self.note = (self.note + 1) % NOTES.len();
    }

    pub fn next_sample(&mut self) -> f64 {
        self.counter += 1;
        if self.counter >= self.interval {
            self.counter = 0;
            self.pluck();
        }

        let out = self.line.next_out();
        let averaged = DAMPING * 0.5 * (out + self.previous);
        self.previous = out;
        self.line.tick(averaged);
        out
    }
}
