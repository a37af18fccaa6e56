/// Fixed-capacity circular buffer with modulo-indexing helpers.
///
/// All delay lines store their history here. Indices handed out by
/// [`CircularBuffer::advance`] and [`CircularBuffer::offset`] are always in
/// `0..capacity`, so callers never do their own wraparound arithmetic.
#[derive(Debug, Clone)]
pub struct CircularBuffer {
    data: Vec<f64>,
}

impl CircularBuffer {
    /// Allocates a zeroed buffer. A capacity of zero is bumped to one so that
    /// indexing stays defined.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Next index after `index`, wrapping at the end of the buffer.
    #[inline]
    pub fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.data.len() {
            0
        } else {
            next
        }
    }

    /// `index + delta` taken modulo the capacity (delta may be negative).
    #[inline]
    pub fn offset(&self, index: usize, delta: isize) -> usize {
        let len = self.data.len() as isize;
        (index as isize + delta).rem_euclid(len) as usize
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.data[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: f64) {
        self.data[index] = value;
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Sum of squares over `start..end` walking forward, split at the end of
    /// the buffer when the range wraps.
    pub fn energy_between(&self, start: usize, end: usize) -> f64 {
        let square_sum = |slice: &[f64]| slice.iter().map(|x| x * x).sum::<f64>();
        if end >= start {
            square_sum(&self.data[start..end])
        } else {
            square_sum(&self.data[start..]) + square_sum(&self.data[..end])
        }
    }
}
