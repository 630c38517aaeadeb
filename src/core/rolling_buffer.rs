//! Rolling Buffer: fixed-capacity circular window with O(1) running mean
//!
//! The window length is a const parameter (default `BUFFER_SIZE`), so the
//! storage never grows. The running sum is re-derived from the window each
//! time the write index wraps, which bounds accumulated rounding error to
//! one lap of the buffer.

use crate::BUFFER_SIZE;

/// Circular window of the most recent `C` samples
#[derive(Debug, Clone)]
pub struct RollingBuffer<const C: usize = BUFFER_SIZE> {
    /// Sample storage (only the first `count` slots are live until full)
    values: Box<[f64; C]>,
    /// Next slot to write
    write_idx: usize,
    /// Live samples, 0..=C
    count: usize,
    /// Running sum of live samples
    sum: f64,
}

impl<const C: usize> Default for RollingBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize> RollingBuffer<C> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            values: Box::new([0.0; C]),
            write_idx: 0,
            count: 0,
            sum: 0.0,
        }
    }

    /// Zero the window and counters
    pub fn reset(&mut self) {
        self.values.fill(0.0);
        self.write_idx = 0;
        self.count = 0;
        self.sum = 0.0;
    }

    /// Insert a sample, evicting the oldest once full
    pub fn add(&mut self, value: f64) {
        if self.count == C {
            self.sum -= self.values[self.write_idx];
        } else {
            self.count += 1;
        }

        self.values[self.write_idx] = value;
        self.sum += value;
        self.write_idx = (self.write_idx + 1) % C;

        if self.write_idx == 0 {
            self.resync();
        }
    }

    /// Mean of the live window, 0.0 when empty
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Recompute the running sum from the window
    pub fn resync(&mut self) {
        self.sum = self.values[..self.count].iter().sum();
    }

    /// Live sample count
    pub fn count(&self) -> usize {
        self.count
    }

    /// Next write position, in [0, C)
    pub fn write_idx(&self) -> usize {
        self.write_idx
    }

    /// Running sum
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Window length
    pub fn capacity(&self) -> usize {
        C
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if the window is full
    pub fn is_full(&self) -> bool {
        self.count == C
    }

    /// Most recently inserted sample
    pub fn last(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.values[(self.write_idx + C - 1) % C])
    }

    /// Live samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let start = if self.count == C { self.write_idx } else { 0 };
        (0..self.count).map(move |i| self.values[(start + i) % C])
    }
}

// =============================================================================
// TESTS
// =============================================================================
