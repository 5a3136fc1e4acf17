//! Fixed-capacity circular history of timestamped samples.

use std::time::Instant;

/// Number of samples each series keeps.
pub const RING_CAPACITY: usize = 120;

/// One observation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub at: Instant,
}

/// Circular buffer holding the most recent `capacity` samples.
///
/// Slots are written at a wrap-around cursor. The `full` flag records whether
/// the cursor has wrapped at least once, which decides where the logically
/// oldest sample lives when the buffer is read back in order.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    samples: Vec<Sample>,
    capacity: usize,
    idx: usize,
    full: bool,
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RingBuffer {
    /// Create an empty buffer with the default series capacity.
    pub fn new() -> Self {
        Self::with_capacity(RING_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity` samples.
    ///
    /// A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            idx: 0,
            full: false,
        }
    }

    /// Record a value observed now.
    pub fn push(&mut self, value: f64) {
        self.push_at(value, Instant::now());
    }

    /// Record a value observed at `at`.
    pub fn push_at(&mut self, value: f64, at: Instant) {
        let sample = Sample { value, at };
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.idx] = sample;
        }
        self.idx = (self.idx + 1) % self.capacity;
        if self.idx == 0 {
            self.full = true;
        }
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity
        } else {
            self.idx
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the write cursor has wrapped at least once.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Iterate samples oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + '_ {
        let (newer, older) = if self.full {
            self.samples.split_at(self.idx)
        } else {
            (&self.samples[..self.idx], &self.samples[..0])
        };
        older.iter().chain(newer.iter())
    }

    /// Copy of the values in chronological order.
    pub fn slice(&self) -> Vec<f64> {
        self.iter().map(|s| s.value).collect()
    }

    /// Most recent sample, if any.
    pub fn newest(&self) -> Option<&Sample> {
        if self.is_empty() {
            return None;
        }
        let i = (self.idx + self.capacity - 1) % self.capacity;
        self.samples.get(i)
    }

    /// Most recent value, or 0 for an empty buffer.
    pub fn last(&self) -> f64 {
        self.newest().map_or(0.0, |s| s.value)
    }
}
