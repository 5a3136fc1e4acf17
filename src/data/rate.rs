//! Rate derivation over a series history.
//!
//! Two computations with different scope:
//!
//! - [`rate`] is the scalar shown in the series table. It only looks at the
//!   samples inside the trailing window.
//! - [`rate_slice`] feeds the chart. It derives one rate per adjacent sample
//!   pair across the whole buffer; the window plays no part in it.
//!
//! Both clamp negative deltas (counter resets) to zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::ring::RingBuffer;

/// Selectable rate windows, smallest first.
pub const RATE_WINDOW_STEPS: [Duration; 7] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(5),
    Duration::from_secs(10),
    Duration::from_secs(15),
    Duration::from_secs(30),
    Duration::from_secs(60),
];

/// Index of the 5s default in [`RATE_WINDOW_STEPS`].
const DEFAULT_STEP: usize = 2;

/// Default rate window.
pub const DEFAULT_RATE_WINDOW: Duration = RATE_WINDOW_STEPS[DEFAULT_STEP];

/// Rate per second over the samples within `window` of the newest one.
///
/// Returns 0 with fewer than two samples, when no time elapsed between the
/// oldest in-window sample and the newest, or when the value went down.
pub fn rate(buf: &RingBuffer, window: Duration) -> f64 {
    if buf.len() < 2 {
        return 0.0;
    }
    let Some(newest) = buf.newest() else {
        return 0.0;
    };

    let mut oldest = newest;
    for sample in buf.iter().rev().skip(1) {
        if newest.at.duration_since(sample.at) > window {
            break;
        }
        oldest = sample;
    }

    let elapsed = newest.at.duration_since(oldest.at).as_secs_f64();
    if elapsed <= 0.0 {
        return 0.0;
    }
    let delta = newest.value - oldest.value;
    if delta < 0.0 {
        return 0.0;
    }
    delta / elapsed
}

/// One rate per consecutive sample pair, oldest first.
///
/// Yields `len - 1` values, or nothing with fewer than two samples.
pub fn rate_slice(buf: &RingBuffer) -> Vec<f64> {
    if buf.len() < 2 {
        return Vec::new();
    }
    buf.iter()
        .zip(buf.iter().skip(1))
        .map(|(prev, cur)| {
            let dt = cur.at.saturating_duration_since(prev.at).as_secs_f64();
            if dt <= 0.0 {
                return 0.0;
            }
            (cur.value - prev.value).max(0.0) / dt
        })
        .collect()
}

/// The active rate window, stepped through [`RATE_WINDOW_STEPS`].
///
/// Shared between the input path, which steps it, and the refresh task,
/// which reads it.
#[derive(Debug)]
pub struct RateWindow {
    idx: AtomicUsize,
}

impl Default for RateWindow {
    fn default() -> Self {
        Self {
            idx: AtomicUsize::new(DEFAULT_STEP),
        }
    }
}

impl RateWindow {
    /// Create a window snapped to `d`.
    pub fn new(d: Duration) -> Self {
        let w = Self::default();
        w.set(d);
        w
    }

    pub fn get(&self) -> Duration {
        RATE_WINDOW_STEPS[self.idx.load(Ordering::Relaxed)]
    }

    /// Step to the next larger window, stopping at the largest.
    pub fn up(&self) -> Duration {
        let last = RATE_WINDOW_STEPS.len() - 1;
        let _ = self
            .idx
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1).min(last)));
        self.get()
    }

    /// Step to the next smaller window, stopping at the smallest.
    pub fn down(&self) -> Duration {
        let _ = self
            .idx
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some(i.saturating_sub(1)));
        self.get()
    }

    /// Snap to the first step at least `d`, or the largest step.
    pub fn set(&self, d: Duration) {
        let idx = RATE_WINDOW_STEPS
            .iter()
            .position(|step| *step >= d)
            .unwrap_or(RATE_WINDOW_STEPS.len() - 1);
        self.idx.store(idx, Ordering::Relaxed);
    }
}
