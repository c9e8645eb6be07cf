//! Bounded recent-history window for live display.

use std::collections::VecDeque;
use std::time::Instant;

use super::reading::Reading;

/// Bounded FIFO of the most recent readings.
///
/// Pushes append at the tail and evict from the head once the capacity is
/// reached, so the window never holds more than `capacity` readings. It is
/// always a truncated view of what has already been persisted, in arrival
/// order.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` readings.
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting from the head if over capacity.
    pub fn push(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently pushed reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Readings in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Project the window onto an elapsed-time axis.
    ///
    /// Returns `(seconds since session_start, co_level)` per reading in
    /// arrival order. Readings stamped before `session_start` (possible
    /// after a reconnect) project to zero elapsed time.
    pub fn points(&self, session_start: Instant) -> Vec<(f64, f64)> {
        self.readings
            .iter()
            .map(|r| {
                let elapsed = r
                    .received_at
                    .saturating_duration_since(session_start)
                    .as_secs_f64();
                (elapsed, r.co_level)
            })
            .collect()
    }
}
