//! Rolling clock-offset window
//!
//! Each time a peer's newest state arrives, the difference between its update
//! number and ours is recorded. The average over the window estimates how far
//! ahead (or behind) the peer's clock runs.

use std::collections::VecDeque;

/// Maximum offset samples retained per peer
pub const OFFSET_WINDOW_CAPACITY: usize = 100;

/// Bounded window of signed offset samples with a running sum
#[derive(Debug, Clone)]
pub struct OffsetWindow {
    /// Samples, oldest first
    samples: VecDeque<i64>,
    /// Sum of all retained samples
    sum: i64,
    /// Maximum number of samples
    capacity: usize,
}

impl OffsetWindow {
    /// Create a new window with the given capacity
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            samples: VecDeque::with_capacity(capacity),
            sum: 0,
            capacity,
        }
    }

    /// Record a sample, evicting the oldest when the window is full
    pub fn push(&mut self, sample: i64) {
        self.samples.push_back(sample);
        self.sum += sample;
        if self.samples.len() > self.capacity {
            if let Some(evicted) = self.samples.pop_front() {
                self.sum -= evicted;
            }
        }
    }

    /// Integer average of the retained samples, truncated toward zero
    pub fn average(&self) -> Option<i64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.sum / self.samples.len() as i64)
    }

    /// Running sum of the retained samples
    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &i64> {
        self.samples.iter()
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples have been recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clear all samples
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0;
    }
}

impl Default for OffsetWindow {
    fn default() -> Self {
        Self::new(OFFSET_WINDOW_CAPACITY)
    }
}
