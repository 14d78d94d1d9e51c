//! Fixed-capacity sliding buffer of outstanding-task counts.

use std::collections::VecDeque;

/// The most recent `capacity` outstanding counts, oldest first.
///
/// Pushing into a full window evicts the oldest sample, so the length never exceeds
/// the capacity.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    samples: VecDeque<usize>,
    capacity: usize,
}

impl RollingWindow {
    /// Creates an empty window holding up to `capacity` (min 1) samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records one sample.
    pub fn push(&mut self, outstanding: usize) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(outstanding);
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no sample was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once `capacity` samples were collected.
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Full, and every sample reports zero outstanding work.
    pub fn is_stable(&self) -> bool {
        self.is_full() && self.samples.iter().all(|&n| n == 0)
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples.iter().copied()
    }
}
