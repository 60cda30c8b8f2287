//! Bounded per-track position history.

use std::collections::VecDeque;

use steadybox_detection_model::geometry::BoxRect;

/// Most recent smoothed boxes of a track, oldest first.
///
/// Holds at most `capacity` entries; pushing onto a full buffer evicts the
/// oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxHistory {
    entries: VecDeque<BoxRect>,
    capacity: usize,
}

impl BoxHistory {
    /// Empty history. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// History containing only `first`.
    pub fn seeded(first: BoxRect, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        history.push(first);
        history
    }

    pub fn push(&mut self, bbox: BoxRect) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(bbox);
        debug_assert!(self.entries.len() <= self.capacity);
    }

    /// Change capacity, evicting the oldest entries if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn oldest(&self) -> Option<&BoxRect> {
        self.entries.front()
    }

    pub fn latest(&self) -> Option<&BoxRect> {
        self.entries.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &BoxRect> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<BoxRect> {
        self.entries.iter().copied().collect()
    }
}
