//! `History` — bounded trailing window of occupancy samples for trend display.

use std::collections::VecDeque;
use std::collections::vec_deque::Iter;

use vf_core::Tick;

/// One occupancy sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tick:       Tick,
    /// Virtual milliseconds since start when the sample was taken.
    pub elapsed_ms: u64,
    /// Wall-clock label, `HH:MM:SS`.
    pub label:      String,
    pub occupancy:  u64,
}

/// Sliding window: appending beyond `capacity` drops the oldest entry.
#[derive(Clone, Debug)]
pub struct History {
    entries:  VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest → newest.
    pub fn iter(&self) -> Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
