//! `Scheduler` — the single logical timer.
//!
//! At most one tick is pending at a time.  Rescheduling replaces the pending
//! tick, which is how a mode change takes effect without waiting for the
//! next natural boundary.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scheduler {
    next_due_ms: Option<u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending tick with one due `interval_ms` after `now_ms`.
    pub fn schedule_after(&mut self, now_ms: u64, interval_ms: u64) {
        self.next_due_ms = Some(now_ms.saturating_add(interval_ms));
    }

    /// Drop the pending tick.
    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    #[inline]
    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    /// Take the pending tick if it is due at or before `until_ms`.
    pub fn take_due(&mut self, until_ms: u64) -> Option<u64> {
        let due = self.next_due_ms.filter(|&d| d <= until_ms)?;
        self.next_due_ms = None;
        Some(due)
    }
}
