//! Simulation time model.
//!
//! # Design
//!
//! Time is virtual milliseconds since the simulation started, held in
//! [`SimClock`].  The scheduler moves the clock forward to each tick's due
//! time; nothing reads the host clock inside the core, so a fast-forward run
//! that spans 15 simulated seconds finishes as fast as the CPU allows and is
//! exactly reproducible.
//!
//!   wall_time_ms = start_unix_ms + now_ms
//!
//! Ticks are counted separately by [`Tick`] because tick spacing changes with
//! the time mode (2 s normal, 50 ms fast-forward).

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Ordinal of an executed tick since the last (re)start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Virtual millisecond clock.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (milliseconds since epoch) of simulated time 0.
    pub start_unix_ms: i64,
    /// Virtual milliseconds elapsed since start.
    pub now_ms: u64,
}

impl SimClock {
    pub fn new(start_unix_ms: i64) -> Self {
        Self { start_unix_ms, now_ms: 0 }
    }

    /// Move the clock forward to `ms`.  Never moves backwards.
    #[inline]
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    /// Current Unix timestamp in milliseconds, saturating at `i64::MAX`.
    #[inline]
    pub fn current_unix_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.now_ms).unwrap_or(i64::MAX);
        self.start_unix_ms.saturating_add(elapsed)
    }

    /// Wall-clock label of the current instant as `HH:MM:SS` (UTC).
    ///
    /// Computed by hand; the label is only used for trend display.
    pub fn wall_label(&self) -> String {
        let secs_of_day = self.current_unix_ms().div_euclid(1_000).rem_euclid(86_400);
        let h = secs_of_day / 3_600;
        let m = (secs_of_day % 3_600) / 60;
        let s = secs_of_day % 60;
        format!("{h:02}:{m:02}:{s:02}")
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}ms ({})", self.now_ms, self.wall_label())
    }
}
