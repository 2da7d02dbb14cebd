//! Time modes and their transitions.
//!
//! ```text
//!            operator                 elapsed ≥ cap  or  rate ≥ target
//!   Normal ───────────▶ FastForward ───────────────────────────────────▶ Ended
//! ```
//!
//! `Ended` is terminal.

use std::fmt;

use vf_core::{FlowConfig, ModeParams};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Mode {
    /// Real-time mode.
    #[default]
    Normal,
    /// Accelerated mode with a bounded duration.
    FastForward,
    /// The event is over; no more ticks.
    Ended,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Normal      => "normal",
            Mode::FastForward => "fast_forward",
            Mode::Ended       => "ended",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why fast-forward ended the event.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EndReason {
    /// Fast-forward ran for its full duration.
    TimeCap,
    /// Occupancy rate reached the target threshold.
    TargetReached,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndReason::TimeCap       => "fast-forward time cap reached",
            EndReason::TargetReached => "target occupancy reached",
        })
    }
}

/// Owns the current [`Mode`] and decides every transition.
#[derive(Clone, Debug)]
pub struct ModeController {
    mode:                Mode,
    fast_forward_since:  Option<u64>,
    target_occupancy:    u8,
    normal:              ModeParams,
    fast_forward:        ModeParams,
    fast_forward_cap_ms: u64,
}

impl ModeController {
    pub fn new(config: &FlowConfig, target_occupancy: u8) -> Self {
        Self {
            mode: Mode::Normal,
            fast_forward_since: None,
            target_occupancy,
            normal: config.normal,
            fast_forward: config.fast_forward,
            fast_forward_cap_ms: config.fast_forward_cap_ms,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn target_occupancy(&self) -> u8 {
        self.target_occupancy
    }

    /// Virtual time at which fast-forward was entered.
    #[inline]
    pub fn fast_forward_since(&self) -> Option<u64> {
        self.fast_forward_since
    }

    /// Operator action.  Only valid from `Normal`; returns whether the
    /// transition happened.
    pub fn enter_fast_forward(&mut self, now_ms: u64) -> bool {
        if self.mode != Mode::Normal {
            return false;
        }
        self.mode = Mode::FastForward;
        self.fast_forward_since = Some(now_ms);
        true
    }

    /// Check the fast-forward stop conditions after a tick.  Transitions to
    /// `Ended` and returns the reason when one holds.
    pub fn evaluate(&mut self, now_ms: u64, occupancy_rate: f64) -> Option<EndReason> {
        if self.mode != Mode::FastForward {
            return None;
        }
        let since = self.fast_forward_since.unwrap_or(now_ms);
        let reason = if now_ms.saturating_sub(since) >= self.fast_forward_cap_ms {
            EndReason::TimeCap
        } else if occupancy_rate >= f64::from(self.target_occupancy) {
            EndReason::TargetReached
        } else {
            return None;
        };
        self.mode = Mode::Ended;
        Some(reason)
    }

    /// Scheduler interval for the current mode; `None` once ended.
    pub fn interval_ms(&self) -> Option<u64> {
        match self.mode {
            Mode::Normal      => Some(self.normal.interval_ms),
            Mode::FastForward => Some(self.fast_forward.interval_ms),
            Mode::Ended       => None,
        }
    }

    /// Intensity parameters for a tick run in the current mode.
    pub fn tick_params(&self) -> ModeParams {
        match self.mode {
            Mode::Normal      => self.normal,
            Mode::FastForward => self.fast_forward,
            Mode::Ended       => ModeParams::HALTED,
        }
    }
}
