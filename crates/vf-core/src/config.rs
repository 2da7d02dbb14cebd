//! Simulation configuration.
//!
//! Every number the tick engine and mode controller depend on lives in
//! [`FlowConfig`].  `FlowConfig::default()` reproduces the dashboard's stock
//! behaviour; applications load overrides from JSON with the `serde` feature.

use crate::{VfError, VfResult};

// ── ModeParams ────────────────────────────────────────────────────────────────

/// Per-mode intensity parameters consumed by one tick.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeParams {
    /// Scheduler interval between ticks in this mode.
    pub interval_ms: u64,
    /// Exclusive upper bound `U` of the per-entrance generation draw.
    pub generation_bound: u64,
    /// Upper bound `V` of the per-route `draw(1, V)` advancement.
    pub advance_bound: u64,
    /// Fraction `R` of an in-transit buffer that arrives each tick.
    pub arrival_ratio: f64,
}

impl ModeParams {
    /// Real-time mode: one tick every 2 s.
    pub const NORMAL: ModeParams = ModeParams {
        interval_ms:      2_000,
        generation_bound: 50,
        advance_bound:    30,
        arrival_ratio:    0.90,
    };

    /// Accelerated mode: one tick every 50 ms with 10× magnitudes.
    pub const FAST_FORWARD: ModeParams = ModeParams {
        interval_ms:      50,
        generation_bound: 500,
        advance_bound:    300,
        arrival_ratio:    0.98,
    };

    /// Parameters after the event has ended: nothing is generated or moved.
    pub const HALTED: ModeParams = ModeParams {
        interval_ms:      0,
        generation_bound: 0,
        advance_bound:    0,
        arrival_ratio:    0.0,
    };

    /// `true` when a tick under these parameters can move no population.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.generation_bound == 0 && self.advance_bound == 0 && self.arrival_ratio == 0.0
    }

    fn validate(&self, which: &str) -> VfResult<()> {
        if self.interval_ms == 0 {
            return Err(VfError::Config(format!("{which}.interval_ms must be > 0")));
        }
        if !(0.0..=1.0).contains(&self.arrival_ratio) {
            return Err(VfError::Config(format!(
                "{which}.arrival_ratio must lie in [0, 1], got {}",
                self.arrival_ratio
            )));
        }
        Ok(())
    }
}

// ── FlowConfig ────────────────────────────────────────────────────────────────

/// Top-level simulator configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowConfig {
    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Unix timestamp (ms) of simulated time 0; only affects history labels.
    pub start_unix_ms: i64,

    pub normal: ModeParams,

    pub fast_forward: ModeParams,

    /// Fast-forward ends once this much simulated time has passed in it.
    pub fast_forward_cap_ms: u64,

    /// Length of the trailing occupancy window.
    pub history_capacity: usize,

    /// Inclusive range the target occupancy percentage is drawn from.
    pub target_occupancy_min: u8,
    pub target_occupancy_max: u8,

    /// Capacity applied to areas whose capacity is unset or non-numeric.
    pub default_area_capacity: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            start_unix_ms:         0,
            normal:                ModeParams::NORMAL,
            fast_forward:          ModeParams::FAST_FORWARD,
            fast_forward_cap_ms:   15_000,
            history_capacity:      20,
            target_occupancy_min:  75,
            target_occupancy_max:  100,
            default_area_capacity: 1_000,
        }
    }
}

impl FlowConfig {
    /// Reject configurations the simulator cannot run.
    pub fn validate(&self) -> VfResult<()> {
        self.normal.validate("normal")?;
        self.fast_forward.validate("fast_forward")?;
        if self.history_capacity == 0 {
            return Err(VfError::Config("history_capacity must be > 0".into()));
        }
        if self.target_occupancy_min > self.target_occupancy_max {
            return Err(VfError::Config(format!(
                "target occupancy range is empty: [{}, {}]",
                self.target_occupancy_min, self.target_occupancy_max
            )));
        }
        Ok(())
    }
}
