//! `vf-flow` — aggregate crowd-flow state and the tick engine.
//!
//! # Pipeline
//!
//! ```text
//!  generated ─▶ at_entrances ─▶ to_control_points ─▶ dispatch_ready ─▶ to_areas ─▶ area_occupancy
//!                   │                   │                                               ▲
//!            entrance_arrived   control_point_passed                          capped at capacity
//! ```
//!
//! Everything is a count; no individual is modelled.
//!
//! | Module     | Contents                                            |
//! |------------|-----------------------------------------------------|
//! | [`state`]  | `FlowState`, `InTransit`, `FlowSnapshot`            |
//! | [`engine`] | `simulate_tick`, `drain_in_transit`, `TickOutcome`  |
//!
//! # Example
//!
//! ```rust,ignore
//! let snapshot = TopologySnapshot::compile(&topology, &mut registry, 1_000)?;
//! let state = FlowState::for_snapshot(&snapshot);
//! let (state, outcome) = simulate_tick(&state, &snapshot, &ModeParams::NORMAL, &mut rng);
//! ```

pub mod engine;
pub mod state;

#[cfg(test)]
mod tests;

pub use engine::{TickOutcome, drain_in_transit, simulate_tick};
pub use state::{FlowSnapshot, FlowState, InTransit};
