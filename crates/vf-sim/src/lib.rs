//! `vf-sim` — drives the venue-flow engine through time.
//!
//! # Tick loop
//!
//! ```text
//! start()                 → Normal, first tick due at now + 2000 ms
//! every due tick:
//!   ① refresh topology snapshot if it changed since the last tick
//!   ② simulate_tick under the current mode's parameters
//!   ③ FastForward only: end if elapsed ≥ 15 s or rate ≥ target
//!                       (force-drain in-transit buffers on end)
//!   ④ push (label, occupancy) into the 20-entry history
//!   ⑤ reschedule: +2000 ms Normal, +50 ms FastForward, none once Ended
//! fast_forward()          → reschedules the pending tick to now + 50 ms
//! stop()                  → cancels the pending tick, drops flow state
//! ```
//!
//! Time is virtual.  A host that wants real-time pacing sleeps until
//! [`Simulator::next_due_ms`] before calling [`Simulator::step`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use vf_core::FlowConfig;
//! use vf_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(FlowConfig::default(), topology).build()?;
//! sim.start()?;
//! sim.run_until(10_000, &mut NoopObserver)?;
//! sim.fast_forward()?;
//! let reason = sim.run_to_end(60_000, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod history;
pub mod mode;
pub mod observer;
pub mod scheduler;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use history::{History, HistoryEntry};
pub use mode::{EndReason, Mode, ModeController};
pub use observer::{NoopObserver, SimObserver};
pub use scheduler::Scheduler;
pub use sim::{Simulator, TickReport};
