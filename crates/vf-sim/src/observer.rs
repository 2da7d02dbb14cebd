//! Simulation observer trait for progress reporting and data collection.

use vf_core::Tick;
use vf_flow::FlowState;
use vf_topology::{Registry, TopologySnapshot};

use crate::{EndReason, TickReport};

/// Callbacks invoked by [`Simulator`][crate::Simulator] around each tick.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: trend printer
///
/// ```rust,ignore
/// struct TrendPrinter;
///
/// impl SimObserver for TrendPrinter {
///     fn on_tick_end(&mut self, report: &TickReport, _flow: &FlowState) {
///         println!("{} {:>6} ({:.1}%)", report.label, report.occupancy, report.occupancy_rate);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once any pending topology update has been compiled, before
    /// the engine runs.
    fn on_tick_start(&mut self, _tick: Tick, _now_ms: u64) {}

    /// Called once the tick has fully completed, with the resulting state.
    fn on_tick_end(&mut self, _report: &TickReport, _flow: &FlowState) {}

    /// Called after `on_tick_end` with the snapshot the tick ran against.
    ///
    /// `registry` maps the flow state's dense slots back to entity keys.
    fn on_snapshot(
        &mut self,
        _tick:     Tick,
        _flow:     &FlowState,
        _topology: &TopologySnapshot,
        _registry: &Registry,
    ) {
    }

    /// Called once, right after the tick that ended the event.
    fn on_sim_end(&mut self, _final_tick: Tick, _reason: EndReason) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
