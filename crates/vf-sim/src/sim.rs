//! The `Simulator` struct and its tick loop.

use log::{debug, info, warn};

use vf_core::{Draw, FlowConfig, SimClock, Tick};
use vf_flow::{FlowSnapshot, FlowState, TickOutcome, drain_in_transit, simulate_tick};
use vf_topology::{Registry, Topology, TopologySnapshot};

use crate::{
    EndReason, History, HistoryEntry, Mode, ModeController, Scheduler, SimError, SimObserver, SimResult,
};

/// Everything that happened in one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick:           Tick,
    /// Virtual time the tick ran at.
    pub now_ms:         u64,
    pub label:          String,
    /// Mode whose parameters the tick ran under.
    pub mode:           Mode,
    /// Mode after the tick's termination check.
    pub mode_after:     Mode,
    pub occupancy:      u64,
    pub occupancy_rate: f64,
    pub outcome:        TickOutcome,
    /// Set on the tick that ended the event.
    pub ended:          Option<EndReason>,
}

/// The occupancy simulator: topology snapshotting, the tick engine, the mode
/// controller, history, and the single scheduler timer.
///
/// Each call to [`step`][Self::step] executes exactly one tick to
/// completion:
///
/// 1. **Clock**: advance virtual time to the pending tick's due time.
/// 2. **Snapshot**: if the topology was updated since the last tick, compile
///    a new snapshot.  The tick reads only this snapshot.
/// 3. **Engine**: [`simulate_tick`] under the current mode's parameters.
/// 4. **Mode check**: in fast-forward, end the event when the time cap or the
///    target occupancy is reached, force-draining every in-transit buffer.
/// 5. **History**: append one `(label, occupancy)` sample.
/// 6. **Reschedule**: per the (possibly new) mode; nothing once ended.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulator<D: Draw> {
    pub(crate) config:         FlowConfig,
    pub(crate) clock:          SimClock,
    pub(crate) rng:            D,
    pub(crate) topology:       Topology,
    pub(crate) topology_dirty: bool,
    pub(crate) registry:       Registry,
    pub(crate) snapshot:       TopologySnapshot,
    pub(crate) flow:           Option<FlowState>,
    pub(crate) history:        History,
    pub(crate) controller:     Option<ModeController>,
    pub(crate) scheduler:      Scheduler,
    pub(crate) tick:           Tick,
}

impl<D: Draw> Simulator<D> {
    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// (Re)start the simulation at the current virtual time.
    ///
    /// Recreates the flow state and registry, clears history, draws the
    /// target occupancy, enters `Normal`, and schedules the first tick one
    /// normal interval from now.
    pub fn start(&mut self) -> SimResult<()> {
        self.registry = Registry::new();
        self.refresh_snapshot()?;
        self.flow = Some(FlowState::for_snapshot(&self.snapshot));
        self.history.clear();
        self.tick = Tick::ZERO;

        let target = self.rng.inclusive(
            u64::from(self.config.target_occupancy_min),
            u64::from(self.config.target_occupancy_max),
        );
        // Both bounds are u8, so the draw always fits.
        let target = u8::try_from(target).unwrap_or(self.config.target_occupancy_max);
        let controller = ModeController::new(&self.config, target);
        if let Some(interval) = controller.interval_ms() {
            self.scheduler.schedule_after(self.clock.now_ms, interval);
        }
        self.controller = Some(controller);

        info!(
            "simulation started at {}: {} entrance(s), {} area(s), {} usable route(s), target occupancy {}%",
            self.clock,
            self.snapshot.entrances.len(),
            self.snapshot.areas.len(),
            self.snapshot.usable_route_count(),
            target,
        );
        Ok(())
    }

    /// Cancel the pending tick and drop the flow state.
    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.flow = None;
        self.controller = None;
        info!("simulation stopped at {}", self.clock);
    }

    /// Operator action: switch `Normal → FastForward`.
    ///
    /// The pending tick is rescheduled immediately on the fast-forward
    /// interval.  Returns `Ok(false)` when not in `Normal`.
    pub fn fast_forward(&mut self) -> SimResult<bool> {
        let controller = self.controller.as_mut().ok_or(SimError::NotStarted)?;
        let now = self.clock.now_ms;
        if !controller.enter_fast_forward(now) {
            return Ok(false);
        }
        if let Some(interval) = controller.interval_ms() {
            self.scheduler.schedule_after(now, interval);
        }
        info!("fast-forward engaged at {}", self.clock);
        Ok(true)
    }

    /// Replace the topology.  Takes effect at the start of the next tick.
    pub fn update_topology(&mut self, topology: Topology) {
        self.topology = topology;
        self.topology_dirty = true;
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Run the pending tick, whenever it is due.
    ///
    /// Returns `Ok(None)` when nothing is scheduled (the event has ended).
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Option<TickReport>> {
        if self.flow.is_none() {
            return Err(SimError::NotStarted);
        }
        match self.scheduler.take_due(u64::MAX) {
            Some(due) => self.run_tick(due, observer).map(Some),
            None => Ok(None),
        }
    }

    /// Run every tick due at or before `until_ms`, then move the clock to
    /// `until_ms`.  Returns the number of ticks executed.
    pub fn run_until<O: SimObserver>(&mut self, until_ms: u64, observer: &mut O) -> SimResult<usize> {
        if self.flow.is_none() {
            return Err(SimError::NotStarted);
        }
        let mut ran = 0;
        while let Some(due) = self.scheduler.take_due(until_ms) {
            self.run_tick(due, observer)?;
            ran += 1;
        }
        self.clock.advance_to(until_ms);
        Ok(ran)
    }

    /// Step until the event ends or the next tick would fall after
    /// `max_ms`.  Returns the end reason, if the event ended.
    pub fn run_to_end<O: SimObserver>(&mut self, max_ms: u64, observer: &mut O) -> SimResult<Option<EndReason>> {
        if self.flow.is_none() {
            return Err(SimError::NotStarted);
        }
        while let Some(due) = self.scheduler.take_due(max_ms) {
            let report = self.run_tick(due, observer)?;
            if let Some(reason) = report.ended {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Current flow state; `None` before `start` or after `stop`.
    pub fn flow(&self) -> Option<&FlowState> {
        self.flow.as_ref()
    }

    /// Flow state keyed by external entity keys.
    pub fn snapshot(&self) -> Option<FlowSnapshot> {
        self.flow.as_ref().map(|f| f.snapshot(&self.registry))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current mode; `Normal` before the first start.
    pub fn mode(&self) -> Mode {
        self.controller.as_ref().map_or(Mode::Normal, ModeController::mode)
    }

    /// Fast-forward stop threshold drawn at the last start.
    pub fn target_occupancy(&self) -> Option<u8> {
        self.controller.as_ref().map(ModeController::target_occupancy)
    }

    /// `current_occupancy / event_capacity * 100`; `0.0` without capacity.
    pub fn occupancy_rate(&self) -> f64 {
        self.flow
            .as_ref()
            .map_or(0.0, |f| f.occupancy_rate(self.snapshot.event_capacity))
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.scheduler.next_due_ms()
    }

    /// The topology most recently supplied (possibly not yet in effect).
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The snapshot the last tick ran against.
    pub fn topology_snapshot(&self) -> &TopologySnapshot {
        &self.snapshot
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Ticks executed since the last start.
    pub fn ticks(&self) -> Tick {
        self.tick
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn run_tick<O: SimObserver>(&mut self, due_ms: u64, observer: &mut O) -> SimResult<TickReport> {
        self.clock.advance_to(due_ms);
        let now = self.clock.now_ms;
        let tick = self.tick;

        // ── Snapshot refresh (only between ticks) ─────────────────────────
        if self.topology_dirty {
            self.refresh_snapshot()?;
            debug!("{tick}: topology snapshot refreshed");
        }

        observer.on_tick_start(tick, now);

        let (Some(flow), Some(controller)) = (self.flow.as_ref(), self.controller.as_mut()) else {
            return Err(SimError::NotStarted);
        };
        let mode = controller.mode();

        // ── Engine ────────────────────────────────────────────────────────
        let (mut next, mut outcome) = simulate_tick(flow, &self.snapshot, &controller.tick_params(), &mut self.rng);

        // ── Mode check ────────────────────────────────────────────────────
        let rate = next.occupancy_rate(self.snapshot.event_capacity);
        let ended = controller.evaluate(now, rate);
        if let Some(reason) = ended {
            outcome.discarded_at_capacity += drain_in_transit(&mut next, &self.snapshot);
            info!(
                "{tick}: event ended ({reason}) at {} with occupancy {} ({rate:.1}%)",
                self.clock, next.current_occupancy,
            );
        }
        let mode_after = controller.mode();
        let interval = controller.interval_ms();

        // ── History ───────────────────────────────────────────────────────
        let label = self.clock.wall_label();
        self.history.push(HistoryEntry {
            tick,
            elapsed_ms: now,
            label: label.clone(),
            occupancy: next.current_occupancy,
        });

        // ── Reschedule ────────────────────────────────────────────────────
        match interval {
            Some(i) => self.scheduler.schedule_after(now, i),
            None => self.scheduler.cancel(),
        }

        let report = TickReport {
            tick,
            now_ms: now,
            label,
            mode,
            mode_after,
            occupancy: next.current_occupancy,
            occupancy_rate: next.occupancy_rate(self.snapshot.event_capacity),
            outcome,
            ended,
        };

        let flow = self.flow.insert(next);
        observer.on_tick_end(&report, flow);
        observer.on_snapshot(tick, flow, &self.snapshot, &self.registry);
        if let Some(reason) = ended {
            observer.on_sim_end(tick, reason);
        }
        self.tick = tick.next();

        Ok(report)
    }

    /// Compile the current topology and clear the dirty flag.
    fn refresh_snapshot(&mut self) -> SimResult<()> {
        self.snapshot =
            TopologySnapshot::compile(&self.topology, &mut self.registry, self.config.default_area_capacity)?;
        self.topology_dirty = false;
        for link in self.snapshot.routes.iter().filter(|r| r.resolved().is_none()) {
            if let Some(route) = self.topology.route(link.key) {
                warn!("route {} is unusable: {}", link.key, self.topology.describe_route(route));
            }
        }
        Ok(())
    }
}
