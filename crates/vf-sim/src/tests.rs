//! Integration tests for vf-sim.

use vf_core::{Draw, EntityKey, FlowConfig, Tick};
use vf_flow::FlowState;
use vf_topology::Topology;

use crate::{EndReason, Mode, NoopObserver, SimBuilder, SimError, SimObserver, TickReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// E1 → C1 → A1.
fn single_route(area_capacity: Option<u64>, event_capacity: Option<u64>) -> Topology {
    let mut t = Topology::new();
    t.set_event_capacity(event_capacity);
    let e = t.add_entrance("E1");
    let c = t.add_control_point("C1");
    let a = t.add_area("A1", area_capacity);
    t.add_route(e, c, a).unwrap();
    t
}

fn fixed_target(target: u8) -> FlowConfig {
    FlowConfig { target_occupancy_min: target, target_occupancy_max: target, ..FlowConfig::default() }
}

struct MaxDraw;

impl Draw for MaxDraw {
    fn below(&mut self, bound: u64) -> u64 {
        bound.saturating_sub(1)
    }
}

/// Observer that counts callbacks.
#[derive(Default)]
struct Counter {
    starts:  usize,
    ends:    usize,
    endings: Vec<(Tick, EndReason)>,
    modes:   Vec<Mode>,
}

impl SimObserver for Counter {
    fn on_tick_start(&mut self, _tick: Tick, _now_ms: u64) {
        self.starts += 1;
    }
    fn on_tick_end(&mut self, report: &TickReport, flow: &FlowState) {
        assert_eq!(report.occupancy, flow.current_occupancy);
        self.ends += 1;
        self.modes.push(report.mode);
    }
    fn on_sim_end(&mut self, tick: Tick, reason: EndReason) {
        self.endings.push((tick, reason));
    }
}

// ── Mode controller ───────────────────────────────────────────────────────────

#[cfg(test)]
mod mode_controller {
    use crate::ModeController;

    use super::*;

    #[test]
    fn normal_never_ends() {
        let mut c = ModeController::new(&FlowConfig::default(), 75);
        assert_eq!(c.evaluate(1_000_000, 100.0), None);
        assert_eq!(c.mode(), Mode::Normal);
        assert_eq!(c.interval_ms(), Some(2_000));
    }

    #[test]
    fn fast_forward_only_from_normal() {
        let mut c = ModeController::new(&FlowConfig::default(), 75);
        assert!(c.enter_fast_forward(500));
        assert!(!c.enter_fast_forward(600));
        assert_eq!(c.fast_forward_since(), Some(500));
        assert_eq!(c.interval_ms(), Some(50));
        assert_eq!(c.tick_params().generation_bound, 500);
    }

    #[test]
    fn ends_on_time_cap_or_target() {
        let mut c = ModeController::new(&FlowConfig::default(), 80);
        c.enter_fast_forward(1_000);
        assert_eq!(c.evaluate(15_999, 79.9), None);
        assert_eq!(c.evaluate(16_000, 0.0), Some(EndReason::TimeCap));
        assert_eq!(c.mode(), Mode::Ended);
        assert_eq!(c.interval_ms(), None);
        assert!(c.tick_params().is_halted());
        assert!(!c.enter_fast_forward(17_000));

        let mut c = ModeController::new(&FlowConfig::default(), 80);
        c.enter_fast_forward(0);
        assert_eq!(c.evaluate(50, 80.0), Some(EndReason::TargetReached));
    }
}

// ── History + scheduler ───────────────────────────────────────────────────────

#[cfg(test)]
mod parts {
    use crate::{History, HistoryEntry, Scheduler};

    use super::*;

    fn entry(i: u64) -> HistoryEntry {
        HistoryEntry { tick: Tick(i), elapsed_ms: i * 10, label: format!("{i}"), occupancy: i }
    }

    #[test]
    fn history_drops_oldest() {
        let mut h = History::new(3);
        for i in 0..5 {
            h.push(entry(i));
        }
        let ticks: Vec<u64> = h.iter().map(|e| e.tick.0).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
        assert_eq!(h.latest().unwrap().occupancy, 4);
        h.clear();
        assert!(h.is_empty());
        assert_eq!(History::new(0).capacity(), 1);
    }

    #[test]
    fn scheduler_replaces_pending_tick() {
        let mut s = Scheduler::new();
        s.schedule_after(0, 2_000);
        s.schedule_after(100, 50);
        assert_eq!(s.next_due_ms(), Some(150));
        assert_eq!(s.take_due(149), None);
        assert_eq!(s.take_due(150), Some(150));
        assert_eq!(s.next_due_ms(), None);
        s.schedule_after(0, 10);
        s.cancel();
        assert_eq!(s.take_due(u64::MAX), None);
    }
}

// ── Builder + lifecycle ───────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn invalid_config_rejected() {
        let cfg = FlowConfig { history_capacity: 0, ..FlowConfig::default() };
        let result = SimBuilder::new(cfg, single_route(None, Some(100))).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn extreme_wall_clock_anchor_still_ticks() {
        let cfg = FlowConfig { start_unix_ms: i64::MAX - 1_000, ..FlowConfig::default() };
        let mut sim = SimBuilder::new(cfg, single_route(None, Some(100))).build().unwrap();
        sim.start().unwrap();
        let report = sim.step(&mut NoopObserver).unwrap().unwrap();
        assert_eq!(report.now_ms, 2_000);
        assert_eq!(report.label.len(), 8);
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    fn not_started_errors() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100))).build().unwrap();
        assert!(sim.flow().is_none());
        assert!(matches!(sim.step(&mut NoopObserver), Err(SimError::NotStarted)));
        assert!(matches!(sim.fast_forward(), Err(SimError::NotStarted)));
        assert_eq!(sim.mode(), Mode::Normal);
        assert_eq!(sim.occupancy_rate(), 0.0);
    }

    #[test]
    fn first_tick_after_one_normal_interval() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100))).build().unwrap();
        sim.start().unwrap();
        assert_eq!(sim.next_due_ms(), Some(2_000));
        assert_eq!(sim.run_until(1_999, &mut NoopObserver).unwrap(), 0);
        assert_eq!(sim.run_until(10_000, &mut NoopObserver).unwrap(), 5);
        assert_eq!(sim.clock().now_ms, 10_000);
        assert_eq!(sim.next_due_ms(), Some(12_000));
        assert_eq!(sim.ticks(), Tick(5));
    }

    #[test]
    fn stop_cancels_timer_and_drops_state() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100))).build().unwrap();
        sim.start().unwrap();
        sim.run_until(6_000, &mut NoopObserver).unwrap();
        sim.stop();
        assert_eq!(sim.next_due_ms(), None);
        assert!(sim.flow().is_none());
        assert!(sim.snapshot().is_none());
        assert!(matches!(sim.run_until(60_000, &mut NoopObserver), Err(SimError::NotStarted)));
    }

    #[test]
    fn restart_resets_state_and_history() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100))).build().unwrap();
        sim.start().unwrap();
        sim.run_until(20_000, &mut NoopObserver).unwrap();
        assert!(sim.flow().unwrap().total_entered > 0);

        sim.start().unwrap();
        assert_eq!(sim.flow().unwrap().total_entered, 0);
        assert!(sim.history().is_empty());
        assert_eq!(sim.ticks(), Tick::ZERO);
        assert_eq!(sim.next_due_ms(), Some(22_000));
    }

    #[test]
    fn injected_rng_draws_the_target() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100)))
            .rng(MaxDraw)
            .build()
            .unwrap();
        assert_eq!(sim.target_occupancy(), None);
        sim.start().unwrap();
        assert_eq!(sim.target_occupancy(), Some(100));
    }

    #[test]
    fn seeded_runs_replay() {
        let run = || {
            let mut sim = SimBuilder::new(FlowConfig::default(), single_route(Some(500), Some(1_000)))
                .build()
                .unwrap();
            sim.start().unwrap();
            sim.run_until(20_000, &mut NoopObserver).unwrap();
            sim.fast_forward().unwrap();
            sim.run_to_end(60_000, &mut NoopObserver).unwrap();
            sim.history().iter().map(|e| e.occupancy).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}

// ── History recording ─────────────────────────────────────────────────────────

#[cfg(test)]
mod history {
    use super::*;

    #[test]
    fn twenty_five_ticks_keep_last_twenty() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100))).build().unwrap();
        sim.start().unwrap();
        let mut obs = Counter::default();
        assert_eq!(sim.run_until(50_000, &mut obs).unwrap(), 25);
        assert_eq!(obs.starts, 25);
        assert_eq!(obs.ends, 25);

        let h = sim.history();
        assert_eq!(h.len(), 20);
        let ticks: Vec<u64> = h.iter().map(|e| e.tick.0).collect();
        assert_eq!(ticks, (5..25).collect::<Vec<_>>());
        let first = h.iter().next().unwrap();
        assert_eq!(first.elapsed_ms, 12_000);
        assert_eq!(first.label, "00:00:12");
        assert_eq!(h.latest().unwrap().occupancy, sim.flow().unwrap().current_occupancy);
    }
}

// ── Fast-forward ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod fast_forward {
    use super::*;

    #[test]
    fn rescheduled_immediately() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(100_000))).build().unwrap();
        sim.start().unwrap();
        sim.run_until(1_000, &mut NoopObserver).unwrap();
        assert_eq!(sim.next_due_ms(), Some(2_000));

        assert!(sim.fast_forward().unwrap());
        assert_eq!(sim.mode(), Mode::FastForward);
        assert_eq!(sim.next_due_ms(), Some(1_050));

        let report = sim.step(&mut NoopObserver).unwrap().unwrap();
        assert_eq!(report.now_ms, 1_050);
        assert_eq!(report.mode, Mode::FastForward);
        assert_eq!(sim.next_due_ms(), Some(1_100));
        assert!(!sim.fast_forward().unwrap());
    }

    #[test]
    fn reaches_target_and_drains() {
        let mut sim = SimBuilder::new(fixed_target(75), single_route(Some(100), Some(100))).build().unwrap();
        sim.start().unwrap();
        assert!(sim.fast_forward().unwrap());

        let mut obs = Counter::default();
        let reason = sim.run_to_end(15_000, &mut obs).unwrap();
        assert!(reason.is_some());
        assert!(sim.clock().now_ms <= 15_000);
        assert_eq!(sim.mode(), Mode::Ended);
        assert_eq!(obs.endings.len(), 1);

        let flow = sim.flow().unwrap();
        assert_eq!(flow.area_occupancy[0], flow.current_occupancy);
        assert!(flow.current_occupancy <= 100);
        assert_eq!(flow.in_transit.at_entrances[0], 0);
        assert_eq!(flow.in_transit.to_control_points[0], 0);
        assert_eq!(flow.in_transit.to_areas[0], 0);
        assert!(sim.occupancy_rate() >= 75.0 || reason == Some(EndReason::TimeCap));
    }

    #[test]
    fn time_cap_ends_after_fifteen_seconds() {
        // Rate can never exceed 0.1 %, so only the time cap can end it.
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, Some(1_000_000))).build().unwrap();
        sim.start().unwrap();
        sim.run_until(4_000, &mut NoopObserver).unwrap();
        assert!(sim.fast_forward().unwrap());

        let mut obs = Counter::default();
        let reason = sim.run_to_end(100_000, &mut obs).unwrap();
        assert_eq!(reason, Some(EndReason::TimeCap));
        assert_eq!(sim.clock().now_ms, 19_000);
        assert_eq!(obs.ends, 300);
        assert!(obs.modes.iter().all(|&m| m == Mode::FastForward));
        assert_eq!(sim.ticks(), Tick(302));
    }

    #[test]
    fn ended_is_terminal() {
        let mut sim = SimBuilder::new(fixed_target(75), single_route(Some(100), Some(100))).build().unwrap();
        sim.start().unwrap();
        sim.fast_forward().unwrap();
        sim.run_to_end(15_000, &mut NoopObserver).unwrap();
        let frozen = sim.flow().unwrap().clone();

        assert_eq!(sim.next_due_ms(), None);
        assert!(!sim.fast_forward().unwrap());
        assert!(sim.step(&mut NoopObserver).unwrap().is_none());
        assert_eq!(sim.run_until(1_000_000, &mut NoopObserver).unwrap(), 0);
        assert_eq!(sim.flow().unwrap(), &frozen);
    }

    #[test]
    fn zero_capacity_reports_zero_rate() {
        let mut sim = SimBuilder::new(FlowConfig::default(), single_route(None, None)).build().unwrap();
        sim.start().unwrap();
        sim.fast_forward().unwrap();
        let mut last = None;
        while let Some(report) = sim.step(&mut NoopObserver).unwrap() {
            assert_eq!(report.occupancy_rate, 0.0);
            last = Some(report);
        }
        let last = last.unwrap();
        assert_eq!(last.ended, Some(EndReason::TimeCap));
        let flow = sim.flow().unwrap();
        assert!(flow.current_occupancy > 0);
        assert_eq!(flow.remaining_capacity, 0);
    }
}

// ── Topology updates ──────────────────────────────────────────────────────────

#[cfg(test)]
mod topology_updates {
    use super::*;

    #[test]
    fn update_applies_at_next_tick() {
        let mut t = single_route(None, Some(1_000));
        let mut sim = SimBuilder::new(FlowConfig::default(), t.clone()).build().unwrap();
        sim.start().unwrap();
        sim.run_until(2_000, &mut NoopObserver).unwrap();

        let e2 = t.add_entrance("E2");
        t.add_route(e2, EntityKey(1), EntityKey(1)).unwrap();
        sim.update_topology(t);

        // Not yet in effect.
        assert_eq!(sim.topology().entrances.len(), 2);
        assert_eq!(sim.topology_snapshot().entrances.len(), 1);
        assert_eq!(sim.flow().unwrap().entrance_arrived.len(), 1);

        sim.step(&mut NoopObserver).unwrap();
        assert_eq!(sim.topology_snapshot().entrances.len(), 2);
        assert_eq!(sim.flow().unwrap().entrance_arrived.len(), 2);
        assert_eq!(sim.snapshot().unwrap().entrance_arrived.len(), 2);
    }

    #[test]
    fn deleted_area_route_is_reported_skipped() {
        let mut t = single_route(None, Some(1_000));
        let mut sim = SimBuilder::new(FlowConfig::default(), t.clone()).build().unwrap();
        sim.start().unwrap();
        sim.run_until(4_000, &mut NoopObserver).unwrap();

        t.remove_area(EntityKey(1)).unwrap();
        sim.update_topology(t);
        let report = sim.step(&mut NoopObserver).unwrap().unwrap();
        assert_eq!(report.outcome.skipped_routes, vec![EntityKey(1)]);
        // Population already in the deleted area still counts.
        assert_eq!(report.occupancy, sim.flow().unwrap().area_occupancy.iter().sum::<u64>());
    }
}
