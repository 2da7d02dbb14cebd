//! Unit tests for vf-flow.

use vf_core::{Draw, EntityKey, ModeParams, SimRng};
use vf_topology::{Registry, Topology, TopologySnapshot};

use crate::{FlowState, drain_in_transit, simulate_tick};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Always draws the largest permitted value.
struct MaxDraw;

impl Draw for MaxDraw {
    fn below(&mut self, bound: u64) -> u64 {
        bound.saturating_sub(1)
    }
}

/// Always draws zero (`draw(1, V)` therefore yields 1).
struct MinDraw;

impl Draw for MinDraw {
    fn below(&mut self, _bound: u64) -> u64 {
        0
    }
}

/// E1 → C1 → A1 with the given area capacity.
fn single_route(area_capacity: u64, event_capacity: Option<u64>) -> Topology {
    let mut t = Topology::new();
    t.set_event_capacity(event_capacity);
    let e = t.add_entrance("E1");
    let c = t.add_control_point("C1");
    let a = t.add_area("A1", Some(area_capacity));
    t.add_route(e, c, a).unwrap();
    t
}

/// Two entrances sharing one control point, three areas.
fn festival() -> Topology {
    let mut t = Topology::new();
    t.set_event_capacity(Some(1_000));
    let main = t.add_entrance("Main Entrance");
    let vip = t.add_entrance("VIP Entrance");
    let sec1 = t.add_control_point("Security 1");
    let sec2 = t.add_control_point("Security 2");
    let stage = t.add_area("Main Stage", None);
    let lounge = t.add_area("VIP Area", Some(150));
    let food = t.add_area("Food Court", Some(300));
    t.add_route(main, sec1, stage).unwrap();
    t.add_route(vip, sec2, lounge).unwrap();
    t.add_route(main, sec1, food).unwrap();
    t
}

fn compile(t: &Topology, reg: &mut Registry) -> TopologySnapshot {
    TopologySnapshot::compile(t, reg, 1_000).unwrap()
}

/// Everything still somewhere in the pipeline, plus what has been discarded.
fn accounted(s: &FlowState, discarded: u64) -> u64 {
    s.in_transit.total() + s.dispatch_ready.iter().sum::<u64>() + s.current_occupancy + discarded
}

// ── Single tick ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod single_tick {
    use super::*;

    #[test]
    fn max_draws_fast_forward_scenario() {
        let mut reg = Registry::new();
        let snap = compile(&single_route(10, Some(100)), &mut reg);
        let state = FlowState::for_snapshot(&snap);

        let (s, out) = simulate_tick(&state, &snap, &ModeParams::FAST_FORWARD, &mut MaxDraw);

        assert_eq!(out.generated, 499);
        assert_eq!(s.total_entered, 499);
        assert_eq!(s.in_transit.at_entrances, vec![199]);
        assert_eq!(s.entrance_arrived, vec![300]);
        assert_eq!(s.in_transit.to_control_points, vec![6]);
        assert_eq!(s.control_point_passed, vec![294]);
        assert_eq!(s.dispatch_ready, vec![0]);
        assert_eq!(s.in_transit.to_areas, vec![6]);
        assert_eq!(s.area_occupancy, vec![10]);
        assert_eq!(out.discarded_at_capacity, 278);
        assert_eq!(s.current_occupancy, 10);
        assert_eq!(s.remaining_capacity, 90);
    }

    #[test]
    fn min_draws_normal_mode() {
        let mut reg = Registry::new();
        let snap = compile(&single_route(100, Some(100)), &mut reg);
        let state = FlowState::for_snapshot(&snap);

        // Nothing generated; draw(1, V) = 1 but the entrance buffer is empty.
        let (s, out) = simulate_tick(&state, &snap, &ModeParams::NORMAL, &mut MinDraw);
        assert_eq!(out.generated, 0);
        assert_eq!(s, state);
    }

    #[test]
    fn input_state_is_untouched() {
        let mut reg = Registry::new();
        let snap = compile(&festival(), &mut reg);
        let state = FlowState::for_snapshot(&snap);
        let before = state.clone();
        let _ = simulate_tick(&state, &snap, &ModeParams::FAST_FORWARD, &mut SimRng::new(1));
        assert_eq!(state, before);
    }

    #[test]
    fn halted_params_change_nothing() {
        let mut reg = Registry::new();
        let snap = compile(&festival(), &mut reg);
        let (busy, _) = simulate_tick(&FlowState::for_snapshot(&snap), &snap, &ModeParams::NORMAL, &mut MaxDraw);
        let (after, out) = simulate_tick(&busy, &snap, &ModeParams::HALTED, &mut MaxDraw);
        assert_eq!(after, busy);
        assert_eq!(out.generated, 0);
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut reg = Registry::new();
        let snap = compile(&festival(), &mut reg);
        let run = |seed| {
            let mut rng = SimRng::new(seed);
            let mut s = FlowState::for_snapshot(&snap);
            for _ in 0..50 {
                s = simulate_tick(&s, &snap, &ModeParams::NORMAL, &mut rng).0;
            }
            s
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }
}

// ── Invariants over many ticks ────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use super::*;

    fn run_checked(params: &ModeParams, ticks: usize, seed: u64) {
        let mut reg = Registry::new();
        let t = festival();
        let snap = compile(&t, &mut reg);
        let mut rng = SimRng::new(seed);
        let mut s = FlowState::for_snapshot(&snap);
        let mut discarded = 0;

        for _ in 0..ticks {
            let (next, out) = simulate_tick(&s, &snap, params, &mut rng);
            discarded += out.discarded_at_capacity;

            // Occupancy is exactly the per-area sum.
            assert_eq!(next.current_occupancy, next.area_occupancy.iter().sum::<u64>());

            // Capacity invariant.
            for &area in &snap.areas {
                assert!(next.occupancy_of(area) <= snap.area_capacity(area).unwrap());
            }

            // Cumulative counters never decrease.
            assert!(next.total_entered >= s.total_entered);
            for (a, b) in next.entrance_arrived.iter().zip(&s.entrance_arrived) {
                assert!(a >= b);
            }
            for (a, b) in next.control_point_passed.iter().zip(&s.control_point_passed) {
                assert!(a >= b);
            }

            // Every generated unit is somewhere, or was discarded.
            assert_eq!(accounted(&next, discarded), next.total_entered);

            assert_eq!(next.remaining_capacity, 1_000u64.saturating_sub(next.current_occupancy));
            s = next;
        }
    }

    #[test]
    fn normal_mode_holds_invariants() {
        run_checked(&ModeParams::NORMAL, 300, 7);
    }

    #[test]
    fn fast_forward_holds_invariants() {
        run_checked(&ModeParams::FAST_FORWARD, 300, 11);
    }

    #[test]
    fn capacity_reduction_is_clipped_next_tick() {
        let mut reg = Registry::new();
        let mut t = single_route(1_000, Some(1_000));
        let snap = compile(&t, &mut reg);
        let mut s = FlowState::for_snapshot(&snap);
        let mut rng = SimRng::new(5);
        for _ in 0..20 {
            s = simulate_tick(&s, &snap, &ModeParams::FAST_FORWARD, &mut rng).0;
        }
        assert!(s.current_occupancy > 5);

        t.set_area_capacity(EntityKey(1), Some(5)).unwrap();
        let snap = compile(&t, &mut reg);
        let (s, out) = simulate_tick(&s, &snap, &ModeParams::NORMAL, &mut rng);
        assert_eq!(s.area_occupancy, vec![5]);
        assert!(out.discarded_at_capacity > 0);
    }
}

// ── Topology changes ──────────────────────────────────────────────────────────

#[cfg(test)]
mod topology_changes {
    use super::*;

    #[test]
    fn dangling_route_is_skipped_and_buffers_kept() {
        let mut reg = Registry::new();
        let mut t = single_route(1_000, Some(1_000));
        let snap = compile(&t, &mut reg);
        let (s, _) = simulate_tick(&FlowState::for_snapshot(&snap), &snap, &ModeParams::FAST_FORWARD, &mut MaxDraw);
        let held = s.in_transit.to_areas[0];
        assert!(held > 0);

        let area = t.remove_area(EntityKey(1)).unwrap();
        let snap = compile(&t, &mut reg);
        let (s2, out) = simulate_tick(&s, &snap, &ModeParams::NORMAL, &mut MaxDraw);
        assert_eq!(out.skipped_routes, vec![EntityKey(1)]);
        assert_eq!(s2.in_transit.to_areas[0], held);
        // The entrance is still live, so generation continues.
        assert!(s2.in_transit.at_entrances[0] > s.in_transit.at_entrances[0]);

        t.areas.push(area);
        let snap = compile(&t, &mut reg);
        let (s3, out) = simulate_tick(&s2, &snap, &ModeParams::NORMAL, &mut MaxDraw);
        assert!(out.skipped_routes.is_empty());
        assert!(s3.in_transit.to_areas[0] < held + 30);
        assert!(s3.current_occupancy > s2.current_occupancy);
    }

    #[test]
    fn new_entities_get_zeroed_slots() {
        let mut reg = Registry::new();
        let mut t = single_route(100, Some(100));
        let snap = compile(&t, &mut reg);
        let (s, _) = simulate_tick(&FlowState::for_snapshot(&snap), &snap, &ModeParams::NORMAL, &mut MaxDraw);

        let e2 = t.add_entrance("E2");
        let a2 = t.add_area("A2", Some(10));
        t.add_route(e2, EntityKey(1), a2).unwrap();
        let snap = compile(&t, &mut reg);
        let (s2, _) = simulate_tick(&s, &snap, &ModeParams::NORMAL, &mut MinDraw);
        assert_eq!(s2.entrance_arrived.len(), 2);
        assert_eq!(s2.area_occupancy.len(), 2);
        assert_eq!(s2.in_transit.at_entrances[1], 0);
    }
}

// ── Drain + rates ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod drain {
    use super::*;

    #[test]
    fn drain_empties_every_live_buffer() {
        let mut reg = Registry::new();
        let snap = compile(&festival(), &mut reg);
        let mut rng = SimRng::new(3);
        let mut s = FlowState::for_snapshot(&snap);
        for _ in 0..5 {
            s = simulate_tick(&s, &snap, &ModeParams::FAST_FORWARD, &mut rng).0;
        }
        let passed_before: u64 = s.control_point_passed.iter().sum();
        let pending_cp: u64 = s.in_transit.to_control_points.iter().sum();

        drain_in_transit(&mut s, &snap);

        assert_eq!(s.in_transit.total(), 0);
        assert_eq!(s.control_point_passed.iter().sum::<u64>(), passed_before + pending_cp);
        assert_eq!(s.current_occupancy, s.area_occupancy.iter().sum::<u64>());
        for &area in &snap.areas {
            assert!(s.occupancy_of(area) <= snap.area_capacity(area).unwrap());
        }
    }

    #[test]
    fn drain_respects_capacity_and_reports_overflow() {
        let mut reg = Registry::new();
        let snap = compile(&single_route(10, Some(100)), &mut reg);
        let (mut s, _) = simulate_tick(&FlowState::for_snapshot(&snap), &snap, &ModeParams::FAST_FORWARD, &mut MaxDraw);
        // Area already full; the 6 units heading there are lost.
        let lost = drain_in_transit(&mut s, &snap);
        assert_eq!(lost, 6);
        assert_eq!(s.area_occupancy, vec![10]);
        assert_eq!(s.in_transit.total(), 0);
    }

    #[test]
    fn zero_event_capacity_guards_rate() {
        let mut reg = Registry::new();
        let snap = compile(&single_route(100, None), &mut reg);
        let (s, _) = simulate_tick(&FlowState::for_snapshot(&snap), &snap, &ModeParams::FAST_FORWARD, &mut MaxDraw);
        assert!(s.current_occupancy > 0);
        assert_eq!(s.remaining_capacity, 0);
        let rate = s.occupancy_rate(snap.event_capacity);
        assert_eq!(rate, 0.0);
        assert!(rate.is_finite());
    }

    #[test]
    fn rate_is_a_percentage() {
        let s = FlowState { current_occupancy: 75, ..FlowState::default() };
        assert_eq!(s.occupancy_rate(100), 75.0);
    }

    #[test]
    fn snapshot_rekeys_by_external_id() {
        let mut reg = Registry::new();
        let snap = compile(&festival(), &mut reg);
        let (s, _) = simulate_tick(&FlowState::for_snapshot(&snap), &snap, &ModeParams::FAST_FORWARD, &mut MaxDraw);
        let view = s.snapshot(&reg);
        assert_eq!(view.area_occupancy.len(), 3);
        assert_eq!(view.area_occupancy.values().sum::<u64>(), s.current_occupancy);
        assert_eq!(view.at_entrances.keys().copied().collect::<Vec<_>>(), vec![EntityKey(1), EntityKey(2)]);
    }
}
