//! The tick engine: one discrete step of the entrance → control point → area
//! pipeline.
//!
//! # Per-tick order
//!
//! ```text
//! ① Generation, per live entrance:  at_entrances += below(U)
//! ② Per route, in topology order (unusable routes skipped):
//!      a. entrance → control point   min(at_entrance, draw(1, V))
//!      b. control point arrival      floor(to_control_point * R)
//!      c. control point → area       min(dispatch_ready, draw(1, V))
//!      d. area arrival               floor(to_area * R), clipped at capacity
//! ③ Clip stale over-capacity areas, recompute totals.
//! ```
//!
//! Routes that share a buffer each act on it in turn, so a control point on
//! two routes sees its arrival fraction applied twice per tick.
//!
//! Units clipped at an area's capacity are discarded, not returned to the
//! buffer.  The count is reported in [`TickOutcome`].

use log::debug;

use vf_core::{AreaId, Draw, EntityKey, ModeParams};
use vf_topology::TopologySnapshot;

use crate::FlowState;

/// Side record of one tick, for logging and observers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Population generated at entrances this tick.
    pub generated: u64,
    /// Routes skipped because an endpoint did not resolve.
    pub skipped_routes: Vec<EntityKey>,
    /// Units lost to area capacity limits.
    pub discarded_at_capacity: u64,
}

/// Produce the next flow state from `state`.
///
/// Pure apart from `rng`: `state` is cloned, the clone is advanced, and both
/// the new state and a [`TickOutcome`] are returned.
pub fn simulate_tick<D: Draw + ?Sized>(
    state:    &FlowState,
    snapshot: &TopologySnapshot,
    params:   &ModeParams,
    rng:      &mut D,
) -> (FlowState, TickOutcome) {
    let mut next = state.clone();
    next.ensure_slots(snapshot);
    let mut outcome = TickOutcome::default();

    // ── ① Generation ──────────────────────────────────────────────────────
    if params.generation_bound > 0 {
        for &entrance in &snapshot.entrances {
            let n = rng.below(params.generation_bound);
            next.in_transit.at_entrances[entrance.index()] += n;
            next.total_entered += n;
            outcome.generated += n;
        }
    }

    // ── ② Route advancement ───────────────────────────────────────────────
    if !params.is_halted() {
        for link in &snapshot.routes {
            let Some((entrance, cp, area)) = link.resolved() else {
                outcome.skipped_routes.push(link.key);
                continue;
            };
            let (e, c, a) = (entrance.index(), cp.index(), area.index());

            // a. entrance → control point
            let moved = next.in_transit.at_entrances[e].min(rng.between_one_and(params.advance_bound));
            next.in_transit.at_entrances[e] -= moved;
            next.entrance_arrived[e] += moved;
            next.in_transit.to_control_points[c] += moved;

            // b. arrival at the control point
            let arrived = fraction(next.in_transit.to_control_points[c], params.arrival_ratio);
            next.in_transit.to_control_points[c] -= arrived;
            next.control_point_passed[c] += arrived;
            next.dispatch_ready[c] += arrived;

            // c. control point → area
            let moved = next.dispatch_ready[c].min(rng.between_one_and(params.advance_bound));
            next.dispatch_ready[c] -= moved;
            next.in_transit.to_areas[a] += moved;

            // d. arrival in the area
            let arrived = fraction(next.in_transit.to_areas[a], params.arrival_ratio);
            next.in_transit.to_areas[a] -= arrived;
            let capacity = snapshot.area_capacity(area).unwrap_or(0);
            outcome.discarded_at_capacity += admit(&mut next, area, arrived, capacity);
        }
    }

    // ── ③ Totals ──────────────────────────────────────────────────────────
    outcome.discarded_at_capacity += clip_to_capacity(&mut next, snapshot);
    next.recompute(snapshot);

    if !outcome.skipped_routes.is_empty() {
        debug!("skipped {} unusable route(s): {:?}", outcome.skipped_routes.len(), outcome.skipped_routes);
    }
    debug!(
        "tick: generated={} occupancy={} in_transit={} discarded={}",
        outcome.generated,
        next.current_occupancy,
        next.in_transit.total(),
        outcome.discarded_at_capacity,
    );

    (next, outcome)
}

/// Move every live in-transit buffer straight into its destination stage.
///
/// Entrance buffers count as having passed the entrance, control-point
/// buffers as having passed the control point, and area buffers enter their
/// area up to capacity.  Buffers of entities absent from `snapshot` stay put.
/// Returns the number of units discarded at capacity.
pub fn drain_in_transit(state: &mut FlowState, snapshot: &TopologySnapshot) -> u64 {
    state.ensure_slots(snapshot);

    for &entrance in &snapshot.entrances {
        let e = entrance.index();
        let n = std::mem::take(&mut state.in_transit.at_entrances[e]);
        state.entrance_arrived[e] += n;
    }

    for &cp in &snapshot.control_points {
        let c = cp.index();
        let n = std::mem::take(&mut state.in_transit.to_control_points[c]);
        state.control_point_passed[c] += n;
        state.dispatch_ready[c] += n;
    }

    let mut discarded = 0;
    for &area in &snapshot.areas {
        let n = std::mem::take(&mut state.in_transit.to_areas[area.index()]);
        let capacity = snapshot.area_capacity(area).unwrap_or(0);
        discarded += admit(state, area, n, capacity);
    }

    state.recompute(snapshot);
    discarded
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `floor(buffer * ratio)`, never more than `buffer`.
#[inline]
fn fraction(buffer: u64, ratio: f64) -> u64 {
    ((buffer as f64 * ratio).floor() as u64).min(buffer)
}

/// Add `arrived` to an area, capped at `capacity`.  Returns the overflow.
#[inline]
fn admit(state: &mut FlowState, area: AreaId, arrived: u64, capacity: u64) -> u64 {
    let occ = &mut state.area_occupancy[area.index()];
    let admitted = arrived.min(capacity.saturating_sub(*occ));
    *occ += admitted;
    arrived - admitted
}

/// Enforce the capacity invariant for areas whose limit dropped below their
/// occupancy since the last tick.  Returns the number of units removed.
fn clip_to_capacity(state: &mut FlowState, snapshot: &TopologySnapshot) -> u64 {
    let mut removed = 0;
    for &area in &snapshot.areas {
        let capacity = snapshot.area_capacity(area).unwrap_or(0);
        let occ = &mut state.area_occupancy[area.index()];
        if *occ > capacity {
            removed += *occ - capacity;
            *occ = capacity;
        }
    }
    removed
}
