//! `TopologySnapshot` — the immutable, index-resolved view the tick engine
//! reads for exactly one tick.
//!
//! Compiling resolves every external key to a dense slot once, so route
//! processing is pure `Vec` indexing.  Route order equals topology order,
//! which makes a seeded run replayable.

use log::warn;

use vf_core::{AreaId, ControlPointId, EntityKey, EntranceId};

use crate::{Registry, Topology, TopologyResult};

/// A route with its endpoints resolved against the live entity set.
///
/// An endpoint is `None` when the route never named one, or named an entity
/// that is not present in this snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RouteLink {
    pub key:           EntityKey,
    pub entrance:      Option<EntranceId>,
    pub control_point: Option<ControlPointId>,
    pub area:          Option<AreaId>,
}

impl RouteLink {
    /// All three endpoints, or `None` if the route is unusable this tick.
    #[inline]
    pub fn resolved(&self) -> Option<(EntranceId, ControlPointId, AreaId)> {
        Some((self.entrance?, self.control_point?, self.area?))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TopologySnapshot {
    /// Overall venue capacity; absent in the topology → 0.
    pub event_capacity: u64,

    /// Live entrances in topology order.
    pub entrances: Vec<EntranceId>,

    /// Live control points in topology order.
    pub control_points: Vec<ControlPointId>,

    /// Live areas in topology order.
    pub areas: Vec<AreaId>,

    /// Every route in topology order, usable or not.
    pub routes: Vec<RouteLink>,

    /// Effective capacity per area slot; `None` for slots not live now.
    area_capacity: Vec<Option<u64>>,

    entrance_live:      Vec<bool>,
    control_point_live: Vec<bool>,
}

impl TopologySnapshot {
    /// Resolve `topology` against `registry`, interning any new keys.
    ///
    /// Duplicate keys within one list are kept once (first occurrence).
    pub fn compile(
        topology:              &Topology,
        registry:              &mut Registry,
        default_area_capacity: u64,
    ) -> TopologyResult<Self> {
        // ── Live entities ─────────────────────────────────────────────────
        let mut entrances = Vec::with_capacity(topology.entrances.len());
        for e in &topology.entrances {
            entrances.push(registry.entrances.intern(e.key)?);
        }
        let mut control_points = Vec::with_capacity(topology.control_points.len());
        for c in &topology.control_points {
            control_points.push(registry.control_points.intern(c.key)?);
        }
        let mut areas = Vec::with_capacity(topology.areas.len());
        let mut capacities = Vec::with_capacity(topology.areas.len());
        for a in &topology.areas {
            areas.push(registry.areas.intern(a.key)?);
            capacities.push(a.effective_capacity(default_area_capacity));
        }

        let mut entrance_live = vec![false; registry.entrances.len()];
        entrances.retain(|id| !std::mem::replace(&mut entrance_live[id.index()], true));

        let mut control_point_live = vec![false; registry.control_points.len()];
        control_points.retain(|id| !std::mem::replace(&mut control_point_live[id.index()], true));

        let mut area_capacity = vec![None; registry.areas.len()];
        let mut live_areas = Vec::with_capacity(areas.len());
        for (id, cap) in areas.into_iter().zip(capacities) {
            let slot = &mut area_capacity[id.index()];
            if slot.is_none() {
                *slot = Some(cap);
                live_areas.push(id);
            }
        }

        if entrances.len() != topology.entrances.len()
            || control_points.len() != topology.control_points.len()
            || live_areas.len() != topology.areas.len()
        {
            warn!("topology contains duplicate entity ids; later duplicates ignored");
        }

        // ── Routes ────────────────────────────────────────────────────────
        let routes = topology
            .routes
            .iter()
            .map(|r| RouteLink {
                key:           r.key,
                entrance:      r
                    .entrance
                    .and_then(|k| registry.entrances.get(k))
                    .filter(|id| entrance_live[id.index()]),
                control_point: r
                    .control_point
                    .and_then(|k| registry.control_points.get(k))
                    .filter(|id| control_point_live[id.index()]),
                area:          r
                    .area
                    .and_then(|k| registry.areas.get(k))
                    .filter(|id| area_capacity[id.index()].is_some()),
            })
            .collect();

        Ok(Self {
            event_capacity: topology.event_capacity.unwrap_or(0),
            entrances,
            control_points,
            areas: live_areas,
            routes,
            area_capacity,
            entrance_live,
            control_point_live,
        })
    }

    /// Capacity of a live area; `None` if the slot is not live.
    #[inline]
    pub fn area_capacity(&self, area: AreaId) -> Option<u64> {
        self.area_capacity.get(area.index()).copied().flatten()
    }

    /// Slot counts `(entrances, control_points, areas)` at compile time.
    pub fn slot_counts(&self) -> (usize, usize, usize) {
        (self.entrance_live.len(), self.control_point_live.len(), self.area_capacity.len())
    }

    /// Number of routes with all three endpoints live.
    pub fn usable_route_count(&self) -> usize {
        self.routes.iter().filter(|r| r.resolved().is_some()).count()
    }
}
