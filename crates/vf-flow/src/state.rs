//! `FlowState` — aggregate population counters for every pipeline stage.
//!
//! All per-entity counters are dense `Vec<u64>` indexed by the registry slot
//! (`EntranceId`, `ControlPointId`, `AreaId`).  Slots of deleted entities
//! keep their values; see [`vf_topology::Registry`].

use std::collections::BTreeMap;

use vf_core::{AreaId, EntityKey};
use vf_topology::{Interner, Registry, TopologySnapshot};

/// Population that has left one stage but not reached the next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InTransit {
    /// Generated at an entrance, not yet through it.  Indexed by `EntranceId`.
    pub at_entrances:      Vec<u64>,
    /// Through an entrance, walking to a control point.  Indexed by `ControlPointId`.
    pub to_control_points: Vec<u64>,
    /// Dispatched from a control point toward an area.  Indexed by `AreaId`.
    pub to_areas:          Vec<u64>,
}

impl InTransit {
    /// Sum of all three buffers.
    pub fn total(&self) -> u64 {
        self.at_entrances.iter().sum::<u64>()
            + self.to_control_points.iter().sum::<u64>()
            + self.to_areas.iter().sum::<u64>()
    }
}

/// The simulator's mutable state.  Recreated at every (re)start.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowState {
    /// Cumulative population that has passed each entrance.
    pub entrance_arrived: Vec<u64>,

    /// Cumulative population that has passed each control point.  Never
    /// decreases.
    pub control_point_passed: Vec<u64>,

    /// Population past a control point, waiting to be dispatched toward an
    /// area.  Fed together with `control_point_passed`, drained by dispatch.
    pub dispatch_ready: Vec<u64>,

    /// Current population resident in each area.  `<=` the area capacity.
    pub area_occupancy: Vec<u64>,

    pub in_transit: InTransit,

    /// Cumulative population ever generated at any entrance.
    pub total_entered: u64,

    /// Sum of `area_occupancy`; recomputed, never tracked independently.
    pub current_occupancy: u64,

    /// `event_capacity - current_occupancy`, floored at 0.
    pub remaining_capacity: u64,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed state sized for `snapshot`.
    pub fn for_snapshot(snapshot: &TopologySnapshot) -> Self {
        let mut state = Self::new();
        state.ensure_slots(snapshot);
        state.recompute(snapshot);
        state
    }

    /// Grow every per-slot counter to the snapshot's slot counts.  New slots
    /// start at zero; existing slots are untouched.
    pub fn ensure_slots(&mut self, snapshot: &TopologySnapshot) {
        let (entrances, control_points, areas) = snapshot.slot_counts();
        grow(&mut self.entrance_arrived, entrances);
        grow(&mut self.in_transit.at_entrances, entrances);
        grow(&mut self.control_point_passed, control_points);
        grow(&mut self.dispatch_ready, control_points);
        grow(&mut self.in_transit.to_control_points, control_points);
        grow(&mut self.area_occupancy, areas);
        grow(&mut self.in_transit.to_areas, areas);
    }

    /// Recompute the derived totals from the per-area counters.
    pub fn recompute(&mut self, snapshot: &TopologySnapshot) {
        self.current_occupancy = self.area_occupancy.iter().sum();
        self.remaining_capacity = snapshot.event_capacity.saturating_sub(self.current_occupancy);
    }

    /// Occupancy as a percentage of `event_capacity`; `0.0` when the
    /// capacity is zero.
    pub fn occupancy_rate(&self, event_capacity: u64) -> f64 {
        if event_capacity == 0 {
            return 0.0;
        }
        self.current_occupancy as f64 / event_capacity as f64 * 100.0
    }

    #[inline]
    pub fn occupancy_of(&self, area: AreaId) -> u64 {
        self.area_occupancy.get(area.index()).copied().unwrap_or(0)
    }

    /// Re-key every counter by external entity key for presentation.
    pub fn snapshot(&self, registry: &Registry) -> FlowSnapshot {
        FlowSnapshot {
            entrance_arrived:     by_key(&registry.entrances, &self.entrance_arrived),
            control_point_passed: by_key(&registry.control_points, &self.control_point_passed),
            dispatch_ready:       by_key(&registry.control_points, &self.dispatch_ready),
            area_occupancy:       by_key(&registry.areas, &self.area_occupancy),
            at_entrances:         by_key(&registry.entrances, &self.in_transit.at_entrances),
            to_control_points:    by_key(&registry.control_points, &self.in_transit.to_control_points),
            to_areas:             by_key(&registry.areas, &self.in_transit.to_areas),
            total_entered:        self.total_entered,
            current_occupancy:    self.current_occupancy,
            remaining_capacity:   self.remaining_capacity,
        }
    }
}

/// [`FlowState`] keyed by external entity keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FlowSnapshot {
    pub entrance_arrived:     BTreeMap<EntityKey, u64>,
    pub control_point_passed: BTreeMap<EntityKey, u64>,
    pub dispatch_ready:       BTreeMap<EntityKey, u64>,
    pub area_occupancy:       BTreeMap<EntityKey, u64>,
    pub at_entrances:         BTreeMap<EntityKey, u64>,
    pub to_control_points:    BTreeMap<EntityKey, u64>,
    pub to_areas:             BTreeMap<EntityKey, u64>,
    pub total_entered:        u64,
    pub current_occupancy:    u64,
    pub remaining_capacity:   u64,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn grow(v: &mut Vec<u64>, len: usize) {
    if v.len() < len {
        v.resize(len, 0);
    }
}

fn by_key<I>(interner: &Interner<I>, values: &[u64]) -> BTreeMap<EntityKey, u64>
where
    I: Copy + TryFrom<usize> + Into<usize>,
{
    interner.keys().iter().copied().zip(values.iter().copied()).collect()
}
