//! The editable topology store: areas, entrances, control points, routes.
//!
//! This is the admin-owned data.  The simulator never reads it directly; it
//! compiles a [`TopologySnapshot`][crate::TopologySnapshot] once per tick.
//!
//! Removing an entity never cascades to the routes that reference it.  Such
//! routes become unusable and are skipped by the tick engine until the
//! reference is restored or the route is removed.

use std::fmt;

use vf_core::EntityKey;

use crate::{TopologyError, TopologyResult};

// ── EntityKind ────────────────────────────────────────────────────────────────

/// Which list of the topology an entity lives in.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    Area,
    Entrance,
    ControlPoint,
    Route,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Area         => "area",
            EntityKind::Entrance     => "entrance",
            EntityKind::ControlPoint => "control point",
            EntityKind::Route        => "route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// A venue area with an optional occupancy limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Area {
    pub key:      EntityKey,
    pub name:     String,
    /// `None` when unset or non-numeric in the source document.
    pub capacity: Option<u64>,
}

impl Area {
    /// Capacity used by the simulator: the configured value or `default`.
    #[inline]
    pub fn effective_capacity(&self, default: u64) -> u64 {
        self.capacity.unwrap_or(default)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entrance {
    pub key:  EntityKey,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlPoint {
    pub key:  EntityKey,
    pub name: String,
}

/// An entrance → control point → area path.
///
/// Any endpoint may be `None` (never selected, or unparseable in the source
/// document); such a route is stored but never used by the tick engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub key:           EntityKey,
    pub entrance:      Option<EntityKey>,
    pub control_point: Option<EntityKey>,
    pub area:          Option<EntityKey>,
}

// ── Topology ──────────────────────────────────────────────────────────────────

/// The complete admin-configured venue layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    /// Overall venue capacity.  `None` is treated as 0 for rate calculations.
    pub event_capacity: Option<u64>,
    pub areas:          Vec<Area>,
    pub entrances:      Vec<Entrance>,
    pub control_points: Vec<ControlPoint>,
    pub routes:         Vec<Route>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn area(&self, key: EntityKey) -> Option<&Area> {
        self.areas.iter().find(|a| a.key == key)
    }

    pub fn entrance(&self, key: EntityKey) -> Option<&Entrance> {
        self.entrances.iter().find(|e| e.key == key)
    }

    pub fn control_point(&self, key: EntityKey) -> Option<&ControlPoint> {
        self.control_points.iter().find(|c| c.key == key)
    }

    pub fn route(&self, key: EntityKey) -> Option<&Route> {
        self.routes.iter().find(|r| r.key == key)
    }

    /// `true` if an entity of `kind` with `key` exists.
    pub fn contains(&self, kind: EntityKind, key: EntityKey) -> bool {
        match kind {
            EntityKind::Area         => self.area(key).is_some(),
            EntityKind::Entrance     => self.entrance(key).is_some(),
            EntityKind::ControlPoint => self.control_point(key).is_some(),
            EntityKind::Route        => self.route(key).is_some(),
        }
    }

    // ── Editing ───────────────────────────────────────────────────────────

    pub fn set_event_capacity(&mut self, capacity: Option<u64>) {
        self.event_capacity = capacity;
    }

    pub fn add_area(&mut self, name: impl Into<String>, capacity: Option<u64>) -> EntityKey {
        let key = next_key(self.areas.iter().map(|a| a.key));
        self.areas.push(Area { key, name: name.into(), capacity });
        key
    }

    pub fn add_entrance(&mut self, name: impl Into<String>) -> EntityKey {
        let key = next_key(self.entrances.iter().map(|e| e.key));
        self.entrances.push(Entrance { key, name: name.into() });
        key
    }

    pub fn add_control_point(&mut self, name: impl Into<String>) -> EntityKey {
        let key = next_key(self.control_points.iter().map(|c| c.key));
        self.control_points.push(ControlPoint { key, name: name.into() });
        key
    }

    /// Add a route.  All three endpoints must name existing entities.
    pub fn add_route(
        &mut self,
        entrance:      EntityKey,
        control_point: EntityKey,
        area:          EntityKey,
    ) -> TopologyResult<EntityKey> {
        if !self.contains(EntityKind::Entrance, entrance)
            || !self.contains(EntityKind::ControlPoint, control_point)
            || !self.contains(EntityKind::Area, area)
        {
            return Err(TopologyError::IncompleteRoute);
        }
        let key = next_key(self.routes.iter().map(|r| r.key));
        self.routes.push(Route {
            key,
            entrance:      Some(entrance),
            control_point: Some(control_point),
            area:          Some(area),
        });
        Ok(key)
    }

    pub fn rename(&mut self, kind: EntityKind, key: EntityKey, name: impl Into<String>) -> TopologyResult<()> {
        let slot = match kind {
            EntityKind::Area         => self.areas.iter_mut().find(|a| a.key == key).map(|a| &mut a.name),
            EntityKind::Entrance     => self.entrances.iter_mut().find(|e| e.key == key).map(|e| &mut e.name),
            EntityKind::ControlPoint => self.control_points.iter_mut().find(|c| c.key == key).map(|c| &mut c.name),
            // Routes carry no name.
            EntityKind::Route        => None,
        };
        match slot {
            Some(s) => {
                *s = name.into();
                Ok(())
            }
            None => Err(TopologyError::UnknownEntity { kind, key }),
        }
    }

    pub fn set_area_capacity(&mut self, key: EntityKey, capacity: Option<u64>) -> TopologyResult<()> {
        let area = self
            .areas
            .iter_mut()
            .find(|a| a.key == key)
            .ok_or(TopologyError::UnknownEntity { kind: EntityKind::Area, key })?;
        area.capacity = capacity;
        Ok(())
    }

    pub fn remove_area(&mut self, key: EntityKey) -> TopologyResult<Area> {
        remove_by_key(&mut self.areas, |a| a.key == key)
            .ok_or(TopologyError::UnknownEntity { kind: EntityKind::Area, key })
    }

    pub fn remove_entrance(&mut self, key: EntityKey) -> TopologyResult<Entrance> {
        remove_by_key(&mut self.entrances, |e| e.key == key)
            .ok_or(TopologyError::UnknownEntity { kind: EntityKind::Entrance, key })
    }

    pub fn remove_control_point(&mut self, key: EntityKey) -> TopologyResult<ControlPoint> {
        remove_by_key(&mut self.control_points, |c| c.key == key)
            .ok_or(TopologyError::UnknownEntity { kind: EntityKind::ControlPoint, key })
    }

    pub fn remove_route(&mut self, key: EntityKey) -> TopologyResult<Route> {
        remove_by_key(&mut self.routes, |r| r.key == key)
            .ok_or(TopologyError::UnknownEntity { kind: EntityKind::Route, key })
    }

    /// Human-readable `Entrance → Control point → Area` label for a route.
    /// Missing endpoints render as `?`.
    pub fn describe_route(&self, route: &Route) -> String {
        let entrance = route.entrance.and_then(|k| self.entrance(k)).map_or("?", |e| e.name.as_str());
        let cp = route.control_point.and_then(|k| self.control_point(k)).map_or("?", |c| c.name.as_str());
        let area = route.area.and_then(|k| self.area(k)).map_or("?", |a| a.name.as_str());
        format!("{entrance} → {cp} → {area}")
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One past the largest key in use (1 for an empty list).  When the largest
/// key is `u64::MAX`, the smallest unused key from 1 upwards.
fn next_key(keys: impl Iterator<Item = EntityKey>) -> EntityKey {
    let mut used: Vec<u64> = keys.map(|k| k.0).collect();
    let Some(&max) = used.iter().max() else {
        return EntityKey(1);
    };
    if let Some(next) = max.checked_add(1) {
        return EntityKey(next);
    }
    used.sort_unstable();
    let mut candidate = 1;
    for k in used {
        if k == candidate {
            candidate += 1;
        } else if k > candidate {
            break;
        }
    }
    EntityKey(candidate)
}

fn remove_by_key<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Option<T> {
    let pos = items.iter().position(pred)?;
    Some(items.remove(pos))
}
