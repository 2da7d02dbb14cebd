//! `Registry` — external key → dense slot interning.
//!
//! Slots are append-only.  A key keeps its slot for the lifetime of the
//! registry even after the entity is deleted from the topology, so the flow
//! state's buffers for that slot stay addressable and resume if the entity is
//! restored under the same key.

use rustc_hash::FxHashMap;

use vf_core::{AreaId, ControlPointId, EntityKey, EntranceId};

use crate::{EntityKind, TopologyError, TopologyResult};

/// Per-kind interner.
#[derive(Clone, Debug)]
pub struct Interner<I> {
    by_key: FxHashMap<EntityKey, I>,
    keys:   Vec<EntityKey>,
    kind:   EntityKind,
}

impl<I> Interner<I>
where
    I: Copy + TryFrom<usize> + Into<usize>,
{
    fn new(kind: EntityKind) -> Self {
        Self { by_key: FxHashMap::default(), keys: Vec::new(), kind }
    }

    /// Return the slot for `key`, allocating the next one on first sight.
    pub fn intern(&mut self, key: EntityKey) -> TopologyResult<I> {
        if let Some(&id) = self.by_key.get(&key) {
            return Ok(id);
        }
        let id = I::try_from(self.keys.len()).map_err(|_| TopologyError::SlotOverflow(self.kind))?;
        self.by_key.insert(key, id);
        self.keys.push(key);
        Ok(id)
    }

    /// Slot previously issued for `key`, if any.
    #[inline]
    pub fn get(&self, key: EntityKey) -> Option<I> {
        self.by_key.get(&key).copied()
    }

    /// External key of a slot.
    #[inline]
    pub fn key_of(&self, id: I) -> Option<EntityKey> {
        self.keys.get(id.into()).copied()
    }

    /// Number of slots ever issued.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in slot order.
    pub fn keys(&self) -> &[EntityKey] {
        &self.keys
    }
}

/// Slot registry for all stateful entity kinds.  Routes hold no flow state
/// and are not interned.
#[derive(Clone, Debug)]
pub struct Registry {
    pub areas:          Interner<AreaId>,
    pub entrances:      Interner<EntranceId>,
    pub control_points: Interner<ControlPointId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            areas:          Interner::new(EntityKind::Area),
            entrances:      Interner::new(EntityKind::Entrance),
            control_points: Interner::new(EntityKind::ControlPoint),
        }
    }
}
