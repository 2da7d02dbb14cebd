//! `vf-topology` — the venue layout the simulator flows population through.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`model`]    | `Topology`, `Area`, `Entrance`, `ControlPoint`, `Route`     |
//! | [`registry`] | `Registry` (external key → dense slot, append-only)         |
//! | [`snapshot`] | `TopologySnapshot`, `RouteLink` — one tick's resolved view  |
//! | [`loader`]   | JSON load/save of the event document                        |
//! | [`error`]    | `TopologyError`, `TopologyResult<T>`                        |
//!
//! # Snapshot model
//!
//! Editors mutate a [`Topology`] whenever they like.  The simulator compiles
//! it into a [`TopologySnapshot`] at the start of a tick and reads only that
//! snapshot until the tick completes, so an edit can never be observed
//! half-way through a tick.

pub mod error;
pub mod loader;
pub mod model;
pub mod registry;
pub mod snapshot;


pub use error::{TopologyError, TopologyResult};
pub use loader::{
    load_topology_json, load_topology_reader, load_topology_str, save_topology_json, topology_to_json,
};
pub use model::{Area, ControlPoint, EntityKind, Entrance, Route, Topology};
pub use registry::{Interner, Registry};
pub use snapshot::{RouteLink, TopologySnapshot};
