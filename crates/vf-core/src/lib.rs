//! `vf-core` — foundational types for the venue-flow occupancy simulator.
//!
//! This crate is a dependency of every other `vf-*` crate.  It has no `vf-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`ids`]    | `AreaId`, `EntranceId`, `ControlPointId`, `EntityKey` |
//! | [`time`]   | `Tick`, `SimClock`                                    |
//! | [`rng`]    | `Draw` trait, `SimRng`                                |
//! | [`config`] | `FlowConfig`, `ModeParams`                            |
//! | [`error`]  | `VfError`, `VfResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                 |
//! |---------|--------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.    |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FlowConfig, ModeParams};
pub use error::{VfError, VfResult};
pub use ids::{AreaId, ControlPointId, EntityKey, EntranceId};
pub use rng::{Draw, SimRng};
pub use time::{SimClock, Tick};
