use thiserror::Error;

use vf_core::EntityKey;

use crate::EntityKind;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topology JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid {kind} id {raw}: expected a non-negative integer")]
    InvalidKey { kind: EntityKind, raw: String },

    #[error("{kind} {key} not found")]
    UnknownEntity { kind: EntityKind, key: EntityKey },

    #[error("a route needs an entrance, a control point, and an area")]
    IncompleteRoute,

    #[error("too many {0}s for a 32-bit slot index")]
    SlotOverflow(EntityKind),
}

pub type TopologyResult<T> = Result<T, TopologyError>;
