use thiserror::Error;

use vf_core::VfError;
use vf_topology::TopologyError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] VfError),

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("simulation has not been started (or was stopped)")]
    NotStarted,
}

pub type SimResult<T> = Result<T, SimError>;
