//! Placement error types.

use rackpack_topology::TopologyError;
use thiserror::Error;

/// Result type alias for placement operations.
pub type PackResult<T> = Result<T, PackError>;

/// Errors produced while aggregating, simulating, or scoring racks.
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("node {0} resource info is invalid: zero allocatable cpu or memory")]
    InvalidNodeCapacity(String),

    #[error("rack {0} resource info is invalid: zero allocatable cpu or memory")]
    InvalidRackCapacity(String),

    #[error("no rack can host all {tasks} tasks of the job")]
    NoFeasibleRack { tasks: usize },

    #[error("rack {0} not found in rack aggregate")]
    RackNotFound(String),
}
