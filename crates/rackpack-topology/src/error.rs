//! Error types for topology lookups and loading.

use thiserror::Error;

/// Result type alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors that can occur while reading or loading the topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("no rack id mapped for node {0}")]
    NodeNotMapped(String),

    #[error("node {node} listed under both rack {first} and rack {second}")]
    DuplicateNode {
        node: String,
        first: String,
        second: String,
    },

    #[error("topology lock poisoned")]
    LockPoisoned,

    #[error("failed to read rack map: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rack map: {0}")]
    Parse(String),
}
