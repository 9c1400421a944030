//! Scheduler plugin error types.
//!
//! Every failure falls into one of four kinds. Lower-level errors from the
//! topology and placement crates are folded into them with `From`.

use rackpack_placement::PackError;
use rackpack_topology::TopologyError;
use thiserror::Error;

/// Errors returned to the node-ordering extension point for one task.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Unmapped node, zero allocatable capacity, unreadable topology.
    #[error("topology error: {0}")]
    Topology(String),

    /// Missing job, missing or unknown policy label, invalid weight label.
    #[error("policy error: {0}")]
    Policy(String),

    /// No rack can host the job, or the job already failed this cycle.
    #[error("placement error: {0}")]
    Placement(String),

    /// Decision state absent or inconsistent with the current candidates.
    #[error("state error: {0}")]
    State(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

impl From<TopologyError> for SchedulerError {
    fn from(err: TopologyError) -> Self {
        SchedulerError::Topology(err.to_string())
    }
}

impl From<PackError> for SchedulerError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::Topology(e) => e.into(),
            e @ (PackError::InvalidNodeCapacity(_) | PackError::InvalidRackCapacity(_)) => {
                SchedulerError::Topology(e.to_string())
            }
            e @ PackError::NoFeasibleRack { .. } => SchedulerError::Placement(e.to_string()),
            e @ PackError::RackNotFound(_) => SchedulerError::State(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_errors_map_to_kinds() {
        let unmapped: SchedulerError =
            PackError::Topology(TopologyError::NodeNotMapped("n1".into())).into();
        assert!(matches!(unmapped, SchedulerError::Topology(ref m) if m.contains("n1")));

        let zero: SchedulerError = PackError::InvalidNodeCapacity("n2".into()).into();
        assert!(matches!(zero, SchedulerError::Topology(_)));

        let rack_zero: SchedulerError = PackError::InvalidRackCapacity("r".into()).into();
        assert!(matches!(rack_zero, SchedulerError::Topology(_)));

        let none: SchedulerError = PackError::NoFeasibleRack { tasks: 3 }.into();
        assert!(matches!(none, SchedulerError::Placement(_)));

        let gone: SchedulerError = PackError::RackNotFound("r9".into()).into();
        assert!(matches!(gone, SchedulerError::State(_)));
    }

    #[test]
    fn display_carries_kind_prefix() {
        let err = SchedulerError::Policy("bad weight".into());
        assert_eq!(err.to_string(), "policy error: bad weight");
    }
}
