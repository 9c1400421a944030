//! First-fit placement simulation on a single rack.
//!
//! Each task, in the given order, goes to the first member node (by name)
//! whose remaining capacity still holds it once earlier simulated
//! placements are counted. There is no search for a tighter fit.

use tracing::trace;

use crate::aggregate::RackAggregate;
use crate::demand::TaskDemand;
use crate::resources::Resources;

/// Where the simulation put one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlacement {
    pub task_id: String,
    pub node: String,
}

/// A rack that can host every task, with its post-placement usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedRack {
    pub rack_id: String,
    pub allocatable: Resources,
    /// Rack usage after all simulated placements.
    pub used: Resources,
    pub placements: Vec<TaskPlacement>,
}

/// Outcome of simulating one rack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RackFit {
    Feasible(SimulatedRack),
    /// `unplaced_task` found no node; tasks after it were not tried.
    Infeasible {
        rack_id: String,
        unplaced_task: String,
        placed: usize,
    },
}

impl RackFit {
    pub fn is_feasible(&self) -> bool {
        matches!(self, RackFit::Feasible(_))
    }
}

/// Simulate placing `tasks` (already sorted) on `rack`.
///
/// The aggregate itself is not modified.
pub fn simulate_rack(rack: &RackAggregate, tasks: &[TaskDemand]) -> RackFit {
    let mut nodes: Vec<(&str, Resources, Resources)> = rack
        .nodes
        .iter()
        .map(|(name, usage)| (name.as_str(), usage.allocatable, usage.used))
        .collect();
    let mut used = rack.used;
    let mut placements = Vec::with_capacity(tasks.len());

    for task in tasks {
        let slot = nodes.iter_mut().find(|(_, allocatable, node_used)| {
            node_used.saturating_add(task.request).fits_within(allocatable)
        });

        let Some((node_name, _, node_used)) = slot else {
            trace!(rack = %rack.rack_id, task = %task.task_id, "no node fits task");
            return RackFit::Infeasible {
                rack_id: rack.rack_id.clone(),
                unplaced_task: task.task_id.clone(),
                placed: placements.len(),
            };
        };

        *node_used = node_used.saturating_add(task.request);
        used = used.saturating_add(task.request);
        placements.push(TaskPlacement {
            task_id: task.task_id.clone(),
            node: node_name.to_string(),
        });
    }

    RackFit::Feasible(SimulatedRack {
        rack_id: rack.rack_id.clone(),
        allocatable: rack.allocatable,
        used,
        placements,
    })
}
