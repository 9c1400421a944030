//! Rack search: simulate every rack, keep the feasible ones, pick the best.

use tracing::debug;

use crate::aggregate::RackAggregates;
use crate::demand::TaskDemand;
use crate::error::{PackError, PackResult};
use crate::resources::BinPackWeights;
use crate::select::select_rack;
use crate::simulate::{RackFit, SimulatedRack, simulate_rack};

/// The rack chosen to host a whole job.
#[derive(Debug, Clone, PartialEq)]
pub struct RackChoice {
    pub rack: SimulatedRack,
    pub score: f64,
}

impl RackChoice {
    pub fn rack_id(&self) -> &str {
        &self.rack.rack_id
    }
}

/// Find the rack that can host every task in `tasks` with the highest
/// weighted utilization.
///
/// `tasks` must already be in packing order (see
/// [`sort_by_dominant_resource`](crate::demand::sort_by_dominant_resource)).
/// Racks are simulated in ascending rack-id order.
pub fn find_rack(
    racks: &RackAggregates,
    tasks: &[TaskDemand],
    weights: &BinPackWeights,
) -> PackResult<RackChoice> {
    let mut feasible: Vec<SimulatedRack> = Vec::new();

    for rack in racks.values() {
        match simulate_rack(rack, tasks) {
            RackFit::Feasible(sim) => {
                debug!(
                    rack = %sim.rack_id,
                    used_cpu = sim.used.cpu_millis,
                    used_memory = sim.used.memory_bytes,
                    "rack can host all tasks"
                );
                feasible.push(sim);
            }
            RackFit::Infeasible {
                rack_id,
                unplaced_task,
                placed,
            } => {
                debug!(rack = %rack_id, task = %unplaced_task, placed, "rack cannot host job");
            }
        }
    }

    let Some((chosen, score)) = select_rack(&feasible, weights)? else {
        return Err(PackError::NoFeasibleRack { tasks: tasks.len() });
    };

    Ok(RackChoice {
        rack: chosen.clone(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_rack_aggregates;
    use crate::resources::{NodeSnapshot, Resources};
    use rackpack_topology::TopologySnapshot;

    fn make_node(name: &str, alloc: (u64, u64), used: (u64, u64)) -> NodeSnapshot {
        NodeSnapshot::new(
            name,
            Resources::new(alloc.0, alloc.1),
            Resources::new(used.0, used.1),
        )
    }

    fn tasks(n: usize, cpu: u64, mem: u64) -> Vec<TaskDemand> {
        (0..n)
            .map(|i| TaskDemand::new(format!("task{i}"), Resources::new(cpu, mem)))
            .collect()
    }

    fn two_rack_cluster() -> RackAggregates {
        let topology = TopologySnapshot::from_pairs([
            ("node1", "1"),
            ("node2", "1"),
            ("node3", "2"),
            ("node4", "2"),
        ]);
        let nodes = vec![
            make_node("node1", (100, 100), (50, 30)),
            make_node("node2", (100, 100), (50, 30)),
            make_node("node3", (100, 100), (30, 50)),
            make_node("node4", (100, 100), (30, 50)),
        ];
        build_rack_aggregates(&nodes, &topology).unwrap()
    }

    #[test]
    fn cpu_weighted_search_picks_cpu_heavy_rack() {
        let choice = find_rack(&two_rack_cluster(), &tasks(4, 10, 10), &BinPackWeights::new(5, 1)).unwrap();
        assert_eq!(choice.rack_id(), "1");
        assert!((choice.score - 4.0).abs() < 1e-9);
        assert_eq!(choice.rack.placements.len(), 4);
    }

    #[test]
    fn memory_weighted_search_picks_memory_heavy_rack() {
        let choice = find_rack(&two_rack_cluster(), &tasks(4, 10, 10), &BinPackWeights::new(1, 5)).unwrap();
        assert_eq!(choice.rack_id(), "2");
    }

    #[test]
    fn infeasible_racks_are_skipped() {
        // Rack 1 is far busier on CPU but cannot take a 60m task anywhere.
        let choice = find_rack(&two_rack_cluster(), &tasks(1, 60, 10), &BinPackWeights::new(5, 1)).unwrap();
        assert_eq!(choice.rack_id(), "2");
    }

    #[test]
    fn no_feasible_rack_is_an_error() {
        let err = find_rack(&two_rack_cluster(), &tasks(1, 200, 10), &BinPackWeights::default()).unwrap_err();
        assert!(matches!(err, PackError::NoFeasibleRack { tasks: 1 }));
    }

    #[test]
    fn empty_cluster_has_no_feasible_rack() {
        let err = find_rack(&RackAggregates::new(), &tasks(1, 1, 1), &BinPackWeights::default()).unwrap_err();
        assert!(matches!(err, PackError::NoFeasibleRack { .. }));
    }
}
