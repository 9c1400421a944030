//! Rack aggregation: group candidate nodes by rack and sum their capacity.
//!
//! Rebuilt on every scoring call because the candidate set can differ
//! between tasks of the same job.

use std::collections::BTreeMap;

use rackpack_topology::TopologyProvider;
use tracing::{debug, warn};

use crate::error::{PackError, PackResult};
use crate::resources::{NodeSnapshot, Resources};

/// Allocatable and used capacity of one node inside a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeUsage {
    pub allocatable: Resources,
    pub used: Resources,
}

/// Per-rack totals plus per-node detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackAggregate {
    pub rack_id: String,
    /// Sum of member allocatable capacity.
    pub allocatable: Resources,
    /// Sum of member used capacity.
    pub used: Resources,
    /// Member nodes keyed by name; iteration order is the first-fit scan order.
    pub nodes: BTreeMap<String, NodeUsage>,
}

impl RackAggregate {
    fn new(rack_id: &str) -> Self {
        Self {
            rack_id: rack_id.to_string(),
            allocatable: Resources::ZERO,
            used: Resources::ZERO,
            nodes: BTreeMap::new(),
        }
    }

    fn add_node(&mut self, node: &NodeSnapshot) {
        self.allocatable = self.allocatable.saturating_add(node.allocatable);
        self.used = self.used.saturating_add(node.used);
        self.nodes.insert(
            node.name.clone(),
            NodeUsage {
                allocatable: node.allocatable,
                used: node.used,
            },
        );
    }

    pub fn contains_node(&self, node_name: &str) -> bool {
        self.nodes.contains_key(node_name)
    }
}

/// Rack id -> aggregate, ordered by rack id.
pub type RackAggregates = BTreeMap<String, RackAggregate>;

/// Group `nodes` into racks using `topology`.
///
/// Fails on the first node that has no rack mapping or reports zero
/// allocatable CPU or memory. A node name repeated in the candidate list is
/// counted once.
pub fn build_rack_aggregates(
    nodes: &[NodeSnapshot],
    topology: &dyn TopologyProvider,
) -> PackResult<RackAggregates> {
    let mut racks: RackAggregates = BTreeMap::new();

    for node in nodes {
        let rack_id = topology.lookup_rack(&node.name)?;
        if node.allocatable.has_zero_dimension() {
            return Err(PackError::InvalidNodeCapacity(node.name.clone()));
        }

        let rack = racks
            .entry(rack_id.clone())
            .or_insert_with(|| RackAggregate::new(&rack_id));
        if rack.contains_node(&node.name) {
            warn!(node = %node.name, rack = %rack_id, "duplicate candidate node ignored");
            continue;
        }
        rack.add_node(node);
    }

    debug!(
        nodes = nodes.len(),
        racks = racks.len(),
        "grouped candidate nodes by rack"
    );
    Ok(racks)
}
