//! Node scoring for a chosen rack.

use std::collections::HashMap;

use crate::aggregate::RackAggregates;
use crate::error::{PackError, PackResult};

/// Score given to every node of the chosen rack. Matches the 0..=10000
/// scale of the surrounding scheduler's node-ordering pipeline.
pub const MAX_NODE_SCORE: f64 = 10_000.0;

/// Give every member of `rack_id` [`MAX_NODE_SCORE`].
///
/// Nodes outside the rack are left out of the map; the node-ordering
/// pipeline reads a missing entry as zero.
pub fn score_rack_nodes(rack_id: &str, racks: &RackAggregates) -> PackResult<HashMap<String, f64>> {
    let rack = racks
        .get(rack_id)
        .ok_or_else(|| PackError::RackNotFound(rack_id.to_string()))?;

    Ok(rack
        .nodes
        .keys()
        .map(|name| (name.clone(), MAX_NODE_SCORE))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_rack_aggregates;
    use crate::resources::{NodeSnapshot, Resources};
    use rackpack_topology::TopologySnapshot;

    fn racks() -> RackAggregates {
        let topology = TopologySnapshot::from_pairs([("n1", "a"), ("n2", "a"), ("n3", "b")]);
        let nodes: Vec<NodeSnapshot> = ["n1", "n2", "n3"]
            .iter()
            .map(|n| NodeSnapshot::new(*n, Resources::new(10, 10), Resources::ZERO))
            .collect();
        build_rack_aggregates(&nodes, &topology).unwrap()
    }

    #[test]
    fn members_get_max_score_others_absent() {
        let scores = score_rack_nodes("a", &racks()).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores["n1"], MAX_NODE_SCORE);
        assert_eq!(scores["n2"], MAX_NODE_SCORE);
        assert!(!scores.contains_key("n3"));
    }

    #[test]
    fn unknown_rack_is_an_error() {
        let err = score_rack_nodes("zzz", &racks()).unwrap_err();
        assert!(matches!(err, PackError::RackNotFound(ref r) if r == "zzz"));
    }
}
