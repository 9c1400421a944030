//! Topology provider trait and the immutable per-cycle snapshot.
//!
//! Scoring only ever needs one question answered: which rack does this node
//! belong to? [`TopologyProvider`] is that question. The live
//! [`TopologyCache`](crate::TopologyCache) implements it behind a read lock;
//! [`TopologySnapshot`] implements it lock-free over a frozen copy, so a
//! cycle sees one consistent topology even while the provider keeps writing.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::{TopologyError, TopologyResult};

/// Resolves node names to rack ids.
pub trait TopologyProvider: Send + Sync {
    /// Rack id for `node_name`, or [`TopologyError::NodeNotMapped`].
    fn lookup_rack(&self, node_name: &str) -> TopologyResult<String>;
}

impl<T: TopologyProvider + ?Sized> TopologyProvider for Arc<T> {
    fn lookup_rack(&self, node_name: &str) -> TopologyResult<String> {
        (**self).lookup_rack(node_name)
    }
}

/// Frozen node-to-rack mapping for a single scheduling cycle.
///
/// Cheap to clone (`Arc` inside).
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    node_to_rack: Arc<HashMap<String, String>>,
}

impl TopologySnapshot {
    /// Build a snapshot from `(node, rack)` pairs. A later pair for the same
    /// node overrides an earlier one.
    pub fn from_pairs<I, N, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: Into<String>,
    {
        let node_to_rack = pairs
            .into_iter()
            .map(|(n, r)| (n.into(), r.into()))
            .collect();
        Self {
            node_to_rack: Arc::new(node_to_rack),
        }
    }

    pub(crate) fn from_map(node_to_rack: HashMap<String, String>) -> Self {
        Self {
            node_to_rack: Arc::new(node_to_rack),
        }
    }

    /// Borrowing lookup; `None` when the node is unmapped.
    pub fn rack_of(&self, node_name: &str) -> Option<&str> {
        self.node_to_rack.get(node_name).map(String::as_str)
    }

    /// Member nodes per rack, both levels sorted.
    pub fn racks(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut racks: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (node, rack) in self.node_to_rack.iter() {
            racks.entry(rack.as_str()).or_default().insert(node.as_str());
        }
        racks
    }

    /// Number of mapped nodes.
    pub fn len(&self) -> usize {
        self.node_to_rack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_to_rack.is_empty()
    }
}

impl TopologyProvider for TopologySnapshot {
    fn lookup_rack(&self, node_name: &str) -> TopologyResult<String> {
        self.rack_of(node_name)
            .map(str::to_string)
            .ok_or_else(|| TopologyError::NodeNotMapped(node_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_racks() -> TopologySnapshot {
        TopologySnapshot::from_pairs([
            ("node1", "rack-1"),
            ("node2", "rack-1"),
            ("node3", "rack-2"),
        ])
    }

    #[test]
    fn resolves_mapped_nodes() {
        let snap = two_racks();
        assert_eq!(snap.lookup_rack("node1").unwrap(), "rack-1");
        assert_eq!(snap.lookup_rack("node3").unwrap(), "rack-2");
        assert_eq!(snap.len(), 3);
    }

    #[test]
    fn unmapped_node_is_an_error() {
        let snap = two_racks();
        let err = snap.lookup_rack("node9").unwrap_err();
        assert!(matches!(err, TopologyError::NodeNotMapped(ref n) if n == "node9"));
    }

    #[test]
    fn racks_groups_members_in_order() {
        let snap = two_racks();
        let racks = snap.racks();
        assert_eq!(racks.len(), 2);
        let rack1: Vec<&str> = racks["rack-1"].iter().copied().collect();
        assert_eq!(rack1, vec!["node1", "node2"]);
    }

    #[test]
    fn later_pair_overrides_earlier() {
        let snap = TopologySnapshot::from_pairs([("node1", "rack-1"), ("node1", "rack-2")]);
        assert_eq!(snap.rack_of("node1"), Some("rack-2"));
    }

    #[test]
    fn works_through_arc_dyn() {
        let provider: Arc<dyn TopologyProvider> = Arc::new(two_racks());
        assert_eq!(provider.lookup_rack("node2").unwrap(), "rack-1");
    }
}
