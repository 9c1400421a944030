//! Shared topology cache.
//!
//! Written by the external topology provider, read by every scoring call.
//! Readers take the read side of a `std::sync::RwLock`; a poisoned lock is
//! reported as [`TopologyError::LockPoisoned`] instead of panicking the
//! scheduler.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::error::{TopologyError, TopologyResult};
use crate::file::RackMap;
use crate::provider::{TopologyProvider, TopologySnapshot};

#[derive(Debug, Default)]
struct Maps {
    node_to_rack: HashMap<String, String>,
    rack_to_nodes: BTreeMap<String, BTreeSet<String>>,
}

impl Maps {
    fn from_rack_map(map: &RackMap) -> TopologyResult<Self> {
        let node_to_rack = map.node_index()?;
        let mut rack_to_nodes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (node, rack) in &node_to_rack {
            rack_to_nodes
                .entry(rack.clone())
                .or_default()
                .insert(node.clone());
        }
        Ok(Self {
            node_to_rack,
            rack_to_nodes,
        })
    }

    fn detach(&mut self, node_name: &str) -> Option<String> {
        let rack = self.node_to_rack.remove(node_name)?;
        if let Some(members) = self.rack_to_nodes.get_mut(&rack) {
            members.remove(node_name);
            if members.is_empty() {
                self.rack_to_nodes.remove(&rack);
            }
        }
        Some(rack)
    }
}

/// Thread-safe node <-> rack mapping, shared across scheduling cycles.
///
/// `Clone` shares the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct TopologyCache {
    inner: Arc<RwLock<Maps>>,
}

impl TopologyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated from a rack map.
    pub fn from_rack_map(map: &RackMap) -> TopologyResult<Self> {
        let maps = Maps::from_rack_map(map)?;
        info!(
            nodes = maps.node_to_rack.len(),
            racks = maps.rack_to_nodes.len(),
            "topology cache populated"
        );
        Ok(Self {
            inner: Arc::new(RwLock::new(maps)),
        })
    }

    /// Atomically replace the whole mapping. On error the cache is untouched.
    pub fn replace(&self, map: &RackMap) -> TopologyResult<()> {
        let fresh = Maps::from_rack_map(map)?;
        let mut maps = self.write()?;
        *maps = fresh;
        debug!(
            nodes = maps.node_to_rack.len(),
            racks = maps.rack_to_nodes.len(),
            "topology cache replaced"
        );
        Ok(())
    }

    /// Map `node_name` to `rack_id`, moving it out of any previous rack.
    ///
    /// Returns the previous rack, if any.
    pub fn set_node_rack(&self, node_name: &str, rack_id: &str) -> TopologyResult<Option<String>> {
        let mut maps = self.write()?;
        let previous = maps.detach(node_name);
        maps.node_to_rack
            .insert(node_name.to_string(), rack_id.to_string());
        maps.rack_to_nodes
            .entry(rack_id.to_string())
            .or_default()
            .insert(node_name.to_string());
        debug!(node = node_name, rack = rack_id, ?previous, "node mapped to rack");
        Ok(previous)
    }

    /// Drop a node from the mapping. Returns the rack it belonged to.
    pub fn remove_node(&self, node_name: &str) -> TopologyResult<Option<String>> {
        let mut maps = self.write()?;
        Ok(maps.detach(node_name))
    }

    /// Sorted member nodes of a rack (empty for an unknown rack).
    pub fn nodes_in_rack(&self, rack_id: &str) -> TopologyResult<Vec<String>> {
        let maps = self.read()?;
        Ok(maps
            .rack_to_nodes
            .get(rack_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Sorted rack ids.
    pub fn rack_ids(&self) -> TopologyResult<Vec<String>> {
        let maps = self.read()?;
        Ok(maps.rack_to_nodes.keys().cloned().collect())
    }

    /// Number of mapped nodes.
    pub fn len(&self) -> TopologyResult<usize> {
        Ok(self.read()?.node_to_rack.len())
    }

    pub fn is_empty(&self) -> TopologyResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Freeze the current mapping for one scheduling cycle.
    pub fn snapshot(&self) -> TopologyResult<TopologySnapshot> {
        let maps = self.read()?;
        Ok(TopologySnapshot::from_map(maps.node_to_rack.clone()))
    }

    fn read(&self) -> TopologyResult<RwLockReadGuard<'_, Maps>> {
        self.inner.read().map_err(|_| TopologyError::LockPoisoned)
    }

    fn write(&self) -> TopologyResult<RwLockWriteGuard<'_, Maps>> {
        self.inner.write().map_err(|_| TopologyError::LockPoisoned)
    }
}

impl TopologyProvider for TopologyCache {
    fn lookup_rack(&self, node_name: &str) -> TopologyResult<String> {
        self.read()?
            .node_to_rack
            .get(node_name)
            .cloned()
            .ok_or_else(|| TopologyError::NodeNotMapped(node_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn sample_map() -> RackMap {
        let mut map = RackMap::new();
        map.insert_rack("rack-1", ["node1", "node2"]);
        map.insert_rack("rack-2", ["node3", "node4"]);
        map
    }

    #[test]
    fn populated_from_rack_map() {
        let cache = TopologyCache::from_rack_map(&sample_map()).unwrap();

        assert_eq!(cache.len().unwrap(), 4);
        assert_eq!(cache.lookup_rack("node3").unwrap(), "rack-2");
        assert_eq!(cache.rack_ids().unwrap(), vec!["rack-1", "rack-2"]);
        assert_eq!(cache.nodes_in_rack("rack-1").unwrap(), vec!["node1", "node2"]);
    }

    #[test]
    fn starts_empty() {
        let cache = TopologyCache::new();
        assert!(cache.is_empty().unwrap());
        assert!(matches!(
            cache.lookup_rack("node1"),
            Err(TopologyError::NodeNotMapped(_))
        ));
    }

    #[test]
    fn set_node_rack_moves_node() {
        let cache = TopologyCache::from_rack_map(&sample_map()).unwrap();

        let previous = cache.set_node_rack("node2", "rack-2").unwrap();

        assert_eq!(previous.as_deref(), Some("rack-1"));
        assert_eq!(cache.lookup_rack("node2").unwrap(), "rack-2");
        assert_eq!(cache.nodes_in_rack("rack-1").unwrap(), vec!["node1"]);
        assert_eq!(
            cache.nodes_in_rack("rack-2").unwrap(),
            vec!["node2", "node3", "node4"]
        );
    }

    #[test]
    fn removing_last_member_drops_rack() {
        let cache = TopologyCache::new();
        cache.set_node_rack("node1", "rack-9").unwrap();

        assert_eq!(cache.remove_node("node1").unwrap().as_deref(), Some("rack-9"));
        assert!(cache.rack_ids().unwrap().is_empty());
        assert_eq!(cache.remove_node("node1").unwrap(), None);
    }

    #[test]
    fn failed_replace_keeps_old_mapping() {
        let cache = TopologyCache::from_rack_map(&sample_map()).unwrap();
        let mut bad = RackMap::new();
        bad.insert_rack("a", ["x"]);
        bad.insert_rack("b", ["x"]);

        assert!(cache.replace(&bad).is_err());
        assert_eq!(cache.lookup_rack("node1").unwrap(), "rack-1");
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let cache = TopologyCache::from_rack_map(&sample_map()).unwrap();
        let snap = cache.snapshot().unwrap();

        cache.set_node_rack("node1", "rack-2").unwrap();
        cache.remove_node("node4").unwrap();

        assert_eq!(snap.lookup_rack("node1").unwrap(), "rack-1");
        assert_eq!(snap.lookup_rack("node4").unwrap(), "rack-2");
        assert_eq!(cache.lookup_rack("node1").unwrap(), "rack-2");
    }

    #[test]
    fn concurrent_readers_with_a_writer() {
        let cache = TopologyCache::from_rack_map(&sample_map()).unwrap();

        thread::scope(|s| {
            for _ in 0..4 {
                let reader = cache.clone();
                s.spawn(move || {
                    for _ in 0..500 {
                        let rack = reader.lookup_rack("node1").unwrap();
                        assert!(rack == "rack-1" || rack == "rack-3");
                    }
                });
            }
            let writer = cache.clone();
            s.spawn(move || {
                for i in 0..500 {
                    let rack = if i % 2 == 0 { "rack-3" } else { "rack-1" };
                    writer.set_node_rack("node1", rack).unwrap();
                }
            });
        });

        assert_eq!(cache.len().unwrap(), 4);
    }
}
