//! Rack map files.
//!
//! A rack map lists member nodes per rack:
//!
//! ```toml
//! rack-1 = ["node1", "node2"]
//! rack-2 = ["node3"]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};

/// Rack id -> member node names, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RackMap {
    racks: BTreeMap<String, Vec<String>>,
}

impl RackMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a rack and its members.
    pub fn insert_rack<I, S>(&mut self, rack_id: impl Into<String>, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.racks
            .insert(rack_id.into(), nodes.into_iter().map(Into::into).collect());
    }

    pub fn racks(&self) -> &BTreeMap<String, Vec<String>> {
        &self.racks
    }

    /// Parse a rack map from TOML text.
    pub fn from_toml_str(content: &str) -> TopologyResult<Self> {
        toml::from_str(content).map_err(|e| TopologyError::Parse(e.to_string()))
    }

    /// Read and parse a rack map file.
    pub fn from_file(path: &Path) -> TopologyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let map = Self::from_toml_str(&content)?;
        debug!(?path, racks = map.racks.len(), "rack map loaded");
        Ok(map)
    }

    /// Invert into node -> rack.
    ///
    /// A node repeated inside one rack is tolerated; a node listed under two
    /// different racks is rejected.
    pub fn node_index(&self) -> TopologyResult<HashMap<String, String>> {
        let mut index: HashMap<String, String> = HashMap::new();
        for (rack, nodes) in &self.racks {
            for node in nodes {
                match index.get(node) {
                    Some(existing) if existing != rack => {
                        return Err(TopologyError::DuplicateNode {
                            node: node.clone(),
                            first: existing.clone(),
                            second: rack.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        index.insert(node.clone(), rack.clone());
                    }
                }
            }
        }
        Ok(index)
    }
}
