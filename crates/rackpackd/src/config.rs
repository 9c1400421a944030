//! Cluster description file.
//!
//! ```toml
//! [topology]
//! rack-1 = ["node1", "node2"]
//!
//! [[nodes]]
//! name = "node1"
//! allocatable = { cpu_millis = 100, memory_bytes = 100 }
//! used = { cpu_millis = 50, memory_bytes = 30 }
//!
//! [[jobs]]
//! id = "job1"
//! labels = { matrixSchedulePolicy = "binPack" }
//! tasks = [{ id = "task1", request = { cpu_millis = 10, memory_bytes = 10 } }]
//! ```

use std::path::Path;

use anyhow::Context;
use rackpack_placement::NodeSnapshot;
use rackpack_scheduler::{JobInfo, Session};
use rackpack_topology::{RackMap, TopologyCache};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Rack id -> member nodes.
    #[serde(default)]
    pub topology: RackMap,
    /// Candidate nodes offered to every task.
    #[serde(default)]
    pub nodes: Vec<NodeSnapshot>,
    /// Jobs, scored in file order.
    #[serde(default)]
    pub jobs: Vec<JobInfo>,
}

impl ClusterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("invalid cluster file {}", path.display()))?;
        debug!(
            ?path,
            racks = config.topology.racks().len(),
            nodes = config.nodes.len(),
            jobs = config.jobs.len(),
            "cluster file loaded"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Populate a topology cache from the `[topology]` table.
    pub fn topology_cache(&self) -> anyhow::Result<TopologyCache> {
        Ok(TopologyCache::from_rack_map(&self.topology)?)
    }

    pub fn session(&self) -> Session {
        self.jobs.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackpack_scheduler::SessionView;
    use std::io::Write;

    const SAMPLE: &str = r#"
[topology]
rack-1 = ["node1"]
rack-2 = ["node2"]

[[nodes]]
name = "node1"
allocatable = { cpu_millis = 100, memory_bytes = 100 }
used = { cpu_millis = 50, memory_bytes = 30 }

[[nodes]]
name = "node2"
allocatable = { cpu_millis = 100, memory_bytes = 100 }

[[jobs]]
id = "job1"
labels = { matrixSchedulePolicy = "binPack", matrixBinpackCPUWeight = "5" }
tasks = [
    { id = "t1", request = { cpu_millis = 10, memory_bytes = 10 } },
    { id = "t2", request = { cpu_millis = 20, memory_bytes = 5 } },
]
"#;

    #[test]
    fn parses_full_cluster_file() {
        let config = ClusterConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.topology.racks().len(), 2);
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.nodes[1].used.cpu_millis, 0);
        assert_eq!(config.jobs[0].tasks.len(), 2);
    }

    #[test]
    fn session_attaches_tasks_to_jobs() {
        let config = ClusterConfig::from_toml_str(SAMPLE).unwrap();
        let session = config.session();

        let job = session.job("job1").unwrap();
        assert!(job.tasks.iter().all(|t| t.job_id == "job1"));
    }

    #[test]
    fn topology_cache_matches_file() {
        let config = ClusterConfig::from_toml_str(SAMPLE).unwrap();
        let cache = config.topology_cache().unwrap();
        assert_eq!(cache.nodes_in_rack("rack-2").unwrap(), vec!["node2"]);
    }

    #[test]
    fn duplicate_node_in_topology_is_rejected() {
        let config = ClusterConfig::from_toml_str(
            r#"
[topology]
a = ["n1"]
b = ["n1"]
"#,
        )
        .unwrap();
        assert!(config.topology_cache().is_err());
    }

    #[test]
    fn empty_file_is_an_empty_cluster() {
        let config = ClusterConfig::from_toml_str("").unwrap();
        assert!(config.nodes.is_empty());
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn from_file_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nodes = 3").unwrap();

        let err = ClusterConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid cluster file"));
    }
}
