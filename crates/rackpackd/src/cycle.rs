//! One scheduling cycle over a loaded cluster file.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use rackpack_scheduler::{BatchNodeOrder, PLUGIN_NAME, RackDecision, RackPackPlugin, SessionView};
use rackpack_topology::TopologyProvider;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ClusterConfig;

/// Result of scoring a single task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub job: String,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rack decision as reported at session close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionView {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
}

impl From<RackDecision> for DecisionView {
    fn from(decision: RackDecision) -> Self {
        match decision {
            RackDecision::Chosen(rack) => Self {
                status: "chosen",
                rack: Some(rack),
            },
            RackDecision::Failed => Self {
                status: "failed",
                rack: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub plugin: &'static str,
    pub tasks: Vec<TaskOutcome>,
    pub decisions: BTreeMap<String, DecisionView>,
}

/// Score every task of every job, in file order, against all nodes.
///
/// The topology is frozen for the duration of the cycle. Per-task errors are
/// recorded in the report rather than aborting the cycle.
pub fn run_cycle(config: &ClusterConfig) -> anyhow::Result<CycleReport> {
    let cache = config.topology_cache()?;
    let snapshot = cache.snapshot().context("failed to snapshot topology")?;
    let topology: Arc<dyn TopologyProvider> = Arc::new(snapshot);
    let session = config.session();

    let plugin = RackPackPlugin::open_session(topology);
    let mut tasks = Vec::new();

    for job_id in config.jobs.iter().map(|j| j.id.as_str()) {
        let Some(job) = session.job(job_id) else {
            continue;
        };
        for task in &job.tasks {
            let outcome = match plugin.score_nodes(&session, task, &config.nodes) {
                Ok(scores) => {
                    debug!(job = %job.id, task = %task.id, nodes = scores.len(), "task scored");
                    TaskOutcome {
                        job: job.id.clone(),
                        task: task.id.clone(),
                        scores: Some(scores.into_iter().collect()),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(job = %job.id, task = %task.id, error = %e, "task scoring failed");
                    TaskOutcome {
                        job: job.id.clone(),
                        task: task.id.clone(),
                        scores: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            tasks.push(outcome);
        }
    }

    let decisions: BTreeMap<String, DecisionView> = plugin
        .close_session()?
        .into_iter()
        .map(|(job, decision)| (job, decision.into()))
        .collect();

    info!(
        tasks = tasks.len(),
        jobs = decisions.len(),
        "cycle complete"
    );

    Ok(CycleReport {
        plugin: PLUGIN_NAME,
        tasks,
        decisions,
    })
}
