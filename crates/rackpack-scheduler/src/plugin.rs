//! The rack bin-pack node-ordering plugin.
//!
//! One [`RackPackPlugin`] is opened per scheduling cycle. For each task the
//! scheduler passes the task's candidate nodes to
//! [`BatchNodeOrder::score_nodes`], which runs [`score_for_task`]:
//!
//! 1. resolve policy and weights from the job labels
//! 2. rebuild rack aggregates from the candidates (every call)
//! 3. under the job's lock: reuse an earlier decision, or fail fast if the
//!    job already failed, or run the full rack search
//! 4. give every node of the chosen rack the maximum score

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rackpack_placement::{
    BinPackWeights, NodeSnapshot, RackAggregates, build_rack_aggregates, find_rack,
    score_rack_nodes,
};
use rackpack_topology::TopologyProvider;
use tracing::{debug, info, warn};

use crate::decision::{DecisionTable, RackDecision};
use crate::error::{SchedulerError, SchedulerResult};
use crate::policy::{SchedulePolicy, resolve_job_policy};
use crate::session::{JobInfo, SessionView, TaskInfo};

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "rack-binpack";

/// Batch node-ordering extension point.
///
/// Called once per task with the task's full candidate set; returns a score
/// per node. Nodes missing from the map are treated as score zero by the
/// caller.
pub trait BatchNodeOrder: Send + Sync {
    fn name(&self) -> &str;

    fn score_nodes(
        &self,
        session: &dyn SessionView,
        task: &TaskInfo,
        nodes: &[NodeSnapshot],
    ) -> SchedulerResult<HashMap<String, f64>>;
}

/// Rack-aware bin-packing plugin, valid for one scheduling cycle.
pub struct RackPackPlugin {
    topology: Arc<dyn TopologyProvider>,
    decisions: DecisionTable,
}

impl RackPackPlugin {
    /// Start a cycle with a fresh decision table.
    ///
    /// Pass a [`TopologySnapshot`](rackpack_topology::TopologySnapshot) to pin
    /// the topology for the whole cycle.
    pub fn open_session(topology: Arc<dyn TopologyProvider>) -> Self {
        debug!(plugin = PLUGIN_NAME, "session opened");
        Self {
            topology,
            decisions: DecisionTable::new(),
        }
    }

    pub fn decisions(&self) -> &DecisionTable {
        &self.decisions
    }

    /// End the cycle, returning the decisions it made.
    pub fn close_session(self) -> SchedulerResult<BTreeMap<String, RackDecision>> {
        let decided = self.decisions.snapshot()?;
        debug!(plugin = PLUGIN_NAME, jobs = decided.len(), "session closed");
        Ok(decided)
    }
}

impl BatchNodeOrder for RackPackPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn score_nodes(
        &self,
        session: &dyn SessionView,
        task: &TaskInfo,
        nodes: &[NodeSnapshot],
    ) -> SchedulerResult<HashMap<String, f64>> {
        score_for_task(
            Some(&self.decisions),
            self.topology.as_ref(),
            session,
            task,
            nodes,
        )
    }
}

/// Score `nodes` for `task`, deciding the job's rack on its first task.
///
/// `state` is the cycle's decision table; `None` is a
/// [`SchedulerError::State`].
pub fn score_for_task(
    state: Option<&DecisionTable>,
    topology: &dyn TopologyProvider,
    session: &dyn SessionView,
    task: &TaskInfo,
    nodes: &[NodeSnapshot],
) -> SchedulerResult<HashMap<String, f64>> {
    let decisions =
        state.ok_or_else(|| SchedulerError::State("decision state is absent".to_string()))?;

    let job = session.job(&task.job_id).ok_or_else(|| {
        SchedulerError::Policy(format!("job {} not found in session", task.job_id))
    })?;
    let resolved = resolve_job_policy(job)?;
    if resolved.policy != SchedulePolicy::BinPack {
        debug!(
            job = %job.id,
            task = %task.id,
            policy = %resolved.policy,
            "policy has no rack scoring, returning neutral scores"
        );
        return Ok(HashMap::new());
    }

    let racks = build_rack_aggregates(nodes, topology)?;

    decisions.with_job(&job.id, |decision| {
        decide_and_score(decision, job, task, &racks, &resolved.weights)
    })?
}

fn decide_and_score(
    decision: &mut Option<RackDecision>,
    job: &JobInfo,
    task: &TaskInfo,
    racks: &RackAggregates,
    weights: &BinPackWeights,
) -> SchedulerResult<HashMap<String, f64>> {
    match decision.as_ref() {
        Some(RackDecision::Chosen(rack_id)) => {
            if !racks.contains_key(rack_id) {
                return Err(SchedulerError::State(format!(
                    "rack {rack_id} chosen for job {} is not among the candidates of task {}",
                    job.id, task.id
                )));
            }
            debug!(job = %job.id, task = %task.id, rack = %rack_id, "reusing rack decision");
            return Ok(score_rack_nodes(rack_id, racks)?);
        }
        Some(RackDecision::Failed) => {
            return Err(SchedulerError::Placement(format!(
                "job {} already failed rack selection this cycle",
                job.id
            )));
        }
        None => {}
    }

    // Stays Failed unless the search below succeeds.
    *decision = Some(RackDecision::Failed);

    let demands = job.task_demands(weights);
    let choice = find_rack(racks, &demands, weights).inspect_err(|e| {
        warn!(job = %job.id, task = %task.id, tasks = demands.len(), error = %e, "no rack for job");
    })?;

    let scores = score_rack_nodes(choice.rack_id(), racks)?;
    info!(
        job = %job.id,
        rack = %choice.rack_id(),
        score = choice.score,
        tasks = demands.len(),
        nodes = scores.len(),
        "rack selected for job"
    );
    *decision = Some(RackDecision::Chosen(choice.rack_id().to_string()));
    Ok(scores)
}
