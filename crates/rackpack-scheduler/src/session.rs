//! Read-only view of the scheduling session.
//!
//! The plugin only needs jobs by id, each with its labels and full task
//! list. [`Session`] is an in-memory implementation used by the driver and
//! by tests; a real scheduler implements [`SessionView`] over its own model.

use std::collections::{BTreeMap, HashMap};

use rackpack_placement::{BinPackWeights, Resources, TaskDemand, sort_by_dominant_resource};
use serde::{Deserialize, Serialize};

/// One task of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    /// Owning job. Filled in by [`Session::insert_job`] when left empty.
    #[serde(default)]
    pub job_id: String,
    pub request: Resources,
}

impl TaskInfo {
    pub fn new(id: impl Into<String>, job_id: impl Into<String>, request: Resources) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            request,
        }
    }
}

/// A job with its scheduling labels and every one of its tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub id: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
}

impl JobInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>, request: Resources) -> Self {
        let task = TaskInfo::new(task_id, self.id.clone(), request);
        self.tasks.push(task);
        self
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskInfo> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Demands of every task in the job, in packing order for `weights`.
    pub fn task_demands(&self, weights: &BinPackWeights) -> Vec<TaskDemand> {
        let mut demands: Vec<TaskDemand> = self
            .tasks
            .iter()
            .map(|t| TaskDemand::new(t.id.clone(), t.request))
            .collect();
        sort_by_dominant_resource(&mut demands, weights);
        demands
    }
}

/// Jobs visible to the plugin during a scheduling cycle.
pub trait SessionView: Send + Sync {
    fn job(&self, job_id: &str) -> Option<&JobInfo>;
}

/// In-memory session, ordered by job id.
#[derive(Debug, Clone, Default)]
pub struct Session {
    jobs: BTreeMap<String, JobInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a job. Tasks with an empty `job_id` are attached to it.
    pub fn insert_job(&mut self, mut job: JobInfo) {
        for task in &mut job.tasks {
            if task.job_id.is_empty() {
                task.job_id = job.id.clone();
            }
        }
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn remove_job(&mut self, job_id: &str) -> Option<JobInfo> {
        self.jobs.remove(job_id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobInfo> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl SessionView for Session {
    fn job(&self, job_id: &str) -> Option<&JobInfo> {
        self.jobs.get(job_id)
    }
}

impl FromIterator<JobInfo> for Session {
    fn from_iter<I: IntoIterator<Item = JobInfo>>(iter: I) -> Self {
        let mut session = Session::new();
        for job in iter {
            session.insert_job(job);
        }
        session
    }
}
