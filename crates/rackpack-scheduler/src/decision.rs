//! Per-cycle rack decisions, keyed by job.
//!
//! The table lives exactly as long as one scheduling cycle. Each job has its
//! own slot behind its own mutex: the table-wide lock is only held to find or
//! create a slot, and the slot lock is held across the whole
//! read-decide-write of a scoring call. Calls for the same job serialize;
//! calls for different jobs do not contend.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::error::{SchedulerError, SchedulerResult};

/// Outcome of rack selection for a job within the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RackDecision {
    /// Every task of the job goes to this rack.
    Chosen(String),
    /// No rack could host the job; later tasks fail without a new search.
    Failed,
}

impl RackDecision {
    pub fn chosen_rack(&self) -> Option<&str> {
        match self {
            RackDecision::Chosen(rack) => Some(rack),
            RackDecision::Failed => None,
        }
    }
}

/// `None` until the first task of the job has been evaluated.
type Slot = Arc<Mutex<Option<RackDecision>>>;

/// Job id -> rack decision for one scheduling cycle.
#[derive(Debug, Default)]
pub struct DecisionTable {
    jobs: Mutex<HashMap<String, Slot>>,
}

impl DecisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the job's decision.
    ///
    /// Other jobs remain accessible while `f` runs.
    pub fn with_job<R>(
        &self,
        job_id: &str,
        f: impl FnOnce(&mut Option<RackDecision>) -> R,
    ) -> SchedulerResult<R> {
        let slot = self.slot(job_id)?;
        let mut decision = slot.lock().map_err(|_| poisoned(job_id))?;
        Ok(f(&mut *decision))
    }

    /// Current decision for a job, if one has been made.
    pub fn decision(&self, job_id: &str) -> SchedulerResult<Option<RackDecision>> {
        let slot = {
            let jobs = self.lock_jobs()?;
            match jobs.get(job_id) {
                Some(slot) => Arc::clone(slot),
                None => return Ok(None),
            }
        };
        let decision = slot.lock().map_err(|_| poisoned(job_id))?;
        Ok(decision.clone())
    }

    /// Every decided job, ordered by job id.
    pub fn snapshot(&self) -> SchedulerResult<BTreeMap<String, RackDecision>> {
        let slots: Vec<(String, Slot)> = {
            let jobs = self.lock_jobs()?;
            jobs.iter()
                .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
                .collect()
        };

        let mut decided = BTreeMap::new();
        for (job_id, slot) in slots {
            let decision = slot.lock().map_err(|_| poisoned(&job_id))?;
            if let Some(d) = decision.as_ref() {
                decided.insert(job_id.clone(), d.clone());
            }
        }
        Ok(decided)
    }

    /// Number of jobs seen this cycle.
    pub fn len(&self) -> SchedulerResult<usize> {
        Ok(self.lock_jobs()?.len())
    }

    pub fn is_empty(&self) -> SchedulerResult<bool> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, job_id: &str) -> SchedulerResult<Slot> {
        let mut jobs = self.lock_jobs()?;
        let slot = jobs
            .entry(job_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)));
        Ok(Arc::clone(slot))
    }

    fn lock_jobs(&self) -> SchedulerResult<std::sync::MutexGuard<'_, HashMap<String, Slot>>> {
        self.jobs
            .lock()
            .map_err(|_| SchedulerError::State("decision table lock poisoned".to_string()))
    }
}

fn poisoned(job_id: &str) -> SchedulerError {
    SchedulerError::State(format!("decision lock for job {job_id} poisoned"))
}
