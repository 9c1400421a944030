//! Scheduling policy and bin-pack weights, read from job labels.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rackpack_placement::BinPackWeights;

use crate::error::{SchedulerError, SchedulerResult};
use crate::session::JobInfo;

/// Label selecting the placement policy.
pub const SCHEDULE_POLICY_LABEL: &str = "matrixSchedulePolicy";
/// Label carrying the CPU weight (positive integer, default 1).
pub const CPU_WEIGHT_LABEL: &str = "matrixBinpackCPUWeight";
/// Label carrying the memory weight (positive integer, default 1).
pub const MEMORY_WEIGHT_LABEL: &str = "matrixBinpackMemWeight";

const DEFAULT_WEIGHT: u32 = 1;

/// Placement policy requested by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// Consolidate the whole job onto the fullest feasible rack.
    BinPack,
    /// Topology-aware share-domain placement. Recognized, not scored.
    ShareDomain,
    /// Spread placement. Recognized, not scored.
    Spread,
}

impl SchedulePolicy {
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulePolicy::BinPack => "binPack",
            SchedulePolicy::ShareDomain => "shareDomain",
            SchedulePolicy::Spread => "spread",
        }
    }
}

impl fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for SchedulePolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binPack" => Ok(SchedulePolicy::BinPack),
            "shareDomain" => Ok(SchedulePolicy::ShareDomain),
            "spread" => Ok(SchedulePolicy::Spread),
            other => Err(SchedulerError::Policy(format!(
                "invalid schedule policy {other:?}"
            ))),
        }
    }
}

/// Policy and weights resolved for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobPolicy {
    pub policy: SchedulePolicy,
    pub weights: BinPackWeights,
}

/// Read the policy and bin-pack weights from a job's labels.
pub fn resolve_job_policy(job: &JobInfo) -> SchedulerResult<JobPolicy> {
    let policy_label = job.labels.get(SCHEDULE_POLICY_LABEL).ok_or_else(|| {
        SchedulerError::Policy(format!(
            "job {} has no {SCHEDULE_POLICY_LABEL} label",
            job.id
        ))
    })?;

    let weights = BinPackWeights {
        cpu: parse_weight(&job.labels, CPU_WEIGHT_LABEL)?,
        memory: parse_weight(&job.labels, MEMORY_WEIGHT_LABEL)?,
    };
    let policy = policy_label.parse()?;

    Ok(JobPolicy { policy, weights })
}

/// Absent label -> default. Present label must be a positive integer.
fn parse_weight(labels: &HashMap<String, String>, key: &str) -> SchedulerResult<u32> {
    let Some(raw) = labels.get(key) else {
        return Ok(DEFAULT_WEIGHT);
    };

    let invalid = || SchedulerError::Policy(format!("invalid {key} value {raw:?}"));
    let value: i64 = raw.parse().map_err(|_| invalid())?;
    if value <= 0 {
        return Err(invalid());
    }
    u32::try_from(value).map_err(|_| invalid())
}
