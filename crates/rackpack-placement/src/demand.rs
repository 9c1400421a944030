//! Task demand ordering.
//!
//! Largest-first packing: tasks are sorted by descending demand on the
//! dominant resource, CPU when `cpu_weight >= memory_weight`, memory
//! otherwise. Equal demands fall back to task id so the order is total.

use std::cmp::Ordering;

use crate::resources::{BinPackWeights, Resources};

/// Requested resources of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDemand {
    pub task_id: String,
    pub request: Resources,
}

impl TaskDemand {
    pub fn new(task_id: impl Into<String>, request: Resources) -> Self {
        Self {
            task_id: task_id.into(),
            request,
        }
    }
}

/// Sort in place, largest dominant-resource demand first.
pub fn sort_by_dominant_resource(demands: &mut [TaskDemand], weights: &BinPackWeights) {
    let cpu_led = weights.cpu_led();
    demands.sort_by(|a, b| {
        let primary = if cpu_led {
            b.request.cpu_millis.cmp(&a.request.cpu_millis)
        } else {
            b.request.memory_bytes.cmp(&a.request.memory_bytes)
        };
        match primary {
            Ordering::Equal => a.task_id.cmp(&b.task_id),
            other => other,
        }
    });
}
