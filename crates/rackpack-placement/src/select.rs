//! Rack selection by weighted post-placement utilization.

use crate::error::{PackError, PackResult};
use crate::resources::{BinPackWeights, Resources};
use crate::simulate::SimulatedRack;

/// `cpu_w * used_cpu / alloc_cpu + mem_w * used_mem / alloc_mem`.
///
/// Callers guarantee non-zero allocatable capacity.
pub fn rack_score(used: Resources, allocatable: Resources, weights: &BinPackWeights) -> f64 {
    let cpu = used.cpu_millis as f64 / allocatable.cpu_millis as f64;
    let memory = used.memory_bytes as f64 / allocatable.memory_bytes as f64;
    f64::from(weights.cpu) * cpu + f64::from(weights.memory) * memory
}

/// Pick the feasible rack with the highest score.
///
/// Equal scores go to the lexicographically smallest rack id, whatever the
/// input order. Returns `Ok(None)` when there are no candidates.
pub fn select_rack<'a, I>(
    candidates: I,
    weights: &BinPackWeights,
) -> PackResult<Option<(&'a SimulatedRack, f64)>>
where
    I: IntoIterator<Item = &'a SimulatedRack>,
{
    let mut best: Option<(&SimulatedRack, f64)> = None;

    for rack in candidates {
        if rack.allocatable.has_zero_dimension() {
            return Err(PackError::InvalidRackCapacity(rack.rack_id.clone()));
        }
        let score = rack_score(rack.used, rack.allocatable, weights);
        let better = match best {
            None => true,
            Some((current, best_score)) => {
                score > best_score || (score == best_score && rack.rack_id < current.rack_id)
            }
        };
        if better {
            best = Some((rack, score));
        }
    }

    Ok(best)
}
