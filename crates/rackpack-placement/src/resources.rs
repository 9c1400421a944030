//! Resource vectors, node snapshots, and bin-pack weights.

use serde::{Deserialize, Serialize};

/// CPU (milli-cores) and memory (bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    pub cpu_millis: u64,
    pub memory_bytes: u64,
}

impl Resources {
    pub const ZERO: Self = Self {
        cpu_millis: 0,
        memory_bytes: 0,
    };

    pub fn new(cpu_millis: u64, memory_bytes: u64) -> Self {
        Self {
            cpu_millis,
            memory_bytes,
        }
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self {
            cpu_millis: self.cpu_millis.saturating_add(other.cpu_millis),
            memory_bytes: self.memory_bytes.saturating_add(other.memory_bytes),
        }
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self {
            cpu_millis: self.cpu_millis.saturating_sub(other.cpu_millis),
            memory_bytes: self.memory_bytes.saturating_sub(other.memory_bytes),
        }
    }

    /// True when both dimensions are `<=` the corresponding dimension of `limit`.
    pub fn fits_within(&self, limit: &Self) -> bool {
        self.cpu_millis <= limit.cpu_millis && self.memory_bytes <= limit.memory_bytes
    }

    /// True when either dimension is zero.
    pub fn has_zero_dimension(&self) -> bool {
        self.cpu_millis == 0 || self.memory_bytes == 0
    }
}

/// A candidate node as seen by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub allocatable: Resources,
    #[serde(default)]
    pub used: Resources,
}

impl NodeSnapshot {
    pub fn new(name: impl Into<String>, allocatable: Resources, used: Resources) -> Self {
        Self {
            name: name.into(),
            allocatable,
            used,
        }
    }

    pub fn free(&self) -> Resources {
        self.allocatable.saturating_sub(self.used)
    }
}

/// Relative importance of CPU and memory utilization when ranking racks.
///
/// Both weights are positive; the larger one also decides which resource
/// leads the task sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinPackWeights {
    pub cpu: u32,
    pub memory: u32,
}

impl BinPackWeights {
    pub fn new(cpu: u32, memory: u32) -> Self {
        Self { cpu, memory }
    }

    /// CPU leads when its weight is at least the memory weight.
    pub fn cpu_led(&self) -> bool {
        self.cpu >= self.memory
    }
}

impl Default for BinPackWeights {
    fn default() -> Self {
        Self { cpu: 1, memory: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_within_checks_both_dimensions() {
        let limit = Resources::new(100, 100);
        assert!(Resources::new(100, 100).fits_within(&limit));
        assert!(!Resources::new(101, 10).fits_within(&limit));
        assert!(!Resources::new(10, 101).fits_within(&limit));
    }

    #[test]
    fn saturating_math_never_wraps() {
        let big = Resources::new(u64::MAX, u64::MAX);
        assert_eq!(big.saturating_add(Resources::new(1, 1)), big);
        assert_eq!(Resources::ZERO.saturating_sub(Resources::new(5, 5)), Resources::ZERO);
    }

    #[test]
    fn free_is_allocatable_minus_used() {
        let node = NodeSnapshot::new("n1", Resources::new(100, 200), Resources::new(30, 250));
        assert_eq!(node.free(), Resources::new(70, 0));
    }

    #[test]
    fn equal_weights_are_cpu_led() {
        assert!(BinPackWeights::default().cpu_led());
        assert!(BinPackWeights::new(5, 1).cpu_led());
        assert!(!BinPackWeights::new(1, 5).cpu_led());
    }

    #[test]
    fn zero_dimension_detection() {
        assert!(Resources::new(0, 10).has_zero_dimension());
        assert!(Resources::new(10, 0).has_zero_dimension());
        assert!(!Resources::new(1, 1).has_zero_dimension());
    }
}
