//! rackpack-placement: rack-level bin-packing for multi-task jobs.
//!
//! Everything in this crate is a pure function over call-local data. The
//! stateful part (remembering a job's rack across its tasks) lives in
//! `rackpack-scheduler`.
//!
//! # Pipeline
//!
//! ```text
//! candidate nodes + topology ──► aggregate::build_rack_aggregates
//! job tasks + weights ─────────► demand::sort_by_dominant_resource
//!                                      │
//!                   per rack ──► simulate::simulate_rack   (first-fit)
//!                                      │
//!                  feasible ──► select::select_rack        (max weighted utilization)
//!                                      │
//!                    chosen ──► scorer::score_rack_nodes   (MAX_NODE_SCORE per member)
//! ```
//!
//! [`placer::find_rack`] runs the middle three stages.

pub mod aggregate;
pub mod demand;
pub mod error;
pub mod placer;
pub mod resources;
pub mod scorer;
pub mod select;
pub mod simulate;

pub use aggregate::{NodeUsage, RackAggregate, RackAggregates, build_rack_aggregates};
pub use demand::{TaskDemand, sort_by_dominant_resource};
pub use error::{PackError, PackResult};
pub use placer::{RackChoice, find_rack};
pub use resources::{BinPackWeights, NodeSnapshot, Resources};
pub use scorer::{MAX_NODE_SCORE, score_rack_nodes};
pub use select::{rack_score, select_rack};
pub use simulate::{RackFit, SimulatedRack, TaskPlacement, simulate_rack};
