//! rackpack-scheduler: rack-aware bin-packing as a node-ordering plugin.
//!
//! The surrounding scheduler calls the plugin once per task with that task's
//! candidate nodes. The first call for a job picks a rack able to host every
//! task of the job; later calls in the same cycle reuse that rack. Every
//! node of the chosen rack gets the maximum score.
//!
//! # Architecture
//!
//! ```text
//! RackPackPlugin (one per scheduling cycle)
//!   ├── TopologyProvider (node -> rack, usually a per-cycle snapshot)
//!   ├── DecisionTable (job -> Chosen(rack) | Failed, one mutex per job)
//!   └── score_for_task
//!       ├── policy::resolve_job_policy      (job labels)
//!       ├── placement::build_rack_aggregates (every call)
//!       ├── placement::find_rack             (first task of a job only)
//!       └── placement::score_rack_nodes
//! ```

pub mod decision;
pub mod error;
pub mod plugin;
pub mod policy;
pub mod session;

pub use decision::{DecisionTable, RackDecision};
pub use error::{SchedulerError, SchedulerResult};
pub use plugin::{BatchNodeOrder, PLUGIN_NAME, RackPackPlugin, score_for_task};
pub use policy::{JobPolicy, SchedulePolicy, resolve_job_policy};
pub use session::{JobInfo, Session, SessionView, TaskInfo};
