//! rackpack-topology: node-to-rack topology for rack-aware placement.
//!
//! The scheduler never owns the topology. An external provider populates a
//! [`TopologyCache`]; each scheduling cycle takes an immutable
//! [`TopologySnapshot`] of it and hands that to the scoring plugin through
//! the [`TopologyProvider`] trait.
//!
//! # Components
//!
//! - **`provider`**: the lookup trait and the per-cycle snapshot
//! - **`cache`**: the shared, `RwLock`-guarded mapping written by the provider
//! - **`file`**: loading a rack map (`rack -> [nodes]`) from TOML

pub mod cache;
pub mod error;
pub mod file;
pub mod provider;

pub use cache::TopologyCache;
pub use error::{TopologyError, TopologyResult};
pub use file::RackMap;
pub use provider::{TopologyProvider, TopologySnapshot};
