//! # flowsched-proto
//!
//! Descriptor records exchanged between the scheduler, its callers and the
//! flow-graph layer.
//!
//! ## Records
//!
//! - [`JobDescriptor`] / [`TaskDescriptor`]: submitted work and its state
//! - [`ResourceDescriptor`] / [`ResourceTopologyNodeDescriptor`]: the machine
//!   topology forest
//! - [`ResourceStatus`]: a registered resource plus runtime status
//! - [`SchedulingDelta`]: one place/preempt/migrate/no-op instruction
//!
//! Records are plain serde structs. Field names follow the wire names so a
//! cluster description can be loaded straight from JSON.

mod delta;
mod job;
mod resource;

pub use delta::*;
pub use job::*;
pub use resource::*;
