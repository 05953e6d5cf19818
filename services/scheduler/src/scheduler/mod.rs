//! Scheduler module for task placement.
//!
//! The scheduler is responsible for:
//! - Tracking jobs waiting to be scheduled and their runnable tasks
//! - Registering resource topologies and marking PUs schedulable
//! - Running scheduling rounds and deriving deltas from the solver output
//! - Applying deltas and keeping job, task and binding state consistent

mod apply;
mod reconciler;
mod worker;

#[cfg(test)]
mod testing;

pub use reconciler::Scheduler;
pub use worker::{SchedulerEvent, SchedulerHandle, SchedulerWorker};
