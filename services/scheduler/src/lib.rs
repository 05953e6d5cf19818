//! Flow-based cluster scheduler.
//!
//! The scheduler keeps authoritative registries of jobs, tasks and
//! resources, runs scheduling rounds against a flow-graph layer, and turns
//! each round's solution into place/preempt/migrate deltas that it applies
//! while keeping job, task and binding state consistent.
//!
//! # Architecture
//!
//! ```text
//! SchedulerWorker (interval + event channel)
//!   └── Scheduler
//!       ├── Registries (jobs, tasks, resources)
//!       ├── GraphManager (flow network; external)
//!       ├── Solver (task node -> resource node; external)
//!       └── TaskLifecycle (placement / eviction / migration hooks)
//! ```
//!
//! A round is solve -> derive deltas (preemptions first) -> apply ->
//! propagate topology capacity.

pub mod cluster;
pub mod config;
pub mod error;
pub mod flow;
pub mod lifecycle;
pub mod registries;
pub mod scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use registries::Registries;
pub use scheduler::{Scheduler, SchedulerEvent, SchedulerHandle, SchedulerWorker};
