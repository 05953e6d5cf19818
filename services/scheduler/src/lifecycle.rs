//! Task lifecycle hooks.
//!
//! The scheduler calls exactly one hook per matching delta, with the
//! resolved task and resource descriptors, before it commits the binding.
//! A real cluster binds container or process launch, teardown and
//! relocation here.

use flowsched_proto::{ResourceDescriptor, TaskDescriptor};
use tracing::info;

pub trait TaskLifecycle {
    fn handle_task_placement(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor);

    fn handle_task_eviction(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor);

    fn handle_task_migration(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor);
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifecycle;

impl TaskLifecycle for NoopLifecycle {
    fn handle_task_placement(&mut self, _task: &TaskDescriptor, _resource: &ResourceDescriptor) {}

    fn handle_task_eviction(&mut self, _task: &TaskDescriptor, _resource: &ResourceDescriptor) {}

    fn handle_task_migration(&mut self, _task: &TaskDescriptor, _resource: &ResourceDescriptor) {}
}

/// Hooks that only log what a real cluster would do.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLifecycle;

impl TaskLifecycle for TracingLifecycle {
    fn handle_task_placement(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor) {
        info!(
            task_id = %task.uid,
            task = %task.name,
            resource = %resource.friendly_name,
            "Placing task"
        );
    }

    fn handle_task_eviction(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor) {
        info!(
            task_id = %task.uid,
            task = %task.name,
            resource = %resource.friendly_name,
            "Evicting task"
        );
    }

    fn handle_task_migration(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor) {
        info!(
            task_id = %task.uid,
            task = %task.name,
            from = task.scheduled_to_resource.as_deref().unwrap_or("-"),
            to = %resource.friendly_name,
            "Migrating task"
        );
    }
}
