//! Delta application.

use flowsched_id::ResourceId;
use flowsched_proto::{
    DeltaType, JobState, ResourceDescriptor, SchedulingDelta, TaskDescriptor, TaskState,
};
use flowsched_registry::{read, write, Shared};
use tracing::debug;

use super::Scheduler;
use crate::error::{SchedulerError, SchedulerResult};
use crate::flow::{GraphManager, Solver};
use crate::lifecycle::TaskLifecycle;

impl<G, S, L> Scheduler<G, S, L>
where
    G: GraphManager,
    S: Solver<G::Network>,
    L: TaskLifecycle,
{
    /// Applies deltas in order and returns the number of placements.
    ///
    /// Stops at the first delta that names an unknown task, resource or job,
    /// or carries an unrecognized type.
    pub fn apply_scheduling_deltas(
        &mut self,
        deltas: &[SchedulingDelta],
    ) -> SchedulerResult<usize> {
        let mut placed = 0;

        for delta in deltas {
            let task_id = delta.task();
            let task = self
                .registries
                .tasks
                .find_ptr_or_null(&task_id)
                .ok_or(SchedulerError::TaskNotFound(task_id))?;
            let resource_id = delta
                .resource()
                .map_err(|source| SchedulerError::CorruptId {
                    context: "delta resource",
                    source,
                })?;
            let resource = self
                .registries
                .resources
                .find_copy(&resource_id)
                .ok_or(SchedulerError::ResourceNotFound(resource_id))?
                .descriptor;

            match delta.kind() {
                Ok(DeltaType::Place) => {
                    self.place(&task, resource_id, &resource)?;
                    placed += 1;
                }
                Ok(DeltaType::Preempt) => self.preempt(&task, &resource),
                Ok(DeltaType::Migrate) => self.migrate(&task, resource_id, &resource),
                Ok(DeltaType::Noop) => {
                    debug!(%task_id, resource = %delta.resource_id, "NOOP delta");
                }
                Err(raw) => return Err(SchedulerError::UnknownDeltaType(raw)),
            }
        }

        Ok(placed)
    }

    fn place(
        &mut self,
        task: &Shared<TaskDescriptor>,
        resource_id: ResourceId,
        resource: &ResourceDescriptor,
    ) -> SchedulerResult<()> {
        let job_id = read(task)
            .job()
            .map_err(|source| SchedulerError::CorruptId {
                context: "task job",
                source,
            })?;
        let job = self
            .registries
            .jobs
            .find_ptr_or_null(&job_id)
            .ok_or(SchedulerError::JobNotFound(job_id))?;
        {
            let mut jd = write(&job);
            if jd.state != JobState::Running {
                debug!(%job_id, from = ?jd.state, "Job is running");
                jd.state = JobState::Running;
            }
        }

        let mut td = write(task);
        self.lifecycle.handle_task_placement(&td, resource);
        td.state = TaskState::Running;
        td.scheduled_to_resource = Some(resource.uuid.clone());
        self.task_bindings.insert(td.uid, resource_id);
        Ok(())
    }

    /// A task of a retired job can still be reported running for a round;
    /// it is evicted but keeps its terminal state.
    fn preempt(&mut self, task: &Shared<TaskDescriptor>, resource: &ResourceDescriptor) {
        let mut td = write(task);
        self.lifecycle.handle_task_eviction(&td, resource);
        if !td.state.is_terminal() {
            td.state = TaskState::Runnable;
        }
        td.scheduled_to_resource = None;
        self.task_bindings.remove(&td.uid);
    }

    fn migrate(
        &mut self,
        task: &Shared<TaskDescriptor>,
        resource_id: ResourceId,
        resource: &ResourceDescriptor,
    ) {
        let mut td = write(task);
        self.lifecycle.handle_task_migration(&td, resource);
        td.scheduled_to_resource = Some(resource.uuid.clone());
        self.task_bindings.insert(td.uid, resource_id);
    }
}
