//! The job, task and resource registries shared by the scheduler and the
//! event producers that feed it.

use flowsched_id::{JobId, ResourceId, TaskId};
use flowsched_proto::{JobDescriptor, ResourceStatus, TaskDescriptor};
use flowsched_registry::{Registry, Shared};
use tracing::debug;

use crate::error::{SchedulerError, SchedulerResult};

pub type JobRegistry = Registry<JobId, JobDescriptor>;
pub type TaskRegistry = Registry<TaskId, TaskDescriptor>;
pub type ResourceRegistry = Registry<ResourceId, ResourceStatus>;

/// The three registries, usually held behind an `Arc`.
#[derive(Debug, Default)]
pub struct Registries {
    pub jobs: JobRegistry,
    pub tasks: TaskRegistry,
    pub resources: ResourceRegistry,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new job and its tasks and returns the job's shared handle.
    ///
    /// The job's task list is rebuilt from `tasks`. A job UUID that is already
    /// registered is rejected and leaves the existing records untouched.
    pub fn submit_job(
        &self,
        mut job: JobDescriptor,
        tasks: Vec<TaskDescriptor>,
    ) -> SchedulerResult<Shared<JobDescriptor>> {
        let job_id = job
            .id()
            .map_err(|source| SchedulerError::InvalidDescriptor {
                context: "job",
                source,
            })?;

        job.tasks = tasks.iter().map(|t| t.uid).collect();
        if !self.jobs.insert_if_not_present(job_id, job) {
            return Err(SchedulerError::JobAlreadySubmitted(job_id));
        }
        for task in tasks {
            self.tasks.insert_or_update(task.uid, task);
        }
        debug!(%job_id, "job recorded in registry");

        self.jobs
            .find_ptr_or_null(&job_id)
            .ok_or(SchedulerError::JobNotFound(job_id))
    }
}
