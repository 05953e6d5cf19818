//! Job and task descriptors.

use flowsched_id::{IdError, JobId, TaskId};
use serde::{Deserialize, Serialize};

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    New,
    Created,
    Running,
    Completed,
    Failed,
    Aborted,
    Unknown,
}

impl JobState {
    /// Returns true once the job can no longer be scheduled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }
}

/// A submitted job.
///
/// The job names its tasks by id; the task descriptors live in the task
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: JobState,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

impl JobDescriptor {
    /// Creates a new job in the `New` state.
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, tasks: Vec<TaskId>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            state: JobState::New,
            tasks,
        }
    }

    /// Derives the job's numeric handle from its UUID.
    pub fn id(&self) -> Result<JobId, IdError> {
        JobId::from_uuid_str(&self.uuid)
    }
}

/// Task execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Created,
    Blocked,
    Runnable,
    Assigned,
    Running,
    Completed,
    Failed,
    Aborted,
    Delegated,
    Unknown,
}

impl TaskState {
    /// Returns true once the task has finished for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }
}

/// A single unit of work belonging to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub uid: TaskId,
    #[serde(default)]
    pub name: String,
    /// UUID of the owning job.
    pub job_id: String,
    #[serde(default)]
    pub state: TaskState,
    /// UUID of the resource the task is bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_to_resource: Option<String>,
}

impl TaskDescriptor {
    /// Creates a runnable, unbound task for the given job.
    pub fn new(uid: TaskId, name: impl Into<String>, job_uuid: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            job_id: job_uuid.into(),
            state: TaskState::Runnable,
            scheduled_to_resource: None,
        }
    }

    /// Derives the owning job's handle.
    pub fn job(&self) -> Result<JobId, IdError> {
        JobId::from_uuid_str(&self.job_id)
    }
}
