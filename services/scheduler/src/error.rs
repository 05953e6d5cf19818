//! Scheduler error types.

use flowsched_id::{IdError, JobId, ResourceId, TaskId};
use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that can occur during scheduling.
///
/// Most variants are invariant violations: the scheduler's own bookkeeping
/// or its graph layer referenced something that does not exist. Those are
/// marked unrecoverable and end the current round; the caller decides
/// whether to abort or restart the control loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job {0} must exist")]
    JobNotFound(JobId),

    #[error("job {0} has already completed")]
    JobAlreadyCompleted(JobId),

    /// A job UUID was submitted a second time.
    #[error("job {0} is already submitted")]
    JobAlreadySubmitted(JobId),

    #[error("task {0} must exist")]
    TaskNotFound(TaskId),

    #[error("resource {0} must exist")]
    ResourceNotFound(ResourceId),

    #[error("unknown scheduling delta type {0}")]
    UnknownDeltaType(i32),

    /// An identifier produced inside the scheduler failed to parse.
    #[error("corrupt {context} identifier: {source}")]
    CorruptId {
        context: &'static str,
        #[source]
        source: IdError,
    },

    /// A caller submitted a descriptor with an unusable identifier.
    #[error("invalid {context} identifier: {source}")]
    InvalidDescriptor {
        context: &'static str,
        #[source]
        source: IdError,
    },

    #[error("scheduler worker has stopped")]
    WorkerStopped,
}

impl SchedulerError {
    /// Returns true if the error signals inconsistent scheduler state.
    pub fn is_unrecoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidDescriptor { .. } | Self::JobAlreadySubmitted(_) | Self::WorkerStopped
        )
    }
}
