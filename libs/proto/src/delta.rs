//! Scheduling deltas.
//!
//! A delta is produced and consumed within one scheduling round. The delta
//! type travels as its raw wire value so that a producer emitting a value
//! this build does not know can be detected by the consumer.

use flowsched_id::{IdError, ResourceId, TaskId};
use serde::{Deserialize, Serialize};

/// Kind of scheduling instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DeltaType {
    Noop = 0,
    Place = 1,
    Preempt = 2,
    Migrate = 3,
}

impl DeltaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::Place => "PLACE",
            Self::Preempt => "PREEMPT",
            Self::Migrate => "MIGRATE",
        }
    }
}

impl TryFrom<i32> for DeltaType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Noop),
            1 => Ok(Self::Place),
            2 => Ok(Self::Preempt),
            3 => Ok(Self::Migrate),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for DeltaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An instruction to place, preempt, migrate or leave a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchedulingDelta {
    #[serde(rename = "type")]
    pub delta_type: i32,
    pub task_id: u64,
    /// UUID of the target resource.
    pub resource_id: String,
}

impl SchedulingDelta {
    pub fn new(kind: DeltaType, task_id: TaskId, resource_uuid: impl Into<String>) -> Self {
        Self {
            delta_type: kind as i32,
            task_id: task_id.value(),
            resource_id: resource_uuid.into(),
        }
    }

    pub fn place(task_id: TaskId, resource_uuid: impl Into<String>) -> Self {
        Self::new(DeltaType::Place, task_id, resource_uuid)
    }

    pub fn preempt(task_id: TaskId, resource_uuid: impl Into<String>) -> Self {
        Self::new(DeltaType::Preempt, task_id, resource_uuid)
    }

    pub fn migrate(task_id: TaskId, resource_uuid: impl Into<String>) -> Self {
        Self::new(DeltaType::Migrate, task_id, resource_uuid)
    }

    pub fn noop(task_id: TaskId, resource_uuid: impl Into<String>) -> Self {
        Self::new(DeltaType::Noop, task_id, resource_uuid)
    }

    /// Decodes the delta type, returning the raw value if it is unknown.
    pub fn kind(&self) -> Result<DeltaType, i32> {
        DeltaType::try_from(self.delta_type)
    }

    pub fn task(&self) -> TaskId {
        TaskId::new(self.task_id)
    }

    /// Derives the target resource's handle from its UUID.
    pub fn resource(&self) -> Result<ResourceId, IdError> {
        ResourceId::from_uuid_str(&self.resource_id)
    }

    pub fn is(&self, kind: DeltaType) -> bool {
        self.delta_type == kind as i32
    }
}
