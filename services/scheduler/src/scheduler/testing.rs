//! Scripted collaborators for scheduler unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};

use flowsched_id::{JobId, ResourceId, TaskId};
use flowsched_proto::{
    JobDescriptor, ResourceDescriptor, ResourceTopologyNodeDescriptor, ResourceType,
    SchedulingDelta, TaskDescriptor,
};
use flowsched_registry::Shared;

use crate::flow::{FlowNodeId, GraphManager, Solver, TaskBindings, TaskMapping, TaskSet};
use crate::lifecycle::TaskLifecycle;
use crate::registries::{Registries, ResourceRegistry};

pub const JOB_UUID: &str = "9a0f7d2e-0000-4c4c-8d8d-000000000001";
pub const MACHINE_UUID: &str = "9a0f7d2e-1111-4c4c-8d8d-0000000000f1";
pub const PU1_UUID: &str = "9a0f7d2e-1111-4c4c-8d8d-0000000000a1";
pub const PU2_UUID: &str = "9a0f7d2e-1111-4c4c-8d8d-0000000000a2";

pub fn job_id() -> JobId {
    JobId::from_uuid_str(JOB_UUID).unwrap()
}

pub fn rid(uuid: &str) -> ResourceId {
    ResourceId::from_uuid_str(uuid).unwrap()
}

/// Task nodes are numbered by task id; resource nodes by their position in
/// `resources`, starting at 1000.
pub fn resource_node(index: u64) -> FlowNodeId {
    FlowNodeId::new(1000 + index)
}

pub fn task_node(task: u64) -> FlowNodeId {
    FlowNodeId::new(task)
}

#[derive(Debug, Default)]
pub struct ScriptedGraph {
    pub resources: HashMap<FlowNodeId, (ResourceId, String)>,
    pub preemptions: VecDeque<Vec<SchedulingDelta>>,
    pub calls: Vec<String>,
    pub runnable_seen: BTreeMap<JobId, TaskSet>,
}

impl ScriptedGraph {
    pub fn with_resources(uuids: &[&str]) -> Self {
        let resources = uuids
            .iter()
            .enumerate()
            .map(|(i, uuid)| (resource_node(i as u64), (rid(uuid), uuid.to_string())))
            .collect();
        Self {
            resources,
            ..Self::default()
        }
    }
}

impl GraphManager for ScriptedGraph {
    type Network = ();

    fn network(&self) -> &() {
        &()
    }

    fn add_or_update_job_nodes(&mut self, runnable_tasks: &BTreeMap<JobId, TaskSet>) {
        self.runnable_seen = runnable_tasks.clone();
        self.calls.push("add_or_update_job_nodes".to_string());
    }

    fn add_resource_topology(&mut self, node: &ResourceTopologyNodeDescriptor) {
        self.calls
            .push(format!("add_resource_topology:{}", node.resource_desc.uuid));
    }

    fn job_completed(&mut self, job_id: JobId) {
        self.calls.push(format!("job_completed:{job_id}"));
    }

    fn scheduling_deltas_for_preempted_tasks(
        &mut self,
        _mapping: &TaskMapping,
        _resources: &ResourceRegistry,
    ) -> Vec<SchedulingDelta> {
        self.calls.push("preempted".to_string());
        self.preemptions.pop_front().unwrap_or_default()
    }

    fn node_binding_to_scheduling_delta(
        &self,
        task_node: FlowNodeId,
        resource_node: FlowNodeId,
        bindings: &TaskBindings,
    ) -> Option<SchedulingDelta> {
        let task = TaskId::new(task_node.value());
        let (resource, uuid) = self.resources.get(&resource_node)?;
        match bindings.get(&task) {
            None => Some(SchedulingDelta::place(task, uuid.clone())),
            Some(bound) if bound != resource => Some(SchedulingDelta::migrate(task, uuid.clone())),
            Some(_) => None,
        }
    }

    fn update_resource_topology(&mut self, root: &ResourceTopologyNodeDescriptor) {
        self.calls
            .push(format!("update_resource_topology:{}", root.resource_desc.uuid));
    }
}

#[derive(Debug, Default)]
pub struct ScriptedSolver {
    pub rounds: VecDeque<TaskMapping>,
}

impl ScriptedSolver {
    pub fn new(rounds: Vec<TaskMapping>) -> Self {
        Self {
            rounds: rounds.into(),
        }
    }
}

impl Solver<()> for ScriptedSolver {
    fn solve(&mut self, _network: &()) -> TaskMapping {
        self.rounds.pop_front().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    Placed(TaskId, String),
    Evicted(TaskId, String),
    Migrated(TaskId, String),
}

#[derive(Debug, Default)]
pub struct RecordingLifecycle {
    pub hooks: Vec<Hook>,
}

impl TaskLifecycle for RecordingLifecycle {
    fn handle_task_placement(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor) {
        self.hooks.push(Hook::Placed(task.uid, resource.uuid.clone()));
    }

    fn handle_task_eviction(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor) {
        self.hooks.push(Hook::Evicted(task.uid, resource.uuid.clone()));
    }

    fn handle_task_migration(&mut self, task: &TaskDescriptor, resource: &ResourceDescriptor) {
        self.hooks.push(Hook::Migrated(task.uid, resource.uuid.clone()));
    }
}

/// Machine with two PUs under one core.
pub fn machine() -> ResourceTopologyNodeDescriptor {
    let pu = |uuid: &str| {
        ResourceTopologyNodeDescriptor::new(ResourceDescriptor::new(uuid, uuid, ResourceType::Pu))
    };
    let core = ResourceTopologyNodeDescriptor::new(ResourceDescriptor::new(
        "9a0f7d2e-1111-4c4c-8d8d-0000000000c1",
        "core0",
        ResourceType::Core,
    ))
    .with_child(pu(PU1_UUID))
    .with_child(pu(PU2_UUID));

    ResourceTopologyNodeDescriptor::new(ResourceDescriptor::new(
        MACHINE_UUID,
        "m1",
        ResourceType::Machine,
    ))
    .with_child(core)
}

/// Submits a job with tasks `1..=tasks` to the registries.
pub fn submit(registries: &Registries, tasks: u64) -> Shared<JobDescriptor> {
    let tasks = (1..=tasks)
        .map(|t| TaskDescriptor::new(TaskId::new(t), format!("t{t}"), JOB_UUID))
        .collect();
    registries
        .submit_job(JobDescriptor::new(JOB_UUID, "j1", Vec::new()), tasks)
        .unwrap()
}
