//! Shared doubles for scheduler integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use flowsched_id::{JobId, ResourceId, TaskId};
use flowsched_proto::{
    JobDescriptor, ResourceDescriptor, ResourceTopologyNodeDescriptor, ResourceType,
    SchedulingDelta, TaskDescriptor,
};
use flowsched_registry::Shared;
use flowsched_scheduler::flow::{
    FlowNodeId, GraphManager, Solver, TaskBindings, TaskMapping, TaskSet,
};
use flowsched_scheduler::lifecycle::TaskLifecycle;
use flowsched_scheduler::registries::ResourceRegistry;
use flowsched_scheduler::{Registries, Scheduler};

/// Deterministic UUID for test entity `n`.
pub fn uuid(n: u64) -> String {
    format!("3d3d3d3d-0000-4000-8000-{n:012x}")
}

pub fn job_uuid(n: u64) -> String {
    uuid(0x1000 + n)
}

pub fn job_id(n: u64) -> JobId {
    JobId::from_uuid_str(&job_uuid(n)).unwrap()
}

pub fn pu_uuid(n: u64) -> String {
    uuid(0x2000 + n)
}

pub fn pu_id(n: u64) -> ResourceId {
    ResourceId::from_uuid_str(&pu_uuid(n)).unwrap()
}

pub fn t(n: u64) -> TaskId {
    TaskId::new(n)
}

/// Machine `m` with `pus` processing units directly below it, numbered
/// `first_pu..first_pu + pus`.
pub fn machine(m: u64, first_pu: u64, pus: u64) -> ResourceTopologyNodeDescriptor {
    let root = ResourceTopologyNodeDescriptor::new(ResourceDescriptor::new(
        uuid(0x3000 + m),
        format!("m{m}"),
        ResourceType::Machine,
    ));
    (first_pu..first_pu + pus).fold(root, |node, n| {
        node.with_child(ResourceTopologyNodeDescriptor::new(ResourceDescriptor::new(
            pu_uuid(n),
            format!("pu{n}"),
            ResourceType::Pu,
        )))
    })
}

/// Records job `n` with the given task ids in the registries.
pub fn submit(registries: &Registries, n: u64, tasks: &[u64]) -> Shared<JobDescriptor> {
    let tasks = tasks
        .iter()
        .map(|&id| TaskDescriptor::new(t(id), format!("t{id}"), job_uuid(n)))
        .collect();
    registries
        .submit_job(JobDescriptor::new(job_uuid(n), format!("j{n}"), Vec::new()), tasks)
        .unwrap()
}

/// Task node ids equal task ids; resource node ids are `1000 + pu number`.
pub fn task_node(task: u64) -> FlowNodeId {
    FlowNodeId::new(task)
}

pub fn pu_node(n: u64) -> FlowNodeId {
    FlowNodeId::new(1000 + n)
}

pub fn mapping(pairs: &[(u64, u64)]) -> TaskMapping {
    pairs
        .iter()
        .map(|&(task, pu)| (task_node(task), pu_node(pu)))
        .collect()
}

/// Graph manager whose preemptions are scripted per round and whose
/// classification follows the committed bindings.
#[derive(Debug, Default)]
pub struct ScriptedGraph {
    pub preemptions: VecDeque<Vec<SchedulingDelta>>,
    pub completed: Vec<JobId>,
    pub topology_updates: usize,
    pub pu_count: u64,
}

impl ScriptedGraph {
    pub fn new(pu_count: u64) -> Self {
        Self {
            pu_count,
            ..Self::default()
        }
    }
}

impl GraphManager for ScriptedGraph {
    type Network = ();

    fn network(&self) -> &() {
        &()
    }

    fn add_or_update_job_nodes(&mut self, _runnable_tasks: &BTreeMap<JobId, TaskSet>) {}

    fn add_resource_topology(&mut self, _node: &ResourceTopologyNodeDescriptor) {}

    fn job_completed(&mut self, job_id: JobId) {
        self.completed.push(job_id);
    }

    fn scheduling_deltas_for_preempted_tasks(
        &mut self,
        _mapping: &TaskMapping,
        _resources: &ResourceRegistry,
    ) -> Vec<SchedulingDelta> {
        self.preemptions.pop_front().unwrap_or_default()
    }

    fn node_binding_to_scheduling_delta(
        &self,
        task_node: FlowNodeId,
        resource_node: FlowNodeId,
        bindings: &TaskBindings,
    ) -> Option<SchedulingDelta> {
        let pu = resource_node.value().checked_sub(1000)?;
        if pu == 0 || pu > self.pu_count {
            return None;
        }
        let task = TaskId::new(task_node.value());
        match bindings.get(&task) {
            None => Some(SchedulingDelta::place(task, pu_uuid(pu))),
            Some(bound) if *bound != pu_id(pu) => Some(SchedulingDelta::migrate(task, pu_uuid(pu))),
            Some(_) => None,
        }
    }

    fn update_resource_topology(&mut self, _root: &ResourceTopologyNodeDescriptor) {
        self.topology_updates += 1;
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

impl RecordingLifecycle {
    pub fn count(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for hook in &self.hooks {
            let key = match hook {
                Hook::Placed(..) => "placed",
                Hook::Evicted(..) => "evicted",
                Hook::Migrated(..) => "migrated",
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
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

pub type ScriptedScheduler = Scheduler<ScriptedGraph, ScriptedSolver, RecordingLifecycle>;

/// Scheduler over `pus` scripted PUs with the given solver rounds.
pub fn scripted(pus: u64, rounds: Vec<TaskMapping>) -> ScriptedScheduler {
    Scheduler::new(
        Arc::new(Registries::new()),
        ScriptedGraph::new(pus),
        ScriptedSolver::new(rounds),
        RecordingLifecycle::default(),
    )
}
