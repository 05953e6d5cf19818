//! Reference graph manager: runnable tasks on one side, schedulable PUs on
//! the other, every task connected to every PU.

use std::collections::{BTreeMap, HashMap, HashSet};

use flowsched_id::{JobId, ResourceId, TaskId};
use flowsched_proto::{ResourceTopologyNodeDescriptor, SchedulingDelta};
use flowsched_registry::read;
use tracing::{debug, warn};

use super::{FlowNodeId, GraphManager, TaskBindings, TaskMapping, TaskSet};
use crate::registries::ResourceRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub task: TaskId,
    pub job: JobId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    pub resource: ResourceId,
    pub uuid: String,
    /// Tasks the cluster last reported running on this PU.
    pub running: usize,
}

impl ResourceNode {
    pub fn is_free(&self) -> bool {
        self.running == 0
    }
}

/// The network as seen by a solver.
#[derive(Debug, Default)]
pub struct BipartiteNetwork {
    tasks: BTreeMap<FlowNodeId, TaskNode>,
    resources: BTreeMap<FlowNodeId, ResourceNode>,
}

impl BipartiteNetwork {
    pub fn task_nodes(&self) -> impl Iterator<Item = (FlowNodeId, &TaskNode)> {
        self.tasks.iter().map(|(id, node)| (*id, node))
    }

    pub fn resource_nodes(&self) -> impl Iterator<Item = (FlowNodeId, &ResourceNode)> {
        self.resources.iter().map(|(id, node)| (*id, node))
    }

    pub fn has_resource_node(&self, id: FlowNodeId) -> bool {
        self.resources.contains_key(&id)
    }

    /// Number of PUs with no reported running task.
    pub fn free_slots(&self) -> usize {
        self.resources.values().filter(|node| node.is_free()).count()
    }
}

#[derive(Debug, Default)]
pub struct BipartiteGraphManager {
    network: BipartiteNetwork,
    task_index: HashMap<TaskId, FlowNodeId>,
    resource_index: HashMap<ResourceId, FlowNodeId>,
    next_node: u64,
}

impl BipartiteGraphManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_node(&self, task: TaskId) -> Option<FlowNodeId> {
        self.task_index.get(&task).copied()
    }

    pub fn resource_node(&self, resource: ResourceId) -> Option<FlowNodeId> {
        self.resource_index.get(&resource).copied()
    }

    fn allocate_node(&mut self) -> FlowNodeId {
        self.next_node += 1;
        FlowNodeId::new(self.next_node)
    }

    fn add_or_update_resource_node(&mut self, resource: ResourceId, uuid: &str, running: usize) {
        if let Some(node) = self.resource_index.get(&resource) {
            if let Some(existing) = self.network.resources.get_mut(node) {
                existing.running = running;
            }
            return;
        }
        let node = self.allocate_node();
        self.resource_index.insert(resource, node);
        self.network.resources.insert(
            node,
            ResourceNode {
                resource,
                uuid: uuid.to_string(),
                running,
            },
        );
        debug!(%resource, node = %node, "Added resource node");
    }

    fn remove_resource_node(&mut self, resource: ResourceId) {
        if let Some(node) = self.resource_index.remove(&resource) {
            self.network.resources.remove(&node);
            debug!(%resource, node = %node, "Removed resource node");
        }
    }

    /// Adds nodes for every schedulable PU in the subtree, refreshes their
    /// running-task counts and drops nodes for PUs that are no longer
    /// schedulable.
    fn sync_topology(&mut self, root: &ResourceTopologyNodeDescriptor) {
        for node in root.breadth_first() {
            let rd = &node.resource_desc;
            if !rd.is_pu() {
                continue;
            }
            let Ok(resource) = rd.id() else {
                warn!(uuid = %rd.uuid, "Skipping PU with unparseable UUID");
                continue;
            };
            if rd.schedulable {
                let running = rd.current_running_tasks.len();
                self.add_or_update_resource_node(resource, &rd.uuid, running);
            } else {
                self.remove_resource_node(resource);
            }
        }
    }
}

impl GraphManager for BipartiteGraphManager {
    type Network = BipartiteNetwork;

    fn network(&self) -> &BipartiteNetwork {
        &self.network
    }

    fn add_or_update_job_nodes(&mut self, runnable_tasks: &BTreeMap<JobId, TaskSet>) {
        for (job, tasks) in runnable_tasks {
            for task in tasks {
                if self.task_index.contains_key(task) {
                    continue;
                }
                let node = self.allocate_node();
                self.task_index.insert(*task, node);
                self.network.tasks.insert(
                    node,
                    TaskNode {
                        task: *task,
                        job: *job,
                    },
                );
            }
        }
    }

    fn add_resource_topology(&mut self, node: &ResourceTopologyNodeDescriptor) {
        self.sync_topology(node);
    }

    fn job_completed(&mut self, job_id: JobId) {
        let removed: Vec<FlowNodeId> = self
            .network
            .tasks
            .iter()
            .filter(|(_, node)| node.job == job_id)
            .map(|(id, _)| *id)
            .collect();
        for id in &removed {
            if let Some(node) = self.network.tasks.remove(id) {
                self.task_index.remove(&node.task);
            }
        }
        debug!(%job_id, removed = removed.len(), "Removed task nodes for completed job");
    }

    fn scheduling_deltas_for_preempted_tasks(
        &mut self,
        mapping: &TaskMapping,
        resources: &ResourceRegistry,
    ) -> Vec<SchedulingDelta> {
        let assigned: HashSet<TaskId> = mapping
            .keys()
            .filter_map(|node| self.network.tasks.get(node))
            .map(|node| node.task)
            .collect();

        let mut statuses = resources.entries_snapshot();
        statuses.sort_by_key(|(id, _)| *id);

        let mut deltas = Vec::new();
        for (_, status) in statuses {
            let status = read(&status);
            let rd = status.descriptor();
            for task in &rd.current_running_tasks {
                if !assigned.contains(task) {
                    deltas.push(SchedulingDelta::preempt(*task, rd.uuid.clone()));
                }
            }
        }
        deltas
    }

    fn node_binding_to_scheduling_delta(
        &self,
        task_node: FlowNodeId,
        resource_node: FlowNodeId,
        bindings: &TaskBindings,
    ) -> Option<SchedulingDelta> {
        let Some(task) = self.network.tasks.get(&task_node) else {
            warn!(node = %task_node, "Assignment names an unknown task node");
            return None;
        };
        let Some(resource) = self.network.resources.get(&resource_node) else {
            warn!(node = %resource_node, "Assignment names an unknown resource node");
            return None;
        };

        match bindings.get(&task.task) {
            None => Some(SchedulingDelta::place(task.task, resource.uuid.clone())),
            Some(bound) if *bound != resource.resource => {
                Some(SchedulingDelta::migrate(task.task, resource.uuid.clone()))
            }
            Some(_) => None,
        }
    }

    fn update_resource_topology(&mut self, root: &ResourceTopologyNodeDescriptor) {
        self.sync_topology(root);
    }
}
