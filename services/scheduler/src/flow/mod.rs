//! Seams to the flow-graph layer.
//!
//! The scheduler never builds or solves the flow network itself. It talks to
//! a [`GraphManager`], which owns the network, and a [`Solver`], which turns
//! the network into a task-node to resource-node assignment.
//!
//! [`BipartiteGraphManager`] and [`FirstFitSolver`] are small reference
//! collaborators: one task per processing unit, no costs. They drive the
//! `flowsched` binary and the end-to-end tests.

mod bipartite;
mod first_fit;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use flowsched_id::{define_id, JobId, ResourceId, TaskId};
use flowsched_proto::{ResourceTopologyNodeDescriptor, SchedulingDelta};

use crate::registries::ResourceRegistry;

pub use bipartite::{BipartiteGraphManager, BipartiteNetwork};
pub use first_fit::FirstFitSolver;

define_id!(FlowNodeId, u64);

/// Solver output: task node -> resource node.
///
/// Ordered so that the deltas of a round come out in a stable order.
pub type TaskMapping = BTreeMap<FlowNodeId, FlowNodeId>;

/// Committed task -> resource bindings as of the end of the last round.
pub type TaskBindings = HashMap<TaskId, ResourceId>;

pub type TaskSet = BTreeSet<TaskId>;

/// Owner of the flow network.
pub trait GraphManager {
    /// The network representation handed to the solver.
    type Network;

    fn network(&self) -> &Self::Network;

    /// Creates or refreshes task nodes for the runnable tasks of pending jobs.
    fn add_or_update_job_nodes(&mut self, runnable_tasks: &BTreeMap<JobId, TaskSet>);

    /// Ingests a newly registered topology subtree.
    fn add_resource_topology(&mut self, node: &ResourceTopologyNodeDescriptor);

    /// Removes a completed job's nodes.
    fn job_completed(&mut self, job_id: JobId);

    /// Preemption deltas for tasks that are running but absent from the new
    /// assignment.
    fn scheduling_deltas_for_preempted_tasks(
        &mut self,
        mapping: &TaskMapping,
        resources: &ResourceRegistry,
    ) -> Vec<SchedulingDelta>;

    /// Classifies one assignment pair against the committed bindings:
    /// `PLACE` when the task is unbound, `MIGRATE` when it is bound to a
    /// different resource, nothing when the binding is unchanged.
    fn node_binding_to_scheduling_delta(
        &self,
        task_node: FlowNodeId,
        resource_node: FlowNodeId,
        bindings: &TaskBindings,
    ) -> Option<SchedulingDelta>;

    /// Propagates capacity changes below a topology root after a round.
    fn update_resource_topology(&mut self, root: &ResourceTopologyNodeDescriptor);
}

/// Computes an assignment over a graph manager's network.
pub trait Solver<N: ?Sized> {
    fn solve(&mut self, network: &N) -> TaskMapping;
}
