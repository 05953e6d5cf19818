//! The scheduling reconciliation loop.
//!
//! The scheduler diffs each round's solver output against `task_bindings`,
//! the committed bindings as of the end of the previous round. Nothing keeps
//! a per-resource list of running tasks for this purpose; the single binding
//! map is the only record of what changed.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use flowsched_id::{JobId, ResourceId, TaskId};
use flowsched_proto::{
    DeltaType, JobDescriptor, JobState, ResourceStatus, ResourceTopologyNodeDescriptor,
    SchedulingDelta, TaskState,
};
use flowsched_registry::{read, write, Shared};
use tracing::{debug, info, instrument};

use crate::error::{SchedulerError, SchedulerResult};
use crate::flow::{GraphManager, Solver, TaskBindings, TaskSet};
use crate::lifecycle::TaskLifecycle;
use crate::registries::{Registries, ResourceRegistry};

/// Flow scheduler state.
///
/// Every mutating operation takes `&mut self`: the pending-work sets, the
/// binding snapshot and the root index have a single owner. Events raised on
/// other threads reach the scheduler through [`super::SchedulerWorker`].
pub struct Scheduler<G, S, L> {
    pub(super) registries: Arc<Registries>,
    pub(super) graph_manager: G,
    pub(super) solver: S,
    pub(super) lifecycle: L,
    /// Registered topology roots, keyed by the root's resource id.
    pub(super) resource_roots: BTreeMap<ResourceId, ResourceTopologyNodeDescriptor>,
    /// Task -> resource as of the end of the last round.
    pub(super) task_bindings: TaskBindings,
    /// Jobs to consider in the next round.
    pub(super) jobs_to_schedule: BTreeMap<JobId, Shared<JobDescriptor>>,
    /// Runnable tasks per pending job. Dependencies are not tracked, so every
    /// task of a pending job is runnable.
    pub(super) runnable_tasks: BTreeMap<JobId, TaskSet>,
}

impl<G, S, L> Scheduler<G, S, L>
where
    G: GraphManager,
    S: Solver<G::Network>,
    L: TaskLifecycle,
{
    pub fn new(registries: Arc<Registries>, graph_manager: G, solver: S, lifecycle: L) -> Self {
        Self {
            registries,
            graph_manager,
            solver,
            lifecycle,
            resource_roots: BTreeMap::new(),
            task_bindings: HashMap::new(),
            jobs_to_schedule: BTreeMap::new(),
            runnable_tasks: BTreeMap::new(),
        }
    }

    /// Queues a job for the next scheduling round.
    ///
    /// Graph nodes for the job are created lazily by the next round.
    pub fn add_job(&mut self, job: Shared<JobDescriptor>) -> SchedulerResult<JobId> {
        let (job_id, tasks) = {
            let jd = read(&job);
            let job_id = jd
                .id()
                .map_err(|source| SchedulerError::InvalidDescriptor {
                    context: "job",
                    source,
                })?;
            (job_id, jd.tasks.iter().copied().collect::<TaskSet>())
        };

        info!(%job_id, tasks = tasks.len(), "Job queued for scheduling");
        self.runnable_tasks.insert(job_id, tasks);
        self.jobs_to_schedule.insert(job_id, job);
        Ok(job_id)
    }

    /// Retires a finished job.
    ///
    /// The job must be known to the job registry and must not have completed
    /// before. Its graph nodes are removed, it leaves both pending-work sets,
    /// its tasks lose their bindings and it ends in `Completed`.
    pub fn handle_job_completion(&mut self, job_id: JobId) -> SchedulerResult<()> {
        let job = self
            .registries
            .jobs
            .find_ptr_or_null(&job_id)
            .ok_or(SchedulerError::JobNotFound(job_id))?;
        if read(&job).state == JobState::Completed {
            return Err(SchedulerError::JobAlreadyCompleted(job_id));
        }

        self.graph_manager.job_completed(job_id);
        self.jobs_to_schedule.remove(&job_id);
        self.runnable_tasks.remove(&job_id);

        let mut jd = write(&job);
        for task_id in &jd.tasks {
            self.task_bindings.remove(task_id);
            if let Some(task) = self.registries.tasks.find_ptr_or_null(task_id) {
                let mut td = write(&task);
                td.state = TaskState::Completed;
                td.scheduled_to_resource = None;
            }
        }
        jd.state = JobState::Completed;

        info!(%job_id, "Job completed");
        Ok(())
    }

    /// Registers a resource topology subtree.
    ///
    /// Every PU in the subtree is marked schedulable and every node is
    /// recorded in the resource registry. A subtree without a parent is a new
    /// root and receives capacity updates after each round.
    pub fn register_resource(
        &mut self,
        mut node: ResourceTopologyNodeDescriptor,
    ) -> SchedulerResult<ResourceId> {
        let root_id = node
            .resource_desc
            .id()
            .map_err(|source| SchedulerError::InvalidDescriptor {
                context: "resource",
                source,
            })?;

        let mut error = None;
        let mut pus = 0usize;
        node.for_each_breadth_first_mut(|rd| {
            if rd.is_pu() {
                rd.schedulable = true;
                pus += 1;
            }
            match rd.id() {
                Ok(id) => {
                    let status = ResourceStatus::new(rd.clone());
                    if !self.registries.resources.insert_if_not_present(id, status) {
                        if let Some(existing) = self.registries.resources.find_ptr_or_null(&id) {
                            write(&existing).descriptor.schedulable |= rd.schedulable;
                        }
                    }
                }
                Err(source) => {
                    error.get_or_insert(SchedulerError::InvalidDescriptor {
                        context: "resource",
                        source,
                    });
                }
            }
        });
        if let Some(err) = error {
            return Err(err);
        }

        self.graph_manager.add_resource_topology(&node);

        let is_root = node.is_root();
        if is_root {
            self.resource_roots.insert(root_id, node);
        }

        info!(resource_id = %root_id, pus, is_root, "Resource registered");
        Ok(root_id)
    }

    /// Runs one scheduling round.
    ///
    /// Returns every delta of the round in the order it was applied, and how
    /// many of them were placements. Preemption deltas come first so a
    /// preempted task's resource is free before anything is placed there.
    #[instrument(skip(self), fields(pending_jobs = self.jobs_to_schedule.len()))]
    pub fn run_scheduling_iteration(&mut self) -> SchedulerResult<(Vec<SchedulingDelta>, usize)> {
        self.graph_manager
            .add_or_update_job_nodes(&self.runnable_tasks);

        let mapping = self.solver.solve(self.graph_manager.network());
        debug!(assignments = mapping.len(), "Solver finished");

        let mut deltas = self
            .graph_manager
            .scheduling_deltas_for_preempted_tasks(&mapping, &self.registries.resources);

        for (&task_node, &resource_node) in &mapping {
            if let Some(delta) = self.graph_manager.node_binding_to_scheduling_delta(
                task_node,
                resource_node,
                &self.task_bindings,
            ) {
                deltas.push(delta);
            }
        }

        let placed = self.apply_scheduling_deltas(&deltas)?;

        // Capacity propagation runs after the deltas are applied, against the
        // registry's current view of each machine.
        for root in self.resource_roots.values_mut() {
            refresh_from_registry(root, &self.registries.resources);
            self.graph_manager.update_resource_topology(root);
        }

        let count = |kind: DeltaType| deltas.iter().filter(|d| d.is(kind)).count();
        info!(
            deltas = deltas.len(),
            placed,
            preempted = count(DeltaType::Preempt),
            migrated = count(DeltaType::Migrate),
            "Scheduling round complete"
        );

        Ok((deltas, placed))
    }

    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    pub fn graph_manager(&self) -> &G {
        &self.graph_manager
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    pub fn task_bindings(&self) -> &TaskBindings {
        &self.task_bindings
    }

    pub fn binding(&self, task: TaskId) -> Option<ResourceId> {
        self.task_bindings.get(&task).copied()
    }

    pub fn resource_roots(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.resource_roots.keys().copied()
    }

    pub fn resource_root(&self, id: ResourceId) -> Option<&ResourceTopologyNodeDescriptor> {
        self.resource_roots.get(&id)
    }

    pub fn jobs_to_schedule(&self) -> impl Iterator<Item = JobId> + '_ {
        self.jobs_to_schedule.keys().copied()
    }

    pub fn is_pending(&self, job: JobId) -> bool {
        self.jobs_to_schedule.contains_key(&job)
    }

    pub fn runnable_tasks(&self, job: JobId) -> Option<&TaskSet> {
        self.runnable_tasks.get(&job)
    }
}

/// Replaces every descriptor in the subtree with the registry's copy, which
/// carries withdrawals and reported running tasks.
fn refresh_from_registry(root: &mut ResourceTopologyNodeDescriptor, resources: &ResourceRegistry) {
    root.for_each_breadth_first_mut(|rd| {
        let Ok(id) = rd.id() else {
            return;
        };
        if let Some(status) = resources.find_copy(&id) {
            *rd = status.descriptor;
        }
    });
}
