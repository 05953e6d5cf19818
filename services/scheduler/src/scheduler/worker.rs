//! Scheduler background worker.
//!
//! Runs scheduling rounds on a periodic interval and applies job and
//! resource events between rounds. The worker is the only owner of the
//! [`Scheduler`]; other tasks talk to it through a [`SchedulerHandle`].

use std::sync::Arc;
use std::time::Duration;

use flowsched_id::JobId;
use flowsched_proto::{JobDescriptor, ResourceTopologyNodeDescriptor, TaskDescriptor};
use flowsched_registry::Shared;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

use super::Scheduler;
use crate::error::{SchedulerError, SchedulerResult};
use crate::flow::{GraphManager, Solver};
use crate::lifecycle::TaskLifecycle;
use crate::registries::Registries;

const EVENT_BUFFER: usize = 256;

/// An event delivered to the scheduler between rounds.
#[derive(Debug)]
pub enum SchedulerEvent {
    AddJob(Shared<JobDescriptor>),
    JobCompleted(JobId),
    RegisterResource(ResourceTopologyNodeDescriptor),
}

/// Cloneable sender side of a running [`SchedulerWorker`].
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    registries: Arc<Registries>,
    events: mpsc::Sender<SchedulerEvent>,
}

impl SchedulerHandle {
    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    pub async fn send(&self, event: SchedulerEvent) -> SchedulerResult<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| SchedulerError::WorkerStopped)
    }

    /// Records a job and its tasks in the registries and queues the job.
    pub async fn submit_job(
        &self,
        job: JobDescriptor,
        tasks: Vec<TaskDescriptor>,
    ) -> SchedulerResult<JobId> {
        let handle = self.registries.submit_job(job, tasks)?;
        let job_id = flowsched_registry::read(&handle)
            .id()
            .map_err(|source| SchedulerError::InvalidDescriptor {
                context: "job",
                source,
            })?;
        self.send(SchedulerEvent::AddJob(handle)).await?;
        Ok(job_id)
    }

    pub async fn add_job(&self, job: Shared<JobDescriptor>) -> SchedulerResult<()> {
        self.send(SchedulerEvent::AddJob(job)).await
    }

    pub async fn job_completed(&self, job_id: JobId) -> SchedulerResult<()> {
        self.send(SchedulerEvent::JobCompleted(job_id)).await
    }

    pub async fn register_resource(
        &self,
        node: ResourceTopologyNodeDescriptor,
    ) -> SchedulerResult<()> {
        self.send(SchedulerEvent::RegisterResource(node)).await
    }
}

/// Scheduler worker that runs the reconciliation loop.
pub struct SchedulerWorker<G, S, L> {
    scheduler: Scheduler<G, S, L>,
    events: mpsc::Receiver<SchedulerEvent>,
    interval: Duration,
    rounds: u64,
}

impl<G, S, L> SchedulerWorker<G, S, L>
where
    G: GraphManager,
    S: Solver<G::Network>,
    L: TaskLifecycle,
{
    /// Create a new scheduler worker and the handle that feeds it.
    pub fn new(scheduler: Scheduler<G, S, L>, interval: Duration) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let handle = SchedulerHandle {
            registries: Arc::clone(scheduler.registries()),
            events: tx,
        };
        let worker = Self {
            scheduler,
            events: rx,
            interval,
            rounds: 0,
        };
        (worker, handle)
    }

    pub fn scheduler(&self) -> &Scheduler<G, S, L> {
        &self.scheduler
    }

    /// Number of scheduling rounds completed so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Run the scheduler worker until shutdown is signaled.
    ///
    /// Returns the first unrecoverable error; recoverable ones are logged.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> SchedulerResult<()> {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting scheduler worker"
        );

        let Self {
            scheduler,
            events,
            interval,
            rounds,
        } = self;

        let mut ticker = tokio::time::interval(*interval);
        // Don't immediately tick on startup - wait for first interval
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(rounds = *rounds, "Scheduler worker shutting down");
                        break;
                    }
                }
                Some(event) = events.recv() => {
                    check(handle_event(scheduler, event))?;
                }
                _ = ticker.tick() => {
                    check(scheduler.run_scheduling_iteration().map(|_| ()))?;
                    *rounds += 1;
                }
            }
        }

        Ok(())
    }
}

fn handle_event<G, S, L>(
    scheduler: &mut Scheduler<G, S, L>,
    event: SchedulerEvent,
) -> SchedulerResult<()>
where
    G: GraphManager,
    S: Solver<G::Network>,
    L: TaskLifecycle,
{
    match event {
        SchedulerEvent::AddJob(job) => scheduler.add_job(job).map(|_| ()),
        SchedulerEvent::JobCompleted(job_id) => scheduler.handle_job_completion(job_id),
        SchedulerEvent::RegisterResource(node) => scheduler.register_resource(node).map(|_| ()),
    }
}

fn check(result: SchedulerResult<()>) -> SchedulerResult<()> {
    match result {
        Err(e) if e.is_unrecoverable() => {
            error!(error = %e, "Scheduler state is inconsistent, stopping");
            Err(e)
        }
        Err(e) => {
            warn!(error = %e, "Scheduler event rejected");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}
