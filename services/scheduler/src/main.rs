//! flowsched
//!
//! Runs the flow scheduler against an in-memory cluster: resources and jobs
//! come from an optional seed file, rounds run on a fixed interval, and task
//! lifecycle hooks are logged.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use flowsched_scheduler::{
    cluster::ClusterSpec,
    config::Config,
    flow::{BipartiteGraphManager, FirstFitSolver},
    lifecycle::TracingLifecycle,
    Registries, Scheduler, SchedulerHandle, SchedulerWorker,
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to FLOWSCHED_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    info!("Starting flowsched");
    info!(
        round_interval_ms = config.round_interval.as_millis() as u64,
        cluster_file = ?config.cluster_file,
        "Configuration loaded"
    );

    let seed = match &config.cluster_file {
        Some(path) => ClusterSpec::load(path)?,
        None => ClusterSpec::default(),
    };

    let scheduler = Scheduler::new(
        Arc::new(Registries::new()),
        BipartiteGraphManager::new(),
        FirstFitSolver::new(),
        TracingLifecycle,
    );
    let (mut worker, handle) = SchedulerWorker::new(scheduler, config.round_interval);

    // Create shutdown channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut worker_handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    seed_cluster(&handle, seed)
        .await
        .context("failed to seed cluster")?;

    // Wait for shutdown signal (Ctrl+C) or for the worker to give up
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = &mut worker_handle => {
            return match result {
                Ok(Ok(())) => {
                    info!("Scheduler worker exited");
                    Ok(())
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Scheduler worker failed");
                    Err(e.into())
                }
                Err(e) => {
                    error!(error = %e, "Scheduler worker panicked");
                    Err(e.into())
                }
            };
        }
    }

    let _ = shutdown_tx.send(true);

    info!("Waiting for scheduler worker to shut down...");
    let shutdown_timeout = Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, worker_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!(error = %e, "Scheduler worker failed during shutdown"),
        Ok(Err(e)) => warn!(error = %e, "Scheduler worker panicked"),
        Err(_) => warn!("Scheduler worker did not shut down in time"),
    }

    info!("Shutdown complete");
    Ok(())
}

async fn seed_cluster(handle: &SchedulerHandle, seed: ClusterSpec) -> Result<()> {
    let machines = seed.topology.len();
    let jobs = seed.jobs.len();

    for root in seed.topology {
        handle.register_resource(root).await?;
    }
    for job in seed.jobs {
        let (job, tasks) = job.into_descriptors();
        let job_id = handle.submit_job(job, tasks).await?;
        info!(%job_id, "Submitted seed job");
    }

    info!(machines, jobs, "Cluster seeded");
    Ok(())
}
