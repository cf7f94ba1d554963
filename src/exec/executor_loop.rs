// src/exec/executor_loop.rs

//! Background loop that turns started jobs into Tokio tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::exec::job_runner::run_job;
use crate::request::ChefRunner;
use crate::types::JobId;

/// Spawn the executor loop. Returns the sender the backend feeds it with and
/// the loop's own handle.
///
/// Every job runs in its own Tokio task; the dispatcher core already enforces
/// the concurrency bound. When the channel closes, jobs still in flight are
/// aborted and awaited, so their processes are killed before the loop task
/// completes.
pub fn spawn_executor(
    runner: Arc<ChefRunner>,
    job_timeout: Option<Duration>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> (mpsc::Sender<JobId>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<JobId>(32);

    let handle = tokio::spawn(async move {
        info!("executor loop started");

        let mut active: HashMap<JobId, JoinHandle<()>> = HashMap::new();

        while let Some(job) = rx.recv().await {
            active.retain(|_, handle| !handle.is_finished());

            if active.contains_key(&job) {
                warn!(job = %job, "job already executing; ignoring duplicate start");
                continue;
            }

            debug!(job = %job, in_flight = active.len(), "spawning job task");
            let handle = tokio::spawn(run_job(
                Arc::clone(&runner),
                job.clone(),
                job_timeout,
                runtime_tx.clone(),
            ));
            active.insert(job, handle);
        }

        for (job, handle) in active {
            if !handle.is_finished() {
                debug!(job = %job, "aborting in-flight job");
                handle.abort();
            }
            // Resolves once the task's future (and its child) has been dropped.
            let _ = handle.await;
        }

        info!("executor loop finished (channel closed)");
    });

    (tx, handle)
}
