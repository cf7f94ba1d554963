// src/exec/job_runner.rs

//! Runs one dispatched job and reports how it ended.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::engine::{JobOutcome, RuntimeEvent};
use crate::errors::{ChefRunnerError, Result};
use crate::request::{ChefRunner, RunOutcome};
use crate::types::JobId;

/// Run `job` through the chef runner and send `JobFinished`.
///
/// With a timeout, the run future is dropped when it expires; the process is
/// spawned with `kill_on_drop`, so the child dies with it.
///
/// Log retention is not applied here: other jobs may still be writing their
/// logs. The CLI prunes once at startup, before any job is submitted.
pub async fn run_job(
    runner: Arc<ChefRunner>,
    job: JobId,
    timeout: Option<Duration>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, runner.run(&job)).await {
            Ok(result) => outcome_from(&job, result),
            Err(_) => {
                warn!(job = %job, timeout = ?limit, "chef run timed out; process killed");
                JobOutcome::TimedOut {
                    log_path: runner.resolver().log_path(&job),
                }
            }
        },
        None => outcome_from(&job, runner.run(&job).await),
    };

    if runtime_tx
        .send(RuntimeEvent::JobFinished {
            job: job.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        warn!(job = %job, "dispatcher gone; dropping job completion");
    }
}

fn outcome_from(job: &JobId, result: Result<RunOutcome>) -> JobOutcome {
    match result {
        Ok(run) => JobOutcome::Exited {
            log_path: run.log_path,
            output: run.output,
        },
        Err(err @ ChefRunnerError::Launch { .. }) => {
            error!(job = %job, error = %err, "chef-client could not be started");
            JobOutcome::LaunchFailed(err.to_string())
        }
        Err(err) => {
            error!(job = %job, error = %err, "chef run failed after launch");
            JobOutcome::Errored(err.to_string())
        }
    }
}
