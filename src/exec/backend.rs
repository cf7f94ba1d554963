// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The dispatcher runtime talks to an `ExecutorBackend` instead of spawning
//! processes itself, so tests can swap in a fake that reports completions
//! directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::engine::RuntimeEvent;
use crate::errors::{ChefRunnerError, Result};
use crate::request::ChefRunner;
use crate::types::JobId;

use super::executor_loop::spawn_executor;

pub trait ExecutorBackend: Send {
    /// Begin executing the given jobs. Each job must eventually produce a
    /// `RuntimeEvent::JobFinished`.
    fn start_jobs(
        &mut self,
        jobs: Vec<JobId>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Stop accepting jobs and wait until every job still in flight has been
    /// torn down. Called once by the runtime before it returns.
    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

/// Production backend: forwards jobs to the background executor loop.
pub struct RealExecutorBackend {
    tx: Option<mpsc::Sender<JobId>>,
    loop_handle: Option<JoinHandle<()>>,
}

impl RealExecutorBackend {
    /// Spawns the executor loop immediately.
    pub fn new(
        runner: Arc<ChefRunner>,
        job_timeout: Option<Duration>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let (tx, loop_handle) = spawn_executor(runner, job_timeout, runtime_tx);
        Self {
            tx: Some(tx),
            loop_handle: Some(loop_handle),
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn start_jobs(
        &mut self,
        jobs: Vec<JobId>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            let tx = tx.ok_or(ChefRunnerError::ChannelClosed)?;
            for job in jobs {
                tx.send(job)
                    .await
                    .map_err(|_| ChefRunnerError::ChannelClosed)?;
            }
            Ok(())
        })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        // Closing our sender ends the loop's receive.
        self.tx = None;
        let loop_handle = self.loop_handle.take();

        Box::pin(async move {
            let Some(handle) = loop_handle else {
                return;
            };
            if let Err(err) = handle.await {
                warn!(error = %err, "executor loop ended abnormally");
            }
        })
    }
}
