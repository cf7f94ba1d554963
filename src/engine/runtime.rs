// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::types::JobId;

use super::core::CoreDispatcher;
use super::table::JobRecord;
use super::{CoreCommand, RuntimeEvent};

/// Async shell around [`CoreDispatcher`].
///
/// Reads events from the channel, feeds them to the core, and carries out the
/// returned commands: starting jobs on the `ExecutorBackend` and answering
/// status queries.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreDispatcher,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreDispatcher, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop. Returns every job record, in submission order, once
    /// the loop stops and the executor has torn down whatever was still
    /// running.
    pub async fn run(mut self) -> Result<Vec<JobRecord>> {
        info!(
            max_concurrent = self.core.max_concurrent(),
            "chefrunner dispatcher started"
        );

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("dispatcher event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "dispatcher received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping dispatcher");
                break;
            }
        }

        info!(
            running = self.core.running(),
            queued = self.core.queued(),
            "dispatcher exiting"
        );
        self.executor.shutdown().await;
        Ok(self.core.snapshot())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartJobs(jobs) => self.start_jobs(jobs).await?,
            CoreCommand::ReplyStatus { reply, record } => {
                // The asker may have given up; that's fine.
                let _ = reply.send(record);
            }
            CoreCommand::ReplyList { reply, records } => {
                let _ = reply.send(records);
            }
            CoreCommand::RequestExit => {
                info!("all jobs finished");
            }
        }
        Ok(())
    }

    async fn start_jobs(&mut self, jobs: Vec<JobId>) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }
        debug!(?jobs, "starting jobs");
        self.executor.start_jobs(jobs).await
    }
}
