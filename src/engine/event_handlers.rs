// src/engine/event_handlers.rs

//! Event handling logic for the core dispatcher.

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::engine::queue::JobQueue;
use crate::engine::table::{JobOutcome, JobRecord, JobState, JobTable};
use crate::engine::RuntimeOptions;
use crate::types::JobId;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand {
    /// Hand these jobs to the executor.
    StartJobs(Vec<JobId>),
    ReplyStatus {
        reply: oneshot::Sender<Option<JobRecord>>,
        record: Option<JobRecord>,
    },
    ReplyList {
        reply: oneshot::Sender<Vec<JobRecord>>,
        records: Vec<JobRecord>,
    },
    /// Stop the runtime (batch mode, once idle).
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Mutable view of the core state the handlers operate on.
pub(crate) struct Slots<'a> {
    pub table: &'a mut JobTable,
    pub queue: &'a mut JobQueue,
    pub running: &'a mut usize,
    pub max_concurrent: usize,
}

/// Handle a new submission.
///
/// - Duplicate ids are ignored; the existing record is left alone.
/// - A free slot starts the job right away.
/// - Otherwise the job waits in the queue, or is rejected if the queue is full.
pub(crate) fn handle_submission(mut slots: Slots<'_>, job: JobId) -> CoreStep {
    if slots.table.contains(&job) {
        warn!(job = %job, "duplicate job id submitted; ignoring");
        return CoreStep::continue_with(Vec::new());
    }

    if *slots.running < slots.max_concurrent {
        slots.table.insert(job.clone(), JobState::Queued);
        slots.table.mark_running(&job);
        *slots.running += 1;
        info!(job = %job, running = *slots.running, "starting job");
        return CoreStep::continue_with(vec![CoreCommand::StartJobs(vec![job])]);
    }

    match slots.queue.push(job.clone()) {
        Ok(()) => {
            slots.table.insert(job, JobState::Queued);
        }
        Err(job) => {
            warn!(job = %job, "queue full; rejecting job");
            slots.table.insert(
                job,
                JobState::Rejected {
                    reason: "queue full".to_string(),
                },
            );
        }
    }

    CoreStep::continue_with(Vec::new())
}

/// Handle a job that finished (successfully or not).
pub(crate) fn handle_finished(
    mut slots: Slots<'_>,
    options: &RuntimeOptions,
    job: JobId,
    outcome: JobOutcome,
) -> CoreStep {
    let is_running = slots
        .table
        .get(&job)
        .is_some_and(|r| r.state == JobState::Running);

    if !is_running {
        warn!(job = %job, "finish reported for a job that is not running; ignoring");
        return CoreStep::continue_with(Vec::new());
    }

    slots
        .table
        .mark_finished(&job, outcome, options.retain_output);
    *slots.running = slots.running.saturating_sub(1);

    if let Some(rec) = slots.table.get(&job) {
        info!(job = %job, state = %rec.state, "job finished");
    }

    let mut started = Vec::new();
    while *slots.running < slots.max_concurrent {
        let Some(next) = slots.queue.pop() else {
            break;
        };
        slots.table.mark_running(&next);
        *slots.running += 1;
        debug!(job = %next, "starting queued job");
        started.push(next);
    }

    let mut commands = Vec::new();
    if !started.is_empty() {
        commands.push(CoreCommand::StartJobs(started));
    }

    let idle = *slots.running == 0 && slots.queue.is_empty();
    if options.exit_when_idle && idle {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::continue_with(commands)
}
