// src/engine/core.rs

//! Pure core dispatcher state machine.
//!
//! Consumes [`RuntimeEvent`]s and produces an updated state plus a list of
//! commands for the IO shell (`engine::runtime::Runtime`). It owns no
//! channels and spawns nothing, so it can be driven directly from tests.
//!
//! Invariant: the number of running jobs never exceeds `max_concurrent`, and
//! queued jobs start in submission order.

use crate::engine::event_handlers::{
    handle_finished, handle_submission, CoreCommand, CoreStep, Slots,
};
use crate::engine::queue::JobQueue;
use crate::engine::table::{JobRecord, JobTable};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::JobId;

#[derive(Debug)]
pub struct CoreDispatcher {
    table: JobTable,
    queue: JobQueue,
    running: usize,
    max_concurrent: usize,
    options: RuntimeOptions,
}

impl CoreDispatcher {
    pub fn new(max_concurrent: usize, queue_length: usize, options: RuntimeOptions) -> Self {
        Self {
            table: JobTable::new(),
            queue: JobQueue::new(queue_length),
            running: 0,
            max_concurrent: max_concurrent.max(1),
            options,
        }
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.running == 0 && self.queue.is_empty()
    }

    pub fn record(&self, job: &JobId) -> Option<&JobRecord> {
        self.table.get(job)
    }

    /// All records in submission order.
    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.table.snapshot()
    }

    /// Handle a single event, returning the commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::JobSubmitted { job } => handle_submission(self.slots(), job),
            RuntimeEvent::JobFinished { job, outcome } => {
                let options = self.options;
                handle_finished(self.slots(), &options, job, outcome)
            }
            RuntimeEvent::StatusRequested { job, reply } => {
                let record = self.table.get(&job).cloned();
                CoreStep::continue_with(vec![CoreCommand::ReplyStatus { reply, record }])
            }
            RuntimeEvent::ListRequested { reply } => {
                let records = self.table.snapshot();
                CoreStep::continue_with(vec![CoreCommand::ReplyList { reply, records }])
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    fn slots(&mut self) -> Slots<'_> {
        Slots {
            table: &mut self.table,
            queue: &mut self.queue,
            running: &mut self.running,
            max_concurrent: self.max_concurrent,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::engine::{JobOutcome, JobState};
    use crate::exec::process::ProcessOutput;

    fn id(s: &str) -> JobId {
        JobId::new(s).unwrap()
    }

    fn exited(code: i32) -> JobOutcome {
        JobOutcome::Exited {
            log_path: PathBuf::from("job.log"),
            output: ProcessOutput {
                exit_code: code,
                ..ProcessOutput::default()
            },
        }
    }

    fn started(step: &CoreStep) -> Vec<String> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::StartJobs(jobs) => Some(jobs.clone()),
                _ => None,
            })
            .flatten()
            .map(|j| j.to_string())
            .collect()
    }

    fn submit(core: &mut CoreDispatcher, name: &str) -> CoreStep {
        core.step(RuntimeEvent::JobSubmitted { job: id(name) })
    }

    #[test]
    fn submission_starts_immediately_when_a_slot_is_free() {
        let mut core = CoreDispatcher::new(1, 4, RuntimeOptions::default());
        let step = submit(&mut core, "a");
        assert_eq!(started(&step), vec!["a"]);
        assert!(step.keep_running);
        assert_eq!(core.record(&id("a")).unwrap().state, JobState::Running);
    }

    #[test]
    fn excess_submissions_queue_then_start_in_order() {
        let mut core = CoreDispatcher::new(1, 4, RuntimeOptions::default());
        submit(&mut core, "a");
        assert!(started(&submit(&mut core, "b")).is_empty());
        assert!(started(&submit(&mut core, "c")).is_empty());
        assert_eq!(core.queued(), 2);
        assert_eq!(core.record(&id("b")).unwrap().state, JobState::Queued);

        let step = core.step(RuntimeEvent::JobFinished {
            job: id("a"),
            outcome: exited(0),
        });
        assert_eq!(started(&step), vec!["b"]);
        assert_eq!(core.running(), 1);

        let step = core.step(RuntimeEvent::JobFinished {
            job: id("b"),
            outcome: exited(1),
        });
        assert_eq!(started(&step), vec!["c"]);
        assert_eq!(
            core.record(&id("b")).unwrap().state,
            JobState::Completed { exit_code: 1 }
        );
    }

    #[test]
    fn full_queue_rejects() {
        let mut core = CoreDispatcher::new(1, 1, RuntimeOptions::default());
        submit(&mut core, "a");
        submit(&mut core, "b");
        submit(&mut core, "c");

        assert!(matches!(
            core.record(&id("c")).unwrap().state,
            JobState::Rejected { .. }
        ));
        assert_eq!(core.queued(), 1);
    }

    #[test]
    fn duplicate_submission_leaves_original_alone() {
        let mut core = CoreDispatcher::new(2, 1, RuntimeOptions::default());
        submit(&mut core, "a");
        let step = submit(&mut core, "a");
        assert!(started(&step).is_empty());
        assert_eq!(core.running(), 1);
        assert_eq!(core.snapshot().len(), 1);
    }

    #[test]
    fn stray_finish_is_ignored() {
        let mut core = CoreDispatcher::new(1, 1, RuntimeOptions::default());
        let step = core.step(RuntimeEvent::JobFinished {
            job: id("ghost"),
            outcome: exited(0),
        });
        assert!(step.commands.is_empty());
        assert!(core.record(&id("ghost")).is_none());
    }

    #[test]
    fn exits_when_idle_in_batch_mode() {
        let options = RuntimeOptions {
            exit_when_idle: true,
            retain_output: false,
        };
        let mut core = CoreDispatcher::new(2, 4, options);
        submit(&mut core, "a");
        submit(&mut core, "b");

        let step = core.step(RuntimeEvent::JobFinished {
            job: id("a"),
            outcome: JobOutcome::LaunchFailed("not found".into()),
        });
        assert!(step.keep_running);

        let step = core.step(RuntimeEvent::JobFinished {
            job: id("b"),
            outcome: JobOutcome::TimedOut {
                log_path: "b.log".into(),
            },
        });
        assert!(!step.keep_running);
        assert!(matches!(step.commands.last(), Some(CoreCommand::RequestExit)));
        assert!(core.is_idle());
    }

    #[test]
    fn shutdown_stops_the_loop() {
        let options = RuntimeOptions::default();
        assert!(!options.exit_when_idle && !options.retain_output);
        let mut core = CoreDispatcher::new(1, 1, options);
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }
}
