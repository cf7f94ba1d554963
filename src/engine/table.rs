// src/engine/table.rs

//! Bookkeeping of every job the dispatcher has seen.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::exec::process::ProcessOutput;
use crate::types::{ExitCode, JobId, LAUNCH_FAILURE_CODE};

/// Lifecycle of a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    /// The process ran to completion; non-zero codes are failures.
    Completed { exit_code: ExitCode },
    /// The process could not be started.
    LaunchFailed { error: String },
    /// The process started but waiting on it failed.
    Errored { error: String },
    TimedOut,
    /// Never accepted (e.g. the queue was full).
    Rejected { reason: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Queued | JobState::Running)
    }

    /// Exit code of the process, if one was produced.
    pub fn exit_code(&self) -> Option<ExitCode> {
        match self {
            JobState::Completed { exit_code } => Some(*exit_code),
            _ => None,
        }
    }

    /// Integer status for reporting: the real exit code, or the launch
    /// failure sentinel for jobs that never produced one.
    pub fn status_code(&self) -> Option<ExitCode> {
        match self {
            JobState::Completed { exit_code } => Some(*exit_code),
            JobState::LaunchFailed { .. }
            | JobState::Errored { .. }
            | JobState::TimedOut
            | JobState::Rejected { .. } => Some(LAUNCH_FAILURE_CODE),
            JobState::Queued | JobState::Running => None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, JobState::Completed { exit_code: 0 })
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Queued => write!(f, "queued"),
            JobState::Running => write!(f, "running"),
            JobState::Completed { exit_code } => write!(f, "completed (exit {exit_code})"),
            JobState::LaunchFailed { error } => write!(f, "launch failed: {error}"),
            JobState::Errored { error } => write!(f, "error: {error}"),
            JobState::TimedOut => write!(f, "timed out"),
            JobState::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}

/// How a started job ended, as reported by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Exited {
        log_path: PathBuf,
        output: ProcessOutput,
    },
    LaunchFailed(String),
    /// Any other failure after the process was handed to the runner.
    Errored(String),
    /// Killed at the deadline; the log may hold partial output.
    TimedOut { log_path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: JobId,
    pub state: JobState,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub log_path: Option<PathBuf>,
    /// Only filled when output retention is enabled.
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl JobRecord {
    fn new(id: JobId, state: JobState) -> Self {
        Self {
            id,
            state,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
            log_path: None,
            stdout: None,
            stderr: None,
        }
    }
}

/// All known jobs, remembering submission order.
#[derive(Debug, Default)]
pub struct JobTable {
    records: HashMap<JobId, JobRecord>,
    order: Vec<JobId>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &JobId) -> Option<&JobRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert a new job. Returns `false` (and changes nothing) if the id is
    /// already known.
    pub fn insert(&mut self, id: JobId, state: JobState) -> bool {
        if self.records.contains_key(&id) {
            return false;
        }
        self.order.push(id.clone());
        self.records.insert(id.clone(), JobRecord::new(id, state));
        true
    }

    pub fn mark_running(&mut self, id: &JobId) {
        if let Some(rec) = self.records.get_mut(id) {
            rec.state = JobState::Running;
            rec.started_at = Some(Utc::now());
        }
    }

    pub fn mark_finished(&mut self, id: &JobId, outcome: JobOutcome, retain_output: bool) {
        let Some(rec) = self.records.get_mut(id) else {
            return;
        };
        rec.finished_at = Some(Utc::now());
        rec.state = match outcome {
            JobOutcome::Exited { log_path, output } => {
                rec.log_path = Some(log_path);
                if retain_output {
                    rec.stdout = Some(output.stdout);
                    rec.stderr = Some(output.stderr);
                }
                JobState::Completed {
                    exit_code: output.exit_code,
                }
            }
            JobOutcome::LaunchFailed(error) => JobState::LaunchFailed { error },
            JobOutcome::Errored(error) => JobState::Errored { error },
            JobOutcome::TimedOut { log_path } => {
                rec.log_path = Some(log_path);
                JobState::TimedOut
            }
        };
    }

    /// Records in submission order.
    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }
}
