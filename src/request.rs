// src/request.rs

//! A single chef run: resolve the job's log path, invoke chef, report back.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
use crate::exec::strategy::{self, RunStrategy};
use crate::logs::{DirLogPathResolver, LogPathResolver};
use crate::types::{ExitCode, JobId};

/// One request to run chef for a given job.
#[derive(Debug, Clone)]
pub struct RunRequest {
    job: JobId,
    resolver: Arc<dyn LogPathResolver>,
}

/// Result of a run whose process actually started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub job: JobId,
    pub log_path: PathBuf,
    pub output: ProcessOutput,
}

impl RunOutcome {
    /// Exit code exactly as reported by the process runner.
    pub fn exit_code(&self) -> ExitCode {
        self.output.exit_code
    }

    pub fn success(&self) -> bool {
        self.output.success()
    }
}

impl RunRequest {
    pub fn new(job: JobId, resolver: Arc<dyn LogPathResolver>) -> Self {
        Self { job, resolver }
    }

    pub fn job(&self) -> &JobId {
        &self.job
    }

    /// Run chef once for this job.
    ///
    /// Exactly one process invocation is made. A process that exits non-zero
    /// is still `Ok`; `Err` is reserved for failures to launch it.
    pub async fn run(
        &self,
        strategy: &dyn RunStrategy,
        runner: &dyn ProcessRunner,
    ) -> Result<RunOutcome> {
        debug!(job = %self.job, "run_chef({})", self.job);

        let log_path = self.resolver.log_path(&self.job);
        let cmd = strategy.command(&log_path);

        let output = runner.run(&cmd.program, &cmd.args).await?;

        Ok(RunOutcome {
            job: self.job.clone(),
            log_path,
            output,
        })
    }
}

/// The assembled collaborators for running chef, built once at startup.
#[derive(Clone)]
pub struct ChefRunner {
    strategy: Arc<dyn RunStrategy>,
    runner: Arc<dyn ProcessRunner>,
    resolver: Arc<dyn LogPathResolver>,
    logs: Option<LogRetention>,
}

#[derive(Debug, Clone)]
struct LogRetention {
    dir: DirLogPathResolver,
    keep: usize,
}

impl std::fmt::Debug for ChefRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefRunner")
            .field("strategy", &self.strategy)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl ChefRunner {
    pub fn new(
        strategy: Arc<dyn RunStrategy>,
        runner: Arc<dyn ProcessRunner>,
        resolver: Arc<dyn LogPathResolver>,
    ) -> Self {
        Self {
            strategy,
            runner,
            resolver,
            logs: None,
        }
    }

    /// Production wiring: host strategy, tokio processes, directory logs with
    /// retention.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let dir = DirLogPathResolver::from_config(&cfg.logs);
        Self {
            strategy: strategy::select(&cfg.runner),
            runner: Arc::new(TokioProcessRunner),
            resolver: Arc::new(dir.clone()),
            logs: Some(LogRetention {
                dir,
                keep: cfg.logs.keep,
            }),
        }
    }

    pub fn strategy(&self) -> &dyn RunStrategy {
        self.strategy.as_ref()
    }

    pub fn resolver(&self) -> &dyn LogPathResolver {
        self.resolver.as_ref()
    }

    pub async fn run(&self, job: &JobId) -> Result<RunOutcome> {
        let request = RunRequest::new(job.clone(), Arc::clone(&self.resolver));
        let outcome = request
            .run(self.strategy.as_ref(), self.runner.as_ref())
            .await?;

        info!(
            job = %job,
            exit_code = outcome.exit_code(),
            log = %outcome.log_path.display(),
            "chef run finished"
        );
        Ok(outcome)
    }

    /// Create the log directory if this runner owns one.
    pub fn prepare_logs(&self) -> Result<()> {
        match &self.logs {
            Some(retention) => retention.dir.ensure_dir(),
            None => Ok(()),
        }
    }

    /// Apply log retention; failures are logged, never propagated.
    pub fn prune_logs(&self) {
        let Some(retention) = &self.logs else {
            return;
        };
        match retention.dir.prune(retention.keep) {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "pruned old chef logs"),
            Err(e) => warn!(error = %e, "log pruning failed"),
        }
    }
}
