use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chefrunner::errors::{ChefRunnerError, Result};
use chefrunner::exec::{ProcessOutput, ProcessRunner};
use chefrunner::logs::LogPathResolver;
use chefrunner::types::{ExitCode, JobId};

/// One recorded call to [`FakeProcessRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// A process runner that never spawns anything.
///
/// - Records every invocation.
/// - Returns `exit_code` (default 0), or a per-log-path override keyed by
///   the last argument.
/// - Can simulate a launch failure, a failure while waiting on the child, or
///   a slow process.
/// - Counts runs that are currently in progress; a run stops counting when
///   it returns or its future is dropped.
#[derive(Clone, Default)]
pub struct FakeProcessRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    in_flight: Arc<AtomicUsize>,
    exit_code: ExitCode,
    by_last_arg: HashMap<String, ExitCode>,
    fail_launch: bool,
    fail_wait: bool,
    delay: Option<Duration>,
    stdout: String,
    stderr: String,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exiting_with(mut self, code: ExitCode) -> Self {
        self.exit_code = code;
        self
    }

    /// Use `code` when the last argument equals `last_arg` (usually the log path).
    pub fn exit_code_for(mut self, last_arg: impl Into<String>, code: ExitCode) -> Self {
        self.by_last_arg.insert(last_arg.into(), code);
        self
    }

    pub fn failing_to_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Pretend the process started but waiting on it failed.
    pub fn failing_after_launch(mut self) -> Self {
        self.fail_wait = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_output(mut self, stdout: &str, stderr: &str) -> Self {
        self.stdout = stdout.to_string();
        self.stderr = stderr.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ProcessRunner for FakeProcessRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
            });
            let _guard = InFlight::enter(&self.in_flight);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.fail_launch {
                return Err(ChefRunnerError::Launch {
                    program: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                });
            }

            if self.fail_wait {
                return Err(ChefRunnerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "lost the child's output pipe",
                )));
            }

            let exit_code = args
                .last()
                .and_then(|a| self.by_last_arg.get(a))
                .copied()
                .unwrap_or(self.exit_code);

            Ok(ProcessOutput {
                stdout: self.stdout.clone(),
                stderr: self.stderr.clone(),
                exit_code,
            })
        })
    }
}

/// Resolver returning `<prefix>/<job>.log` without touching the filesystem,
/// counting how often it was asked.
#[derive(Debug, Clone)]
pub struct StaticLogPathResolver {
    prefix: PathBuf,
    lookups: Arc<Mutex<Vec<JobId>>>,
}

impl StaticLogPathResolver {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn lookups(&self) -> Vec<JobId> {
        self.lookups.lock().unwrap().clone()
    }
}

impl LogPathResolver for StaticLogPathResolver {
    fn log_path(&self, job: &JobId) -> PathBuf {
        self.lookups.lock().unwrap().push(job.clone());
        self.prefix.join(format!("{job}.log"))
    }
}
