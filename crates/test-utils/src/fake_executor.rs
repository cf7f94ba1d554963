use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use chefrunner::engine::{JobOutcome, RuntimeEvent};
use chefrunner::errors::{ChefRunnerError, Result};
use chefrunner::exec::{ExecutorBackend, ProcessOutput};
use chefrunner::types::{ExitCode, JobId};

/// A fake executor that:
/// - records which jobs were started
/// - immediately reports `JobFinished` with a scripted exit code (default 0).
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    started: Arc<Mutex<Vec<String>>>,
    exit_codes: HashMap<String, ExitCode>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, started: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            started,
            exit_codes: HashMap::new(),
        }
    }

    pub fn with_exit_code(mut self, job: &str, code: ExitCode) -> Self {
        self.exit_codes.insert(job.to_string(), code);
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn start_jobs(
        &mut self,
        jobs: Vec<JobId>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let started = Arc::clone(&self.started);
        let exit_codes = self.exit_codes.clone();

        Box::pin(async move {
            for job in jobs {
                started.lock().unwrap().push(job.to_string());

                let exit_code = exit_codes.get(job.as_str()).copied().unwrap_or(0);
                tx.send(RuntimeEvent::JobFinished {
                    outcome: JobOutcome::Exited {
                        log_path: PathBuf::from(format!("{job}.log")),
                        output: ProcessOutput {
                            exit_code,
                            ..ProcessOutput::default()
                        },
                    },
                    job,
                })
                .await
                .map_err(|_| ChefRunnerError::ChannelClosed)?;
            }
            Ok(())
        })
    }
}
