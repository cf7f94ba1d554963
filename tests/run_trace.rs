// tests/run_trace.rs

//! The debug trace a run emits, checked against a captured subscriber.
//!
//! Kept in its own test binary: the subscriber here is installed per test
//! with `set_default`, and must not compete with `init_tracing`'s global one.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tracing::Level;

use chefrunner::config::RunnerConfig;
use chefrunner::errors::Result as RunResult;
use chefrunner::exec::{ProcessOutput, ProcessRunner, UnixStrategy};
use chefrunner::request::RunRequest;
use chefrunner::types::JobId;
use chefrunner_test_utils::capture::CapturedLogs;
use chefrunner_test_utils::fake_runner::StaticLogPathResolver;

type TestResult = Result<(), Box<dyn Error>>;

/// Records what had been logged by the time the process was invoked.
struct LogSnapshotRunner {
    logs: CapturedLogs,
    seen_at_invocation: Mutex<Vec<Vec<String>>>,
}

impl ProcessRunner for LogSnapshotRunner {
    fn run<'a>(
        &'a self,
        _program: &'a str,
        _args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = RunResult<ProcessOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.seen_at_invocation
                .lock()
                .unwrap()
                .push(self.logs.lines());
            Ok(ProcessOutput::default())
        })
    }
}

#[tokio::test]
async fn one_debug_event_naming_the_job_precedes_the_invocation() -> TestResult {
    let logs = CapturedLogs::new();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let runner = Arc::new(LogSnapshotRunner {
        logs: logs.clone(),
        seen_at_invocation: Mutex::new(Vec::new()),
    });
    let request = RunRequest::new(
        JobId::new("abc123")?,
        Arc::new(StaticLogPathResolver::new("/var/log/chef")),
    );

    request
        .run(&UnixStrategy::from_config(&RunnerConfig::default()), runner.as_ref())
        .await?;

    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "expected a single trace line, got {lines:?}");
    assert!(lines[0].contains("DEBUG"));
    assert!(lines[0].contains("abc123"));

    let seen = runner.seen_at_invocation.lock().unwrap().clone();
    assert_eq!(seen.len(), 1, "process runner must be called exactly once");
    assert_eq!(seen[0], lines, "trace must be written before the process runs");
    Ok(())
}
