// tests/log_retention.rs

//! Log retention alongside concurrent chef runs, with a shell script
//! standing in for chef-client.

#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use chefrunner::engine::{CoreDispatcher, JobState, Runtime, RuntimeEvent, RuntimeOptions};
use chefrunner::exec::RealExecutorBackend;
use chefrunner::request::ChefRunner;
use chefrunner::types::{JobId, PlatformChoice};
use chefrunner_test_utils::builders::ConfigFileBuilder;
use chefrunner_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Writes "start" to the log, sleeps (longer for jobs named "slow"), then
/// appends "end".
fn write_slow_chef(dir: &Path) -> Result<String, Box<dyn Error>> {
    let script = dir.join("fake-chef-client");
    fs::write(
        &script,
        "#!/bin/sh\n\
         echo start > \"$2\"\n\
         case \"$2\" in\n\
           *slow*) sleep 1 ;;\n\
           *) sleep 0.2 ;;\n\
         esac\n\
         echo end >> \"$2\"\n",
    )?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
    Ok(script.to_string_lossy().into_owned())
}

#[tokio::test]
async fn concurrent_runs_keep_their_logs_under_a_tight_retention() -> TestResult {
    init_tracing();

    let bin_dir = tempfile::tempdir()?;
    let log_dir = tempfile::tempdir()?;
    let program = write_slow_chef(bin_dir.path())?;

    let cfg = ConfigFileBuilder::new()
        .program(&program)
        .platform(PlatformChoice::Unix)
        .log_dir(log_dir.path())
        .keep_logs(1)
        .max_concurrent(2)
        .build();

    fs::write(log_dir.path().join("old-1.log"), "old")?;
    fs::write(log_dir.path().join("old-2.log"), "old")?;

    let runner = Arc::new(ChefRunner::from_config(&cfg));
    runner.prepare_logs()?;
    runner.prune_logs();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = RealExecutorBackend::new(Arc::clone(&runner), None, tx.clone());
    for name in ["slow", "fast"] {
        tx.send(RuntimeEvent::JobSubmitted {
            job: JobId::new(name)?,
        })
        .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: true,
        retain_output: false,
    };
    let core = CoreDispatcher::new(2, 4, options);
    let records = with_timeout(Runtime::new(core, rx, executor).run()).await?;

    assert_eq!(records.len(), 2);
    for rec in &records {
        assert_eq!(rec.state, JobState::Completed { exit_code: 0 }, "{}", rec.id);
    }
    for name in ["slow", "fast"] {
        let log = fs::read_to_string(log_dir.path().join(format!("{name}.log")))?;
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["start", "end"], "{name}.log");
    }

    // Once the batch is over, retention applies again and keeps the newest.
    runner.prune_logs();
    let mut left: Vec<_> = fs::read_dir(log_dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left, vec!["slow.log"]);
    Ok(())
}
