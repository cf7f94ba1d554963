// tests/chef_process.rs

//! End-to-end: real processes through the production wiring, with a shell
//! script standing in for chef-client.

#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use chefrunner::request::ChefRunner;
use chefrunner::types::{JobId, PlatformChoice};
use chefrunner_test_utils::builders::ConfigFileBuilder;
use chefrunner_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn write_fake_chef(dir: &Path) -> Result<String, Box<dyn Error>> {
    let script = dir.join("fake-chef-client");
    fs::write(
        &script,
        "#!/bin/sh\n\
         # $1 is the log flag, $2 the log path\n\
         echo \"flag=$1\" > \"$2\"\n\
         echo \"Chef Client finished\"\n\
         exit 4\n",
    )?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
    Ok(script.to_string_lossy().into_owned())
}

#[tokio::test]
async fn runs_the_configured_program_and_writes_the_job_log() -> TestResult {
    init_tracing();

    let bin_dir = tempfile::tempdir()?;
    let log_dir = tempfile::tempdir()?;
    let program = write_fake_chef(bin_dir.path())?;

    let cfg = ConfigFileBuilder::new()
        .program(&program)
        .platform(PlatformChoice::Unix)
        .log_dir(&log_dir.path().join("runs"))
        .build();

    let runner = ChefRunner::from_config(&cfg);
    runner.prepare_logs()?;

    let outcome = with_timeout(runner.run(&JobId::new("abc123")?)).await?;

    assert_eq!(outcome.exit_code(), 4);
    assert_eq!(outcome.output.stdout.trim(), "Chef Client finished");
    assert_eq!(outcome.log_path, log_dir.path().join("runs").join("abc123.log"));
    assert_eq!(fs::read_to_string(&outcome.log_path)?.trim(), "flag=-L");
    Ok(())
}
